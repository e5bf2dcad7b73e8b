//! Identifier validation for generated Cypher
//!
//! Labels and property keys are interpolated into query text, so they are
//! restricted to plain identifiers before a query is built. Values always
//! travel as parameters and are never validated here.

use crate::error::{OgmError, OgmResult};

/// Cypher clause keywords that must not be used as a pattern variable
static CYPHER_KEYWORDS: &[&str] = &[
    "MATCH", "OPTIONAL", "WHERE", "RETURN", "WITH", "UNWIND", "CREATE", "MERGE", "DELETE",
    "DETACH", "SET", "REMOVE", "CALL", "YIELD", "UNION", "FOREACH", "LOAD", "ORDER", "SKIP",
    "LIMIT",
];

/// Validate that a label or property key is safe to interpolate into Cypher text
///
/// Accepts `[A-Za-z_][A-Za-z0-9_]*`. Keywords are allowed: `n.order` and
/// `(n:Set)` are plain names in label and property position.
pub fn validate_identifier(identifier: &str) -> OgmResult<()> {
    let mut chars = identifier.chars();

    let Some(first) = chars.next() else {
        return Err(OgmError::InvalidIdentifier(
            "Identifier cannot be empty".to_string(),
        ));
    };

    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(OgmError::InvalidIdentifier(format!(
            "Identifier '{}' must start with a letter or underscore",
            identifier
        )));
    }

    if let Some(c) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(OgmError::InvalidIdentifier(format!(
            "Identifier '{}' contains invalid character '{}'",
            identifier, c
        )));
    }

    Ok(())
}

/// Validate a pattern variable: an identifier that is not a clause keyword
pub fn validate_variable(variable: &str) -> OgmResult<()> {
    validate_identifier(variable)?;

    let upper = variable.to_uppercase();
    if CYPHER_KEYWORDS.contains(&upper.as_str()) {
        return Err(OgmError::InvalidIdentifier(format!(
            "Variable '{}' is a reserved Cypher keyword",
            variable
        )));
    }

    Ok(())
}
