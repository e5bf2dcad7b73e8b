//! Cypher Query Text - Lookup queries issued by repositories
//!
//! Labels, variables and property keys are interpolated into the query
//! text, so each one is validated as a plain identifier first. Values are
//! always passed as named parameters.

use std::fmt;

use crate::config::ParameterStyle;
use crate::driver::Parameters;
use crate::error::OgmResult;
use crate::security::{validate_identifier, validate_variable};
use crate::value::Value;

/// Query text with its named parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    text: String,
    parameters: Parameters,
}

impl CypherQuery {
    /// `MATCH (n:Label) RETURN n`
    pub fn match_all(label: &str, variable: &str) -> OgmResult<Self> {
        validate_identifier(label)?;
        validate_variable(variable)?;

        Ok(Self {
            text: format!("MATCH ({}:{}) RETURN {}", variable, label, variable),
            parameters: Parameters::new(),
        })
    }

    /// `MATCH (n:Label) WHERE n.key = {key} RETURN n` with `key` bound to `value`
    pub fn match_by(
        label: &str,
        variable: &str,
        key: &str,
        value: Value,
        style: ParameterStyle,
    ) -> OgmResult<Self> {
        validate_identifier(label)?;
        validate_variable(variable)?;
        validate_identifier(key)?;

        let mut text = String::new();
        text.push_str(&format!("MATCH ({}:{})", variable, label));
        text.push_str(&format!(
            " WHERE {}.{} = {}",
            variable,
            key,
            style.placeholder(key)
        ));
        text.push_str(&format!(" RETURN {}", variable));

        let mut parameters = Parameters::new();
        parameters.insert(key.to_string(), value);

        Ok(Self { text, parameters })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn into_parts(self) -> (String, Parameters) {
        (self.text, self.parameters)
    }
}

impl fmt::Display for CypherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OgmError;

    #[test]
    fn test_match_all_text() {
        let query = CypherQuery::match_all("Person", "n").unwrap();
        assert_eq!(query.text(), "MATCH (n:Person) RETURN n");
        assert!(query.parameters().is_empty());
    }

    #[test]
    fn test_match_by_placeholder_styles() {
        let braces =
            CypherQuery::match_by("Person", "n", "name", Value::from("Ada"), ParameterStyle::Braces)
                .unwrap();
        assert_eq!(braces.text(), "MATCH (n:Person) WHERE n.name = {name} RETURN n");
        assert_eq!(braces.parameters().get("name"), Some(&Value::from("Ada")));

        let dollar =
            CypherQuery::match_by("Movie", "m", "year", Value::Integer(1999), ParameterStyle::Dollar)
                .unwrap();
        assert_eq!(dollar.to_string(), "MATCH (m:Movie) WHERE m.year = $year RETURN m");
    }

    #[test]
    fn test_keyword_property_keys_are_accepted() {
        for key in ["order", "limit", "set", "skip"] {
            let query =
                CypherQuery::match_by("Set", "n", key, Value::Integer(1), ParameterStyle::Braces)
                    .unwrap();
            assert_eq!(
                query.text(),
                format!("MATCH (n:Set) WHERE n.{key} = {{{key}}} RETURN n")
            );
        }

        assert!(matches!(
            CypherQuery::match_all("Person", "order"),
            Err(OgmError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_injection_through_identifiers_is_rejected() {
        let cases = [
            ("Person) DETACH DELETE n //", "n", "name"),
            ("Person", "n", "name} OR 1=1 //"),
            ("Person", "n n", "name"),
            ("", "n", "name"),
        ];

        for (label, variable, key) in cases {
            let err =
                CypherQuery::match_by(label, variable, key, Value::Null, ParameterStyle::Braces)
                    .unwrap_err();
            assert!(matches!(err, OgmError::InvalidIdentifier(_)));
        }
    }
}
