//! Error types for the mapper
//!
//! Provides the error taxonomy shared by relationship metadata, hydration
//! and the repository read paths.

use std::error::Error as StdError;

use crate::config::ConfigError;

/// Result type alias for mapper operations
pub type OgmResult<T> = Result<T, OgmError>;

/// Boxed error produced by a database driver
pub type DriverError = Box<dyn StdError + Send + Sync + 'static>;

/// Error types for mapper operations
#[derive(Debug, thiserror::Error)]
pub enum OgmError {
    /// Invalid mapping declaration, raised while building metadata
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// An operation was invoked on a descriptor or field that cannot support it
    #[error("Logic error: {0}")]
    Logic(String),

    /// A record did not carry the pattern variable the query returns
    #[error("Record has no value for pattern variable '{variable}'")]
    MissingPrimaryValue { variable: String },

    /// A field declared in metadata is not an accessible member of the entity
    #[error("Field '{field}' is declared on '{entity}' but is not an accessible member")]
    UndeclaredField { entity: String, field: String },

    /// A record value could not be converted into the field's type
    #[error("Cannot convert {found} into {expected} for field '{field}'")]
    TypeConversion {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A label or property key is not safe to interpolate into query text
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// An entity lock was poisoned by a panicking writer
    #[error("Entity lock poisoned: {0}")]
    Poisoned(String),

    /// Invalid mapper configuration
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Failure reported by the database driver, passed through untouched
    #[error(transparent)]
    Driver(DriverError),
}

impl OgmError {
    /// Wrap an arbitrary driver failure
    pub fn driver<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        OgmError::Driver(Box::new(err))
    }

    pub fn mapping(msg: impl Into<String>) -> Self {
        OgmError::Mapping(msg.into())
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        OgmError::Logic(msg.into())
    }

    /// Check if this is a build-time mapping error
    pub fn is_mapping(&self) -> bool {
        matches!(self, OgmError::Mapping(_))
    }

    /// Check if this is a programmer-error class failure
    pub fn is_logic(&self) -> bool {
        matches!(self, OgmError::Logic(_))
    }

    /// Check if this error came from the driver
    pub fn is_driver(&self) -> bool {
        matches!(self, OgmError::Driver(_))
    }
}
