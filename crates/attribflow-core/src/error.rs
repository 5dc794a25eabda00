/// Error types for the Attribflow system
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttribflowError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Signature verification failed: {0}")]
    Signature(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Storefront transport error: {0}")]
    Upstream(String),

    #[error("Storefront rejected the update: {0}")]
    UserErrors(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AttribflowError {
    /// Determines if an error is retriable
    ///
    /// A freshly created product may not be queryable for a short while, so
    /// `ProductNotFound` counts as retriable at the reconciliation boundary.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Upstream(_) => true,
            Self::Store(_) => true,
            Self::ProductNotFound(_) => true,
            Self::Validation(_) => false,
            Self::Signature(_) => false,
            Self::Config(_) => false,
            Self::UserErrors(_) => false,
            Self::Unknown(_) => false,
        }
    }
}

// Implement conversions for common error types
impl From<reqwest::Error> for AttribflowError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for AttribflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unknown(err.to_string())
    }
}

impl From<std::env::VarError> for AttribflowError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}
