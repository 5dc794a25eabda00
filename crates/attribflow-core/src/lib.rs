/// Attribflow Core - Shared library for the product attribution system
///
/// This crate contains the domain types, the ephemeral attribution store,
/// the resolver and reconciliation engine, and the storefront API boundary
/// used by the Attribflow Lambda functions.
pub mod constants;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod resolver;
pub mod services;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use error::AttribflowError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
