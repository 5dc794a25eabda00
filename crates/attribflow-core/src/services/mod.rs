/// External collaborator boundaries
pub mod shopify;
pub mod signature;
