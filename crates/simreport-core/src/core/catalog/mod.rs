//! Metadata catalog: attribute codes, their canonical terms and the resolver seam.

pub mod codes;
pub mod lookup;

pub use lookup::{AttributeCatalog, AttributeDescriptor, AttributeResolver, LookupError};
