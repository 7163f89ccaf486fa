pub mod catalog;
pub mod literal;
pub mod store;

pub use catalog::{SymptomCatalog, SymptomInfo};
pub use literal::decode_list;
pub use store::{ReferencePaths, ReferenceStore};
