pub mod catalog;
pub mod requests;

pub use catalog::{CatalogStore, MaterialFilter, MaterialFilterPatch};
pub use requests::{RequestStore, StorePolicy};
