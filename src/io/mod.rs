pub mod csv_export;
pub mod csv_import;
pub mod store;

pub use store::{ActivityStore, JsonFileStore, MemoryStore};
