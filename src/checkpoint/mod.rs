//! Durable storage for the learned Q-table.

mod metadata;
mod store;

pub use metadata::QTableMetadata;
pub use store::{QStore, SavedQTable, FORMAT_VERSION};
