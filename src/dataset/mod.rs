//! Dataset management: labeled expression tables, task binding and loading.

pub mod dataset;
pub mod loader;
pub mod task;

pub use dataset::{BinaryDataset, Dataset};
pub use loader::{load_gene_list, TableConfig, TableLoader};
pub use task::ClassificationTask;
