mod config;
mod error;
mod manager;
mod stores;
mod table;

pub use config::KeyValueStoreManagerConfig;
pub use error::KeyValueStoreError;
pub use manager::KeyValueStoreManager;
pub use stores::{RevealState, RevealStateError, RevealStateStorage, RevealStateStore};
pub use table::Table;
