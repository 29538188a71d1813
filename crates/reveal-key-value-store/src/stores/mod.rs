pub mod reveal_state_store;

pub use reveal_state_store::{RevealState, RevealStateError, RevealStateStorage, RevealStateStore};
