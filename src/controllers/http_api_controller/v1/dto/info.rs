use chrono::{DateTime, Utc};
use reveal_key_value_store::RevealState;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct InfoResponse {
    pub version: &'static str,
    pub max_supply: u64,
    pub revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal_block_number: Option<u64>,
}

impl InfoResponse {
    pub(crate) fn new(version: &'static str, max_supply: u64, state: RevealState) -> Self {
        Self {
            version,
            max_supply,
            revealed: state.triggered,
            revealed_at: state.triggered_at,
            reveal_block_number: state.block_number,
        }
    }
}
