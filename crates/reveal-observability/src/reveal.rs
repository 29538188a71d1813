use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// One watcher poll against the chain. `status` is `ok`, `cached` or `error`.
pub fn record_reveal_poll(network: &str, status: &str, duration: Duration) {
    counter!(
        "reveal_watcher_polls_total",
        "network" => network.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "reveal_watcher_poll_duration_seconds",
        "network" => network.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_reveal_snapshot(network: &str, block_number: u64, total_supply: u64, max_supply: u64) {
    gauge!("reveal_chain_block_number", "network" => network.to_string()).set(block_number as f64);
    gauge!("reveal_collection_total_supply", "network" => network.to_string())
        .set(total_supply as f64);
    gauge!("reveal_collection_remaining_supply", "network" => network.to_string())
        .set(max_supply.saturating_sub(total_supply) as f64);
}

pub fn record_reveal_consecutive_failures(failures: u32) {
    gauge!("reveal_watcher_consecutive_failures").set(f64::from(failures));
}

/// One reveal script execution. `status` is `ok` or the failure kind.
pub fn record_reveal_execution(status: &str, duration: Duration, published_files: usize) {
    counter!(
        "reveal_executions_total",
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "reveal_execution_duration_seconds",
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
    if status == "ok" {
        counter!("reveal_published_files_total").increment(published_files as u64);
    }
}

pub fn record_reveal_triggered(triggered: bool) {
    gauge!("reveal_triggered").set(if triggered { 1.0 } else { 0.0 });
}
