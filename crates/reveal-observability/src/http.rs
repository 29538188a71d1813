use metrics::counter;

/// `outcome` is one of `revealed`, `placeholder`, `not_found`, `error`.
pub fn record_metadata_request(outcome: &str) {
    counter!(
        "reveal_metadata_requests_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
