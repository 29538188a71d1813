use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    reveal_engine::run().await
}
