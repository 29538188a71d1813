mod bootstrap;
mod config;
mod controllers;
mod error;
mod logger;
mod periodic_tasks;
mod runtime;
mod services;

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;

/// Start the engine and run until a shutdown signal or a fatal error.
pub async fn run() -> ExitCode {
    dotenvy::dotenv().ok();

    let core = match bootstrap::build_core().await {
        Ok(core) => core,
        Err(error) => {
            // The logger may not be installed yet.
            eprintln!("reveal-engine failed to start: {error}");
            tracing::error!(error = %error, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let halt = CancellationToken::new();
    let periodic_tasks_deps = bootstrap::build_periodic_tasks_deps(&core, &halt);
    let controllers::Controllers { http_router } = bootstrap::build_controllers(&core);

    let reason = runtime::run(
        runtime::RuntimeDeps {
            periodic_tasks_deps,
            reveal_config: core.config.reveal.clone(),
            max_supply: core.config.collection.max_supply,
            halt,
        },
        http_router,
    )
    .await;

    match reason {
        runtime::ShutdownReason::Signal => ExitCode::SUCCESS,
        runtime::ShutdownReason::Halted => ExitCode::FAILURE,
    }
}
