use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::controllers::http_api_controller::{
    InfoHttpApiControllerDeps,
    v1::dto::{error::ErrorResponse, info::InfoResponse},
};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) struct InfoHttpApiController;

impl InfoHttpApiController {
    pub(crate) async fn handle_request(State(deps): State<InfoHttpApiControllerDeps>) -> Response {
        match deps.reveal_state_store.load().await {
            Ok(state) => Json(InfoResponse::new(
                APP_VERSION,
                deps.collection.max_supply,
                state,
            ))
            .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load reveal state");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Reveal state is unavailable")),
                )
                    .into_response()
            }
        }
    }
}
