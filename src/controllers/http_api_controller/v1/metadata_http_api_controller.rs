use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use reveal_domain::{TokenId, TokenIdError};
use thiserror::Error;

use crate::{
    controllers::http_api_controller::{
        MetadataHttpApiControllerDeps, v1::dto::error::ErrorResponse,
    },
    services::MetadataStoreError,
};

/// The requested id is not a token of this collection.
#[derive(Error, Debug)]
#[error("Token not found: {0}")]
pub(crate) struct RequestValidationError(#[from] TokenIdError);

impl IntoResponse for RequestValidationError {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(self.to_string())),
        )
            .into_response()
    }
}

/// A revealed file exists but could not be served.
#[derive(Error, Debug)]
#[error("Failed to read metadata for token {id}")]
pub(crate) struct MetadataReadError {
    id: TokenId,
    #[source]
    source: MetadataStoreError,
}

impl IntoResponse for MetadataReadError {
    fn into_response(self) -> Response {
        tracing::error!(token_id = %self.id, error = %self.source, "Metadata read failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(self.to_string())),
        )
            .into_response()
    }
}

pub(crate) struct MetadataHttpApiController;

impl MetadataHttpApiController {
    /// `GET /metadata/{id}`: the revealed document if published, otherwise
    /// the placeholder for `id`.
    pub(crate) async fn handle_request(
        State(deps): State<MetadataHttpApiControllerDeps>,
        Path(raw_id): Path<String>,
    ) -> Response {
        let id = match deps.collection.token_id(&raw_id) {
            Ok(id) => id,
            Err(e) => {
                reveal_observability::record_metadata_request("not_found");
                return RequestValidationError::from(e).into_response();
            }
        };

        match deps.metadata_store.read(id).await {
            Ok(Some(bytes)) => {
                reveal_observability::record_metadata_request("revealed");
                ([(header::CONTENT_TYPE, "application/json")], bytes).into_response()
            }
            Ok(None) => {
                reveal_observability::record_metadata_request("placeholder");
                Json(deps.collection.placeholder(id)).into_response()
            }
            Err(source) => {
                reveal_observability::record_metadata_request("error");
                MetadataReadError { id, source }.into_response()
            }
        }
    }
}
