use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::Json;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::application::rpc::core::api::dispatcher::Dispatcher;
use crate::application::rpc::core::context::CallContext;
use crate::application::rpc::core::model::json::JsonError;
use crate::application::rpc::core::model::json::JsonRequest;
use crate::application::rpc::core::model::json::JsonResponse;

/// Path clients of the wider service family post to.
pub const RPC_PATH: &str = "/rpc/v0";

const BEARER_SCHEME: &str = "Bearer";

/// Builds the HTTP routes for `dispatcher`.
///
/// All methods are reached through `POST` on [RPC_PATH] or the root path.
/// The method is selected by the `method` field of the JSON-RPC body, with or
/// without the `Filecoin.` namespace prefix, and params are positional.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route(RPC_PATH, post(rpc_handler))
        .route("/", post(rpc_handler))
        .with_state(dispatcher)
}

/// Serves `dispatcher` on `listener` until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish after shutdown is requested.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("RPC server listening on {addr}");
    }

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

/// the bearer token of the request; an absent or malformed header yields an
/// empty token, which fails verification as invalid.
///
/// The auth scheme is matched case-insensitively (RFC 7235).
fn bearer_token(headers: &HeaderMap) -> &[u8] {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case(BEARER_SCHEME))
        .map(|(_, token)| token.trim().as_bytes())
        .unwrap_or_default()
}

/// Handles one JSON-RPC request.
///
/// Request:
/// ```json
/// POST /rpc/v0
/// Authorization: Bearer <token>
/// {
///     "jsonrpc": "2.0",
///     "method": "Filecoin.LogSetLevel",
///     "params": ["auth", "debug"],
///     "id": 1
/// }
/// ```
///
/// Error Response:
/// ```json
/// {
///     "jsonrpc": "2.0",
///     "id": 1,
///     "error": {
///         "code": 4,
///         "message": "permission denied: LogSetLevel requires write",
///         "data": {"PermissionDenied": {"method": "LogSetLevel", "required": "write"}}
///     }
/// }
/// ```
async fn rpc_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    // An optimization to avoid deserializing 2 times
    body: Result<Json<JsonRequest>, JsonRejection>,
) -> Json<JsonResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::JsonDataError(_)) => {
            return Json(JsonResponse::error(None, JsonError::InvalidRequest));
        }
        Err(_) => return Json(JsonResponse::error(None, JsonError::ParseError)),
    };

    // a client hanging up drops this future, and the dispatch with it. The
    // guard then only cancels the context for anything still holding a
    // clone of it.
    let ctx = CallContext::new();
    let cancel_on_drop = ctx.drop_guard();

    let result = dispatcher
        .dispatch(
            &ctx,
            bearer_token(&headers),
            &request.method,
            request.params,
        )
        .await;
    cancel_on_drop.disarm();

    let response = match result {
        Ok(result) => JsonResponse::success(request.id, result),
        Err(error) => JsonResponse::error(request.id, error.into()),
    };

    Json(response)
}
