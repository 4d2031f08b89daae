/// Visit counter API routes
use crate::error::{Result, ServerError};
use crate::state::AppState;
use crate::store::register_visit;
use afk_player::VisitResponse;
use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, Method},
    Json,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct VisitQuery {
    pub op: Option<String>,
}

/// /api/visits - read or register
///
/// `GET ?op=get` only reads. Any other request counts the caller once. When
/// the store fails midway the reply is still 200 with `ok: false` and the
/// count as it stands; only if that read fails too does the request fail.
pub async fn visits(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<VisitQuery>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<VisitResponse>> {
    let store = state.store.as_ref();

    let outcome = if method == Method::GET && query.op.as_deref() == Some("get") {
        store.count().await
    } else {
        let peer = connect_info.map(|ConnectInfo(addr)| addr);
        register_visit(store, &client_token(&headers, peer)).await
    };

    match outcome {
        Ok(count) => Ok(Json(VisitResponse::counted(count))),
        Err(e) => {
            warn!("Visit request failed: {}", e);
            let count = store
                .count()
                .await
                .map_err(|read| ServerError::Internal(format!("{e}; count unreadable: {read}")))?;
            Ok(Json(VisitResponse::degraded(count, e.to_string())))
        }
    }
}

/// First `X-Forwarded-For` entry, else the peer address, else empty
pub fn client_token(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    match (forwarded, peer) {
        (Some(first), _) => first.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => String::new(),
    }
}
