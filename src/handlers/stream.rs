use crate::config::stream::StreamConfig;
use crate::error::AppResult;
use crate::services::{avatar::SharedAvatarResolver, store::StorePool};
use crate::stream::StreamSession;
use axum::{
    extract::ConnectInfo,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension,
};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

/// `GET /`: the authenticated user's live notification stream.
pub async fn stream_notifications(
    Extension(pool): Extension<StorePool>,
    Extension(config): Extension<StreamConfig>,
    Extension(avatars): Extension<SharedAvatarResolver>,
    Extension(shutdown): Extension<CancellationToken>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let session = StreamSession::open(&pool, &headers, remote, config, avatars, &shutdown).await?;
    Ok(session.start().into_response())
}
