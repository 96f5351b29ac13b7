use crate::services::store::StorePool;
use axum::{response::IntoResponse, Extension, Json};
use serde_json::json;

pub async fn health_check(Extension(pool): Extension<StorePool>) -> impl IntoResponse {
    let db_ok = pool.connection().ping().await.is_ok();
    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "notif-relay",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
        "streams": pool.active_leases(),
        "max_streams": pool.capacity(),
    }))
}
