pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod routes;
pub mod services;
pub mod stream;

pub use error::{AppError, AppResult};
pub use services::store::{StoreLease, StorePool};
pub use stream::{OutgoingPayload, StreamSession};
