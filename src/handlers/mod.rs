pub mod health;
pub mod stream;

use crate::error::AppError;

/// Everything outside the stream and health routes belongs to the
/// forwarding proxy in front of this service.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
