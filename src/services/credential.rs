use crate::models::{token, Token};
use chrono::NaiveDateTime;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;

/// Resolves stream tokens to user ids.
pub struct CredentialStore {
    db: Arc<DatabaseConnection>,
}

impl CredentialStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// User owning `token`, if the token exists and has not expired.
    ///
    /// Lookup errors are logged and reported as `None`; callers cannot tell
    /// an unknown token from a store failure.
    pub async fn resolve(&self, token: &str) -> Option<i32> {
        self.resolve_at(token, chrono::Utc::now().naive_utc()).await
    }

    pub async fn resolve_at(&self, token: &str, now: NaiveDateTime) -> Option<i32> {
        let result = Token::find()
            .filter(token::Column::Token.eq(token))
            .filter(token::Column::ExpireTime.gt(now))
            .one(self.db.as_ref())
            .await;

        match result {
            Ok(Some(record)) => Some(record.user),
            Ok(None) => {
                tracing::debug!("No unexpired token matches");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error fetching token");
                None
            }
        }
    }
}
