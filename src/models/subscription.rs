use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Channel name used by the web client.
pub const WEB_CHANNEL: &str = "web";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activities-subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "_id")]
    pub id: i32,
    pub user: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub context_object_type: String,
    pub context_object: i32,
    /// Channel name to enabled flag, e.g. `{"web": true, "email": false}`.
    pub notifications: Json,
}

impl Model {
    /// Whether delivery on `channel` is switched on. Missing or non-boolean
    /// entries count as off.
    pub fn is_enabled(&self, channel: &str) -> bool {
        self.notifications
            .get(channel)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sub(notifications: Json) -> Model {
        Model {
            id: 1,
            user: 2,
            context_object_type: "node".to_string(),
            context_object: 3,
            notifications,
        }
    }

    #[test]
    fn web_flag_read_from_mapping() {
        assert!(sub(json!({"web": true, "email": false})).is_enabled(WEB_CHANNEL));
        assert!(!sub(json!({"web": false})).is_enabled(WEB_CHANNEL));
    }

    #[test]
    fn missing_or_malformed_channel_is_off() {
        assert!(!sub(json!({"email": true})).is_enabled(WEB_CHANNEL));
        assert!(!sub(json!({"web": "yes"})).is_enabled(WEB_CHANNEL));
        assert!(!sub(json!(null)).is_enabled(WEB_CHANNEL));
    }
}
