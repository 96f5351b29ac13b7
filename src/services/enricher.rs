use crate::models::{
    subscription, subscription::WEB_CHANNEL, Activity, ActivityModel, Node, NodeModel,
    NotificationModel, Subscription, User, UserModel,
};
use crate::services::avatar::SharedAvatarResolver;
use crate::stream::payload::{
    node_url, NodeKind, ObjectKind, OutgoingPayload, Verb, NODE_OBJECT_TYPE,
};
use chrono::{TimeZone, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use std::sync::Arc;
use thiserror::Error;

/// Why a notification was not turned into a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropReason {
    #[error("activity {0} not found")]
    ActivityNotFound(i32),
    #[error("unsupported object type '{0}'")]
    UnsupportedObjectType(String),
    #[error("node {0} not found")]
    NodeNotFound(i32),
    #[error("node type '{0}' not supported")]
    UnsupportedNodeType(String),
    #[error("node {0} has no parent")]
    NoParent(i32),
    #[error("parent node {0} not found")]
    ParentNotFound(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Ready(OutgoingPayload),
    Dropped(DropReason),
}

/// Joins a raw notification against activities, nodes, users and
/// subscriptions to build what the client displays.
pub struct Enricher {
    db: Arc<DatabaseConnection>,
    avatars: SharedAvatarResolver,
}

impl Enricher {
    pub fn new(db: Arc<DatabaseConnection>, avatars: SharedAvatarResolver) -> Self {
        Self { db, avatars }
    }

    pub async fn enrich(&self, notification: &NotificationModel) -> Enrichment {
        match self.build(notification).await {
            Ok(payload) => Enrichment::Ready(payload),
            Err(reason) => Enrichment::Dropped(reason),
        }
    }

    async fn build(&self, notification: &NotificationModel) -> Result<OutgoingPayload, DropReason> {
        let activity = found(
            Activity::find_by_id(notification.activity)
                .one(self.db.as_ref())
                .await,
            "activity",
            notification.activity,
        )
        .ok_or(DropReason::ActivityNotFound(notification.activity))?;
        if let ObjectKind::Other(kind) = ObjectKind::from(activity.object_type.as_str()) {
            return Err(DropReason::UnsupportedObjectType(kind));
        }

        let node = self
            .find_node(activity.object)
            .await
            .ok_or(DropReason::NodeNotFound(activity.object))?;
        // Only comments for now.
        if let NodeKind::Other(kind) = NodeKind::from(node.node_type.as_str()) {
            return Err(DropReason::UnsupportedNodeType(kind));
        }

        let parent_id = node.parent.ok_or(DropReason::NoParent(node.id))?;
        let parent = self
            .find_node(parent_id)
            .await
            .ok_or(DropReason::ParentNotFound(parent_id))?;

        let context_object_name = self.context_phrase(notification, &node, &parent).await;
        let action = Verb::from(activity.verb.as_str()).action().to_string();
        let (is_subscribed, subscription) = self.subscription_state(notification, &activity).await;

        let (actor, avatar) = match self.find_user(activity.actor_user).await {
            Some(actor) => {
                let avatar = self.avatars.avatar_url(&actor.email).unwrap_or_default();
                (actor.full_name, avatar)
            }
            None => {
                tracing::debug!(actor = activity.actor_user, "Activity actor not found");
                (String::new(), String::new())
            }
        };

        Ok(OutgoingPayload {
            id: notification.id,
            actor,
            avatar,
            action,
            object_type: NodeKind::Comment.to_string(),
            object_name: String::new(),
            object_url: node_url(activity.object),
            context_object_type: parent.node_type.clone(),
            context_object_name,
            context_object_url: node_url(activity.context_object),
            date: Utc.from_utc_datetime(&activity.created),
            is_read: notification.is_read,
            is_subscribed,
            subscription,
        })
    }

    /// "your post", "their comment", "Alice's post" or "unknown", seen from
    /// the recipient's side.
    async fn context_phrase(
        &self,
        notification: &NotificationModel,
        node: &NodeModel,
        parent: &NodeModel,
    ) -> String {
        let parent_kind = NodeKind::from(parent.node_type.as_str());
        if parent.user == notification.user {
            return format!("your {}", parent_kind);
        }

        match self.find_user(parent.user).await {
            None => "unknown".to_string(),
            Some(owner) if owner.id == node.user => format!("their {}", parent_kind),
            Some(owner) => format!("{}'s {}", owner.full_name, parent_kind),
        }
    }

    async fn subscription_state(
        &self,
        notification: &NotificationModel,
        activity: &ActivityModel,
    ) -> (bool, Option<i32>) {
        let result = Subscription::find()
            .filter(subscription::Column::User.eq(notification.user))
            .filter(subscription::Column::ContextObjectType.eq(NODE_OBJECT_TYPE))
            .filter(subscription::Column::ContextObject.eq(activity.context_object))
            .one(self.db.as_ref())
            .await;

        match result {
            Ok(Some(sub)) => (sub.is_enabled(WEB_CHANNEL), Some(sub.id)),
            Ok(None) => {
                tracing::debug!(
                    user_id = notification.user,
                    context_object = activity.context_object,
                    "No subscription found"
                );
                (false, None)
            }
            Err(e) => {
                tracing::warn!(
                    user_id = notification.user,
                    context_object = activity.context_object,
                    error = %e,
                    "Unable to look up subscription"
                );
                (false, None)
            }
        }
    }

    async fn find_node(&self, id: i32) -> Option<NodeModel> {
        found(Node::find_by_id(id).one(self.db.as_ref()).await, "node", id)
    }

    async fn find_user(&self, id: i32) -> Option<UserModel> {
        found(User::find_by_id(id).one(self.db.as_ref()).await, "user", id)
    }
}

fn found<T>(result: Result<Option<T>, DbErr>, what: &str, id: i32) -> Option<T> {
    match result {
        Ok(row) => row,
        Err(e) => {
            tracing::warn!(id, error = %e, "Unable to fetch {}", what);
            None
        }
    }
}
