use crate::models::{notification, Notification, NotificationModel};
use chrono::NaiveDateTime;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Polls the store for one user's new notifications and hands them over one
/// at a time.
///
/// The cursor starts at the epoch for every tailer, so a reconnecting client
/// sees its whole history again.
pub struct Tailer {
    db: Arc<DatabaseConnection>,
    user_id: i32,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl Tailer {
    pub fn new(
        db: Arc<DatabaseConnection>,
        user_id: i32,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            db,
            user_id,
            poll_interval,
            cancel,
        }
    }

    /// Spawn the polling task.
    ///
    /// The receiver yields notifications in creation order and returns
    /// `None` once the tailer stops: cancelled, receiver gone, or a store
    /// fault.
    pub fn spawn(self) -> (mpsc::Receiver<NotificationModel>, JoinHandle<()>) {
        // Capacity 1: a slow consumer holds the tailer at its next send.
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(self.run(tx));
        (rx, handle)
    }

    async fn run(self, tx: mpsc::Sender<NotificationModel>) {
        let mut cursor = NaiveDateTime::default();

        tracing::debug!(
            user_id = self.user_id,
            poll_interval_secs = self.poll_interval.as_secs(),
            "Tailer started"
        );

        'poll: loop {
            let batch = tokio::select! {
                _ = self.cancel.cancelled() => break 'poll,
                result = self.fetch_after(cursor) => match result {
                    Ok(batch) => batch,
                    Err(e) => {
                        tracing::error!(
                            user_id = self.user_id,
                            error = %e,
                            "Error fetching notifications"
                        );
                        break 'poll;
                    }
                },
            };

            for notification in batch {
                if notification.created < cursor {
                    tracing::warn!(
                        user_id = self.user_id,
                        notification = notification.id,
                        "Skipping notification older than cursor"
                    );
                    continue;
                }
                cursor = notification.created;

                tokio::select! {
                    _ = self.cancel.cancelled() => break 'poll,
                    sent = tx.send(notification) => {
                        if sent.is_err() {
                            break 'poll;
                        }
                    }
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break 'poll,
                _ = tx.closed() => break 'poll,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        tracing::debug!(user_id = self.user_id, "Tailer stopped");
    }

    async fn fetch_after(&self, cursor: NaiveDateTime) -> Result<Vec<NotificationModel>, DbErr> {
        Notification::find()
            .filter(notification::Column::Created.gt(cursor))
            .filter(notification::Column::User.eq(self.user_id))
            .order_by_asc(notification::Column::Created)
            .all(self.db.as_ref())
            .await
    }
}
