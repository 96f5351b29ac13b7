use crate::config::stream::StreamConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::extract_basic_token;
use crate::models::NotificationModel;
use crate::services::{
    avatar::SharedAvatarResolver,
    credential::CredentialStore,
    enricher::{Enricher, Enrichment},
    store::{StoreLease, StorePool},
    tailer::Tailer,
};
use crate::stream::frame;
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Frames buffered between the session loop and the response body.
const FRAME_BUFFER: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Authenticating,
    Streaming,
    Closed,
}

/// One client's notification stream.
///
/// Owns the store lease and the cancellation token of its tailer; both are
/// given up on [`StreamSession::close`], which also runs on drop.
pub struct StreamSession {
    id: Uuid,
    remote: SocketAddr,
    user_id: i32,
    state: SessionState,
    lease: StoreLease,
    cancel: CancellationToken,
    config: StreamConfig,
    enricher: Enricher,
}

/// Output side of a started session.
pub struct SessionHandle {
    pub frames: mpsc::Receiver<String>,
    pub task: JoinHandle<()>,
}

impl StreamSession {
    /// Authenticate the request and take a store lease for it.
    ///
    /// Fails with [`AppError::Unauthorized`] when the credential is missing or
    /// does not resolve; the lease is released on that path too.
    pub async fn open(
        pool: &StorePool,
        headers: &HeaderMap,
        remote: SocketAddr,
        config: StreamConfig,
        avatars: SharedAvatarResolver,
        shutdown: &CancellationToken,
    ) -> AppResult<Self> {
        tracing::debug!(%remote, state = ?SessionState::Connecting, "Session state");
        let Some(token) = extract_basic_token(headers) else {
            tracing::info!(%remote, "No authentication header given");
            return Err(AppError::Unauthorized);
        };

        tracing::debug!(%remote, state = ?SessionState::Authenticating, "Session state");
        let lease = pool.lease()?;
        let credentials = CredentialStore::new(lease.connection().clone());
        let Some(user_id) = credentials.resolve(&token).await else {
            tracing::info!(%remote, "Invalid credentials");
            return Err(AppError::Unauthorized);
        };

        Ok(Self::new(
            lease,
            user_id,
            remote,
            config,
            avatars,
            shutdown.child_token(),
        ))
    }

    /// Session for an already authenticated user. Cancelling `cancel` ends
    /// the stream.
    pub fn new(
        lease: StoreLease,
        user_id: i32,
        remote: SocketAddr,
        config: StreamConfig,
        avatars: SharedAvatarResolver,
        cancel: CancellationToken,
    ) -> Self {
        let enricher = Enricher::new(lease.connection().clone(), avatars);
        Self {
            id: Uuid::new_v4(),
            remote,
            user_id,
            state: SessionState::Authenticating,
            lease,
            cancel,
            config,
            enricher,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    /// Start the tailer and the streaming loop.
    pub fn start(mut self) -> SessionHandle {
        self.transition(SessionState::Streaming);
        tracing::info!(
            session = %self.id,
            remote = %self.remote,
            user_id = self.user_id,
            "Channel started"
        );

        let tailer = Tailer::new(
            self.lease.connection().clone(),
            self.user_id,
            self.config.poll_interval,
            self.cancel.child_token(),
        );
        let (notifications, tailer_task) = tailer.spawn();
        let (frames_tx, frames_rx) = mpsc::channel(FRAME_BUFFER);
        let task = tokio::spawn(self.run(notifications, frames_tx, tailer_task));

        SessionHandle {
            frames: frames_rx,
            task,
        }
    }

    /// Stop the tailer and give back the store lease. Safe to call twice.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.transition(SessionState::Closed);
        self.cancel.cancel();
        if self.lease.release() {
            tracing::debug!(session = %self.id, "Store lease released");
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(session = %self.id, from = ?self.state, to = ?next, "Session state");
        self.state = next;
    }

    async fn run(
        mut self,
        mut notifications: mpsc::Receiver<NotificationModel>,
        frames: mpsc::Sender<String>,
        tailer: JoinHandle<()>,
    ) {
        let mut heartbeat = self.config.heartbeat.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                _ = frames.closed() => {
                    tracing::info!(session = %self.id, remote = %self.remote, "Connection closed");
                    break;
                }
                _ = self.cancel.cancelled() => {
                    tracing::info!(session = %self.id, "Stream cancelled by server shutdown");
                    break;
                }
                next = notifications.recv() => match next {
                    Some(notification) => {
                        if !self.forward(notification, &frames).await {
                            break;
                        }
                    }
                    None => {
                        tracing::warn!(session = %self.id, "Notification feed ended");
                        break;
                    }
                },
                _ = tick(&mut heartbeat) => {
                    if !self.send(&frames, frame::HEARTBEAT_FRAME.to_string()).await {
                        break;
                    }
                }
            }
        }

        self.close();
        if let Err(e) = tailer.await {
            tracing::warn!(session = %self.id, error = %e, "Tailer task failed");
        }
        tracing::info!(session = %self.id, remote = %self.remote, "Finished stream");
    }

    /// Enrich and write one notification. Returns `false` once the client is
    /// gone.
    async fn forward(
        &self,
        notification: NotificationModel,
        frames: &mpsc::Sender<String>,
    ) -> bool {
        let enrichment = tokio::select! {
            _ = frames.closed() => return false,
            _ = self.cancel.cancelled() => return false,
            enrichment = self.enricher.enrich(&notification) => enrichment,
        };

        let payload = match enrichment {
            Enrichment::Ready(payload) => payload,
            Enrichment::Dropped(reason) => {
                tracing::debug!(
                    session = %self.id,
                    notification = notification.id,
                    %reason,
                    "Unable to parse notification"
                );
                return true;
            }
        };

        match frame::encode(payload.id, &payload) {
            Ok(frame) => self.send(frames, frame).await,
            Err(e) => {
                tracing::warn!(
                    session = %self.id,
                    notification = notification.id,
                    error = %e,
                    "Unable to marshal notification as JSON"
                );
                true
            }
        }
    }

    /// Queue one frame for the client. A client that stops reading can fill
    /// the buffer, so the wait is cut short by cancellation.
    async fn send(&self, frames: &mpsc::Sender<String>, frame: String) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::debug!(session = %self.id, "Frame discarded on cancellation");
                false
            }
            sent = frames.send(frame) => sent.is_ok(),
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}

async fn tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

impl IntoResponse for SessionHandle {
    fn into_response(self) -> Response {
        let stream = futures_util::stream::unfold(self.frames, |mut frames| async move {
            frames
                .recv()
                .await
                .map(|frame| (Ok::<_, Infallible>(frame), frames))
        });

        let mut response = Body::from_stream(stream).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(frame::CONTENT_TYPE),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        response
    }
}
