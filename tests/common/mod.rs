#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use notif_relay::config::stream::StreamConfig;
use notif_relay::models::{activity, node, user, NotificationModel, TokenModel};
use notif_relay::services::avatar::{AvatarResolver, SharedAvatarResolver};
use notif_relay::services::store::StorePool;
use reqwest::Client;
use sea_orm::DatabaseConnection;
use std::net::SocketAddr;
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

static INIT: Once = Once::new();

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var("CORS_ORIGINS", "*");
    });
}

pub struct TestApp {
    pub addr: String,
    pub pool: StorePool,
    pub shutdown: CancellationToken,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Wait until every stream has given its lease back.
    pub async fn wait_for_idle(&self) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.pool.active_leases() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("streams still hold store leases");
    }
}

pub struct StaticAvatars;

impl AvatarResolver for StaticAvatars {
    fn avatar_url(&self, email: &str) -> Option<String> {
        Some(format!("https://avatars.test/{}", email))
    }
}

pub fn test_config(max_sessions: usize) -> StreamConfig {
    StreamConfig {
        poll_interval: Duration::from_secs(3600),
        max_sessions,
        heartbeat: None,
    }
}

pub async fn spawn_app(db: DatabaseConnection, max_sessions: usize) -> TestApp {
    init_env();

    let pool = StorePool::new(Arc::new(db), max_sessions);
    let shutdown = CancellationToken::new();
    let avatars: SharedAvatarResolver = Arc::new(StaticAvatars);

    let app = notif_relay::routes::create_app(
        pool.clone(),
        test_config(max_sessions),
        avatars,
        shutdown.clone(),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        pool,
        shutdown,
        client: Client::new(),
    }
}

pub fn at(sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(8, 0, sec)
        .unwrap()
}

pub fn token(user: i32) -> TokenModel {
    TokenModel {
        id: 1,
        token: "stream-token".to_string(),
        user,
        expire_time: NaiveDate::from_ymd_opt(2099, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    }
}

pub fn notification(id: i32, activity: i32, user: i32, sec: u32) -> NotificationModel {
    NotificationModel {
        id,
        created: at(sec),
        activity,
        user,
        is_read: false,
    }
}

pub fn activity(id: i32, object_type: &str, verb: &str, actor: i32) -> activity::Model {
    activity::Model {
        id,
        object: 20,
        object_type: object_type.to_string(),
        context_object: 10,
        verb: verb.to_string(),
        actor_user: actor,
        created: at(0),
    }
}

pub fn node(id: i32, node_type: &str, parent: Option<i32>, owner: i32) -> node::Model {
    node::Model {
        id,
        node_type: node_type.to_string(),
        parent,
        user: owner,
    }
}

pub fn user(id: i32, name: &str) -> user::Model {
    user::Model {
        id,
        full_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

/// Read from a streaming response until one complete frame arrived.
pub async fn read_frame(resp: &mut reqwest::Response) -> String {
    let mut buf = String::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !buf.contains("\n\n") {
            let chunk = resp
                .chunk()
                .await
                .expect("stream failed")
                .expect("stream ended before a frame arrived");
            buf.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    })
    .await
    .expect("timed out waiting for a frame");
    buf
}
