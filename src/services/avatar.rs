use crate::config::avatar::AvatarConfig;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Turns an email address into an avatar URL.
pub trait AvatarResolver: Send + Sync {
    /// `None` when no avatar can be derived.
    fn avatar_url(&self, email: &str) -> Option<String>;
}

pub type SharedAvatarResolver = Arc<dyn AvatarResolver>;

/// Gravatar-compatible resolver: `{base}/{sha256(normalized email)}`.
#[derive(Debug, Clone)]
pub struct Gravatar {
    config: AvatarConfig,
}

impl Gravatar {
    pub fn new(config: AvatarConfig) -> Self {
        Self { config }
    }

    pub fn shared(config: AvatarConfig) -> SharedAvatarResolver {
        Arc::new(Self::new(config))
    }
}

impl AvatarResolver for Gravatar {
    fn avatar_url(&self, email: &str) -> Option<String> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        let digest = Sha256::digest(normalized.as_bytes());
        let mut url = format!("{}/{:x}", self.config.base_url, digest);

        let mut params = Vec::new();
        if let Some(size) = self.config.size {
            params.push(format!("s={}", size));
        }
        if let Some(default_image) = &self.config.default_image {
            params.push(format!("d={}", default_image));
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        Some(url)
    }
}
