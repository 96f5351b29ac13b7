use std::env;

pub const DEFAULT_AVATAR_BASE_URL: &str = "https://www.gravatar.com/avatar";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarConfig {
    pub base_url: String,
    /// `s=` query parameter, pixels.
    pub size: Option<u32>,
    /// `d=` query parameter, e.g. `identicon` or `mp`.
    pub default_image: Option<String>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AVATAR_BASE_URL.to_string(),
            size: None,
            default_image: None,
        }
    }
}

impl AvatarConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("AVATAR_BASE_URL")
            .ok()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR_BASE_URL.to_string());

        let size = env::var("AVATAR_SIZE").ok().and_then(|raw| {
            raw.trim().parse().map_err(|_| {
                tracing::warn!("Invalid AVATAR_SIZE '{}', ignoring", raw);
            })
            .ok()
        });

        let default_image = env::var("AVATAR_DEFAULT")
            .ok()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Self {
            base_url,
            size,
            default_image,
        }
    }
}
