use std::collections::HashMap;

use anyhow::{Result, anyhow};
use api::ApiConfig;
use platform_authn::ProviderConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    pub providers: HashMap<String, ProviderConfig>,
    pub session_ttl_days: i64,
    pub post_login_redirect: String,
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .filter_map(|origin| {
                let trimmed = origin.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let session_ttl_days = std::env::var("SESSION_TTL_DAYS")
            .ok()
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(30);

        let post_login_redirect = std::env::var("POST_LOGIN_REDIRECT")
            .ok()
            .or_else(|| cors_allowed_origins.first().cloned())
            .unwrap_or_else(|| "/".into());

        let secure_cookies = std::env::var("SECURE_COOKIES")
            .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(true);

        let providers_list = std::env::var("AUTH_PROVIDERS").unwrap_or_default();
        let mut providers = HashMap::new();
        for raw in providers_list.split(',') {
            let id = raw.trim();
            if id.is_empty() {
                continue;
            }
            let upper = id.to_ascii_uppercase();
            let issuer = env_required(&format!("{}_ISSUER", upper))?;
            let client_id = env_required(&format!("{}_CLIENT_ID", upper))?;
            let client_secret = env_required(&format!("{}_CLIENT_SECRET", upper))?;
            let redirect_url = env_required(&format!("{}_REDIRECT_URL", upper))?;
            providers.insert(
                id.to_string(),
                ProviderConfig {
                    id: id.to_string(),
                    issuer,
                    client_id,
                    client_secret,
                    redirect_url,
                },
            );
        }

        Ok(Self {
            cors_allowed_origins,
            providers,
            session_ttl_days,
            post_login_redirect,
            secure_cookies,
        })
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            cors_allowed_origins: self.cors_allowed_origins.clone(),
            session_ttl_days: self.session_ttl_days,
            post_login_redirect: self.post_login_redirect.clone(),
            secure_cookies: self.secure_cookies,
        }
    }
}

fn env_required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing env {}", key))
}
