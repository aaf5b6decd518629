use std::sync::Arc;

use platform_authn::AuthRegistry;
use platform_db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub auth: Arc<AuthRegistry>,
    pub config: Arc<ApiConfig>,
}

/// Runtime settings the HTTP layer needs; the server binary fills this from
/// the environment, tests use the defaults.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub cors_allowed_origins: Vec<String>,
    pub session_ttl_days: i64,
    pub post_login_redirect: String,
    pub secure_cookies: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: Vec::new(),
            session_ttl_days: 30,
            post_login_redirect: "/".into(),
            secure_cookies: true,
        }
    }
}
