use std::sync::Arc;

use crate::auth::jwt::{JwtKeys, TokenService};
use crate::auth::repo::UserStore;
use crate::config::AppConfig;
use crate::db::PgStore;
use crate::meetings::repo::MeetingStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub meetings: Arc<dyn MeetingStore>,
    pub tokens: Arc<dyn TokenService>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = PgStore::connect(&config).await?;

        if let Err(e) = store.migrate().await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self::from_parts(Arc::new(config), Arc::new(store)))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<PgStore>) -> Self {
        let tokens = Arc::new(JwtKeys::from_config(&config.jwt)) as Arc<dyn TokenService>;
        Self {
            config,
            users: store.clone(),
            meetings: store,
            tokens,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn fake() -> Self {
        Self::fake_with(Arc::new(crate::memory::MemoryStore::default()))
    }

    pub fn fake_with(store: Arc<crate::memory::MemoryStore>) -> Self {
        let config = Arc::new(AppConfig::test());
        let tokens = Arc::new(JwtKeys::from_config(&config.jwt)) as Arc<dyn TokenService>;
        Self {
            config,
            users: store.clone(),
            meetings: store,
            tokens,
        }
    }
}
