use crate::config::{AppConfig, JwtConfig};
use crate::domain::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<Database>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = Arc::new(Database::seeded()?);
        Ok(Self { config, db })
    }

    /// State with an empty database and a fixed secret, for tests.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            jwt: JwtConfig {
                secret: "test-secret".into(),
            },
        });
        Self {
            config,
            db: Arc::new(Database::new()),
        }
    }
}
