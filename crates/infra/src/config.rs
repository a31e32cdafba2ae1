//! Configuration loading and representation.
//!
//! Layering (lowest to highest): built-in defaults, `FORUMHUB_*` environment
//! variables (`__` separates nesting, e.g. `FORUMHUB_DATABASE__NAME`), then the
//! plain `PORT`, `DB_USER` and `DB_PASSWORD` variables. A `.env` file is read first.

use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cors: CorsSettings,
    #[serde(default)]
    pub admin: AdminSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub backend: StoreBackend,
    /// Full connection string; takes precedence over user/password/host.
    pub uri: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// SRV host of the cluster, used with `user`/`password`.
    pub host: Option<String>,
    pub name: String,
    /// Run the comment-removal cascade in a transaction (replica sets only).
    pub transactions: bool,
}

impl DatabaseSettings {
    pub fn connection_uri(&self) -> String {
        if let Some(uri) = &self.uri {
            return uri.clone();
        }
        match (&self.user, &self.password, &self.host) {
            (Some(user), Some(password), Some(host)) => format!(
                "mongodb+srv://{user}:{password}@{host}/?retryWrites=true&w=majority"
            ),
            _ => "mongodb://localhost:27017".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub origins: Vec<String>,
}

/// Shared-secret guard for moderation routes. Unset means the routes are open.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminSettings {
    pub token: Option<String>,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_sources(Environment::with_prefix("FORUMHUB"), |key| {
            std::env::var(key).ok()
        })
    }

    /// Build settings from an environment source plus a lookup for the unprefixed variables.
    pub fn from_sources(
        env: Environment,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .map(|p| p.parse::<u16>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {e}"))?;

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.backend", "mongo")?
            .set_default("database.name", "Visionary-AI")?
            .set_default("database.transactions", false)?
            .set_default("cors.origins", vec!["http://localhost:5173"])?
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            )
            .set_override_option("server.port", port.map(i64::from))?
            .set_override_option("database.user", lookup("DB_USER"))?
            .set_override_option("database.password", lookup("DB_PASSWORD"))?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
