use quotebook_core::SearchOptions;
use quotebook_storage::persistent::DEFAULT_TABLE;
use quotebook_storage::RandomStrategy;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub table: String,
    pub http_addr: SocketAddr,
    pub search: SearchOptions,
    pub random: RandomStrategy,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db_path = std::env::var("QUOTES_DB").unwrap_or_else(|_| "db.json".into());
        let table = std::env::var("QUOTES_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.into());
        let http_addr = std::env::var("HTTP_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".into())
            .parse()?;
        let zero_bound_as_unset = std::env::var("ZERO_BOUND_AS_UNSET")
            .ok()
            .and_then(|s| quotebook_core::parse_flag(&s))
            .unwrap_or(true);
        let random = match std::env::var("RANDOM_STRATEGY") {
            Ok(s) => s.parse().map_err(anyhow::Error::msg)?,
            Err(_) => RandomStrategy::default(),
        };
        Ok(Self {
            db_path: PathBuf::from(db_path),
            table,
            http_addr,
            search: SearchOptions {
                zero_bound_as_unset,
            },
            random,
        })
    }
}
