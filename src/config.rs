// src/config.rs

use std::{env, net::SocketAddr, time::Duration};

use anyhow::Context;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub rust_log: String,
    pub log_dir: String,
    pub max_connections: u32,
    /// How long a presented quiz is kept for an attempt that is never completed.
    pub snapshot_ttl: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://quizroom.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:3000")?;

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            Err(_) => 5,
        };

        let snapshot_ttl = match env::var("SNAPSHOT_TTL_SECS") {
            Ok(value) => Duration::from_secs(
                value
                    .parse()
                    .context("SNAPSHOT_TTL_SECS must be a number of seconds")?,
            ),
            Err(_) => Duration::from_secs(24 * 60 * 60),
        };

        Ok(Self {
            database_url,
            bind_addr,
            rust_log,
            log_dir,
            max_connections,
            snapshot_ttl,
        })
    }
}
