use crate::{Error, Result};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

fn required(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("missing required environment variable {}", key)))
}

fn optional(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Upstream news provider settings for the ingestion stage.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    pub default_category: String,
    pub categories: Vec<String>,
    pub fetch_interval: Duration,
}

impl UpstreamConfig {
    pub fn from_env() -> Result<Self> {
        let interval_ms = optional("NEWSAPI_FETCH_INTERVAL_MS", "300000")
            .parse::<u64>()
            .map_err(|e| Error::Config(format!("invalid NEWSAPI_FETCH_INTERVAL_MS: {}", e)))?;

        let categories: Vec<String> = optional("NEWSAPI_CATEGORIES", "technology")
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if categories.is_empty() {
            return Err(Error::Config(
                "NEWSAPI_CATEGORIES must name at least one category".to_string(),
            ));
        }

        Ok(Self {
            base_url: required("NEWSAPI_URL")?,
            api_key: required("NEWSAPI_KEY")?,
            default_category: required("NEWSAPI_DEFAULT_CATEGORY")?,
            categories,
            fetch_interval: Duration::from_millis(interval_ms),
        })
    }
}

/// Message bus settings, shared by both stages.
#[derive(Debug, Clone)]
pub struct BusConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
}

impl BusConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            brokers: required("KAFKA_BROKERS")?,
            topic: optional("KAFKA_TOPIC_NEWS", "news.incoming"),
            group_id: optional("KAFKA_GROUP_ID", "news-storage"),
        })
    }
}

/// Relational store settings for the storage stage.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
        })
    }
}

/// Read API listener settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub listen_addr: SocketAddr,
}

impl HttpConfig {
    pub fn from_env() -> Result<Self> {
        let addr = optional("HTTP_LISTEN_ADDR", "0.0.0.0:8080");
        Ok(Self {
            listen_addr: addr
                .parse()
                .map_err(|e| Error::Config(format!("invalid HTTP_LISTEN_ADDR {}: {}", addr, e)))?,
        })
    }
}
