use crate::config;
use crate::errors::BoxError;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

/// Shared Redis handle with JSON helpers.
///
/// The connection manager reconnects on its own; callers just see the
/// occasional command error while it does.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn new() -> Result<Self, BoxError> {
        let url = config::get_redis_url();
        let client = redis::Client::open(url.as_str())?;
        let manager = ConnectionManager::new(client).await?;
        info!("Connected to Redis cache");
        Ok(Self { manager })
    }

    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: Option<u64>,
    ) -> Result<(), BoxError> {
        let payload = serde_json::to_string(value)?;
        let mut con = self.manager.clone();
        match ttl_secs {
            Some(ttl) => {
                let _: () = con.set_ex(key, payload, ttl).await?;
            }
            None => {
                let _: () = con.set(key, payload).await?;
            }
        }
        debug!(key = key, "Cached value");
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, BoxError> {
        let mut con = self.manager.clone();
        let payload: Option<String> = con.get(key).await?;
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), BoxError> {
        let mut con = self.manager.clone();
        let _: () = con.del(key).await?;
        Ok(())
    }
}
