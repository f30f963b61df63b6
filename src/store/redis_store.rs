use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use redis::{AsyncCommands, Script};
use secrecy::{ExposeSecret, Secret};

use super::{RecordStore, StoredRecord};
use crate::error::StoreError;

/// Splices one encoded record onto the end of the slot's array inside Redis,
/// so no other client can write between the read and the write. Existing
/// bytes are kept as they are; a slot that is not an array is refused.
const APPEND_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  redis.call('SET', KEYS[1], '[' .. ARGV[1] .. ']')
  return 1
end
local ok, decoded = pcall(cjson.decode, raw)
local body = string.match(raw, '^%s*%[(.-)%]%s*$')
if not ok or type(decoded) ~= 'table' or body == nil then
  return redis.error_reply('slot ' .. KEYS[1] .. ' does not hold a JSON array')
end
if string.match(body, '^%s*$') then
  redis.call('SET', KEYS[1], '[' .. ARGV[1] .. ']')
else
  redis.call('SET', KEYS[1], '[' .. body .. ',' .. ARGV[1] .. ']')
end
return 1
"#;

/// Slots kept as plain string keys in Redis.
#[derive(Debug, Clone)]
pub struct RedisStore {
    client: bb8::Pool<RedisConnectionManager>,
}

impl RedisStore {
    pub fn new(client: bb8::Pool<RedisConnectionManager>) -> Self {
        Self { client }
    }

    pub async fn connect(url: &Secret<String>) -> Result<Self, StoreError> {
        let manager = RedisConnectionManager::new(url.expose_secret().as_str())?;
        let client = bb8::Pool::builder().build(manager).await?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn read_slot(&self, key: &str) -> Result<Option<String>, StoreError> {
        let raw = self
            .client
            .get()
            .await
            .map_err(|_| StoreError::Backend("Can't get a connection from the pool".to_owned()))?
            .get::<_, Option<String>>(key)
            .await?;

        Ok(raw)
    }

    async fn append(&self, key: &str, record: StoredRecord) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&record)?;
        let mut connection = self
            .client
            .get()
            .await
            .map_err(|_| StoreError::Backend("Can't get a connection from the pool".to_owned()))?;

        Script::new(APPEND_SCRIPT)
            .key(key)
            .arg(encoded)
            .invoke_async::<_, i64>(&mut *connection)
            .await?;

        Ok(())
    }
}
