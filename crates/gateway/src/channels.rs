//! Registered repost channels.
//!
//! A flat list of chat ids kept under a single key in the same
//! key-value backend as the sessions.  Create/read/delete only.

use std::sync::Arc;

use tb_sessions::KvStore;

const CHANNELS_KEY: &str = "channels";

pub struct ChannelRegistry {
    kv: Arc<dyn KvStore>,
}

impl ChannelRegistry {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// All registered channel chat ids.  A corrupt stored list is
    /// logged and treated as empty.
    pub fn list(&self) -> Vec<i64> {
        let Some(raw) = self.kv.get(CHANNELS_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "corrupt channel list, treating as empty");
            Vec::new()
        })
    }

    /// Add a channel if not present.  Returns whether it was added.
    pub fn register(&self, chat: i64) -> tb_domain::error::Result<bool> {
        let mut channels = self.list();
        if channels.contains(&chat) {
            return Ok(false);
        }
        channels.push(chat);
        self.save(&channels)?;
        Ok(true)
    }

    /// Remove a channel.  Returns whether it was present.
    pub fn unregister(&self, chat: i64) -> tb_domain::error::Result<bool> {
        let mut channels = self.list();
        let before = channels.len();
        channels.retain(|&c| c != chat);
        if channels.len() == before {
            return Ok(false);
        }
        self.save(&channels)?;
        Ok(true)
    }

    fn save(&self, channels: &[i64]) -> tb_domain::error::Result<()> {
        self.kv.set(CHANNELS_KEY, &serde_json::to_string(channels)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_sessions::MemoryKv;

    fn registry() -> ChannelRegistry {
        ChannelRegistry::new(Arc::new(MemoryKv::new()))
    }

    #[test]
    fn empty_by_default() {
        assert!(registry().list().is_empty());
    }

    #[test]
    fn register_and_unregister() {
        let reg = registry();
        assert!(reg.register(-100).unwrap());
        assert!(!reg.register(-100).unwrap());
        assert!(reg.register(-200).unwrap());
        assert_eq!(reg.list(), vec![-100, -200]);

        assert!(reg.unregister(-100).unwrap());
        assert!(!reg.unregister(-100).unwrap());
        assert_eq!(reg.list(), vec![-200]);
    }

    #[test]
    fn corrupt_list_is_empty() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(CHANNELS_KEY, "not json").unwrap();
        let reg = ChannelRegistry::new(kv);
        assert!(reg.list().is_empty());
    }
}
