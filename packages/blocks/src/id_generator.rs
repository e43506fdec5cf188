use crc32fast::Hasher;
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_PREFIX: &str = "node";

/// Derive a short session seed from an arbitrary key using CRC32
pub fn session_seed(key: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for block nodes within an editing session
///
/// Ids look like `node-<seed>-<n>`. Two generators built from the same key
/// produce the same sequence, so sessions should use distinct keys.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(session_key: &str) -> Self {
        Self::from_seed(session_seed(session_key))
    }

    pub fn from_seed(seed: String) -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            seed,
            count: 0,
        }
    }

    /// Generator keyed on the current process and wall clock
    pub fn session() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::new(&format!("{}-{}", std::process::id(), nanos))
    }

    /// Use a different id prefix. Characters outside `[A-Za-z0-9_-]` are
    /// stripped; an empty result falls back to `node`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        let cleaned: String = prefix
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        self.prefix = if cleaned.is_empty() {
            DEFAULT_PREFIX.to_string()
        } else {
            cleaned
        };
        self
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}-{}", self.prefix, self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::session()
    }
}
