use anyhow::Result;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Retained signing keys, newest first
const MAX_SIGNING_KEYS: usize = 5;

#[derive(Debug, Serialize, Deserialize, Default)]
struct KeysData {
    #[serde(default)]
    signing_keys: Vec<String>,
}

/// File-backed store of token-signing secrets.
///
/// The first key signs new tokens; every retained key is accepted when
/// validating, so tokens issued before a rotation stay valid until expiry.
pub struct KeyStore {
    path: PathBuf,
    signing_keys: Vec<String>,
}

impl KeyStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            signing_keys: Vec::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let data: KeysData = toml::from_str(&content)?;
            self.signing_keys = data.signing_keys;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = KeysData {
            signing_keys: self.signing_keys.clone(),
        };
        let content = toml::to_string_pretty(&data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn signing_keys(&self) -> &[String] {
        &self.signing_keys
    }

    pub fn current_key(&self) -> Option<&String> {
        self.signing_keys.first()
    }

    /// Make `key` the signing key, keeping older keys for verification
    pub fn rotate(&mut self, key: String) {
        self.signing_keys.insert(0, key);
        self.signing_keys.truncate(MAX_SIGNING_KEYS);
    }

    /// Generate a key when none exists yet. Returns true when the store changed.
    pub fn ensure_key(&mut self) -> bool {
        if self.signing_keys.is_empty() {
            self.rotate(generate_secret());
            true
        } else {
            false
        }
    }
}

/// 32 random bytes, hex encoded
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
