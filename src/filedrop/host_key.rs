//! Host-key trust for the SFTP connection

use crate::error::{Error, Result};
use russh_keys::key::PublicKey;

/// How the SFTP server's host key is trusted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Accept any server key
    Disabled,
    /// Accept only this key
    Pinned(PinnedKey),
}

impl HostKeyPolicy {
    /// Build the policy from the two config knobs.
    ///
    /// Exactly one of `disabled` or `key` must be given; anything else is a
    /// configuration error, raised here rather than at connect time.
    pub fn resolve(disabled: bool, key: Option<&str>) -> Result<Self> {
        match (disabled, key) {
            (true, None) => Ok(Self::Disabled),
            (false, Some(key)) => Ok(Self::Pinned(PinnedKey::parse(key)?)),
            (true, Some(_)) => Err(Error::config(
                "host key checking is disabled but a host key is also configured",
            )),
            (false, None) => Err(Error::config(
                "no host key configured; set sftp.host_key or sftp.disable_host_key_check",
            )),
        }
    }

    /// Whether a server presenting `key` should be trusted
    pub fn accepts(&self, key: &PublicKey) -> bool {
        match self {
            Self::Disabled => true,
            Self::Pinned(pinned) => pinned.matches(key),
        }
    }
}

/// An expected server public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedKey {
    fingerprint: String,
}

impl PinnedKey {
    /// Parse `ssh-ed25519 AAAA... [comment]` or a bare base64 key blob
    pub fn parse(key: &str) -> Result<Self> {
        let mut parts = key.split_whitespace();
        let first = parts
            .next()
            .ok_or_else(|| Error::invalid_value("sftp.host_key", "empty key"))?;
        let blob = parts.next().unwrap_or(first);

        let public = russh_keys::parse_public_key_base64(blob)
            .map_err(|e| Error::invalid_value("sftp.host_key", e.to_string()))?;

        Ok(Self {
            fingerprint: public.fingerprint(),
        })
    }

    /// SHA-256 fingerprint of the pinned key
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn matches(&self, key: &PublicKey) -> bool {
        key.fingerprint() == self.fingerprint
    }
}
