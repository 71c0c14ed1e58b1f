//! In-memory remote store
//!
//! Behaves like a remote file store that keeps every file in memory and
//! records each operation it sees. Used for dry runs and for testing code
//! built on the import workflow without an SFTP server.

use super::store::{RemoteStore, StoreConnector};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One operation observed by a [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Connect,
    Put(String),
    Rename { from: String, to: String },
    Exists(String),
    Close,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    history: Vec<StoreOp>,
    fail_renames: bool,
}

/// Shared in-memory store; clones see the same files
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a file directly, as the remote processor would
    pub async fn insert(&self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.state
            .lock()
            .await
            .files
            .insert(path.into(), contents.into());
    }

    /// Remove a file directly
    pub async fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().await.files.remove(path)
    }

    /// All file paths, sorted
    pub async fn list(&self) -> Vec<String> {
        self.state.lock().await.files.keys().cloned().collect()
    }

    pub async fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().await.files.get(path).cloned()
    }

    /// Every operation seen so far, in order
    pub async fn history(&self) -> Vec<StoreOp> {
        self.state.lock().await.history.clone()
    }

    /// Make every following rename fail
    pub async fn fail_renames(&self, fail: bool) {
        self.state.lock().await.fail_renames = fail;
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn put_file(&self, local: &Path, remote: &str) -> Result<()> {
        let bytes = tokio::fs::read(local).await?;
        let mut state = self.state.lock().await;
        state.history.push(StoreOp::Put(remote.to_string()));
        state.files.insert(remote.to_string(), bytes);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.history.push(StoreOp::Rename {
            from: from.to_string(),
            to: to.to_string(),
        });
        if state.fail_renames {
            return Err(Error::sftp(format!("rename {from} -> {to}: permission denied")));
        }
        // SFTP rename never replaces an existing target
        if state.files.contains_key(to) {
            return Err(Error::sftp(format!("rename {from} -> {to}: target exists")));
        }
        let bytes = state
            .files
            .remove(from)
            .ok_or_else(|| Error::sftp(format!("rename {from} -> {to}: no such file")))?;
        state.files.insert(to.to_string(), bytes);
        Ok(())
    }

    async fn exists(&self, remote: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.history.push(StoreOp::Exists(remote.to_string()));
        Ok(state.files.contains_key(remote))
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().await.history.push(StoreOp::Close);
        Ok(())
    }
}

#[async_trait]
impl StoreConnector for MemoryStore {
    type Store = MemoryStore;

    async fn connect(&self) -> Result<MemoryStore> {
        self.state.lock().await.history.push(StoreOp::Connect);
        Ok(self.clone())
    }
}
