//! Remote file store seam
//!
//! The import workflow only needs three remote operations: write a file,
//! rename it, and probe whether a path exists. Sessions are opened through a
//! [`StoreConnector`] so the workflow can open one on demand or reuse one the
//! caller already holds.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// An open session against the remote file store.
///
/// Sessions are not meant to be shared between concurrent operations; hold
/// one per logical call sequence.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Copy the bytes of `local` to `remote`, creating or truncating it
    async fn put_file(&self, local: &Path, remote: &str) -> Result<()>;

    /// Rename `from` to `to`
    async fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Whether anything exists at `remote`
    async fn exists(&self, remote: &str) -> Result<bool>;

    /// End the session
    async fn close(&self) -> Result<()>;
}

/// Opens sessions against a remote file store
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Session type produced by this connector
    type Store: RemoteStore;

    /// Open a new session
    async fn connect(&self) -> Result<Self::Store>;
}
