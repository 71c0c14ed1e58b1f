//! Batch import upload and status
//!
//! Dayforce picks up import files from `<root>/Import/<type>/`. A file is
//! written under its plain name, then renamed to `<name>.ready`, which is
//! the signal that it is complete. Once the batch processor has handled it,
//! a marker appears next to it:
//!
//! ```text
//! <root>/Import/<type>/<name>                staged
//! <root>/Import/<type>/<name>.ready          committed
//! <root>/Import/<type>/archive/<name>.done   succeeded
//! <root>/Import/<type>/error/<name>.error    failed
//! ```
//!
//! The staged path is the [`ImportToken`] used for every status check.

use super::sftp::SftpConnector;
use super::store::{RemoteStore, StoreConnector};
use crate::config::SftpConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Largest file accepted for upload (100 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

const READY_SUFFIX: &str = ".ready";

/// Handle to one uploaded import file: its staged remote path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportToken(String);

impl ImportToken {
    /// Rebuild a token from a path returned by an earlier upload
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into directory and file name
    pub fn split(&self) -> (&str, &str) {
        match self.0.rsplit_once('/') {
            Some(("", file)) => ("/", file),
            Some((dir, file)) => (dir, file),
            None => ("", self.0.as_str()),
        }
    }

    /// Path of the committed file
    pub fn ready_path(&self) -> String {
        format!("{}{READY_SUFFIX}", self.0)
    }

    /// Path whose existence means the import succeeded
    pub fn done_marker(&self) -> String {
        let (dir, file) = self.split();
        join(dir, &format!("archive/{file}.done"))
    }

    /// Path whose existence means the import failed
    pub fn error_marker(&self) -> String {
        let (dir, file) = self.split();
        join(dir, &format!("error/{file}.error"))
    }
}

impl fmt::Display for ImportToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ImportToken {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&str> for ImportToken {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

fn join(dir: &str, rest: &str) -> String {
    if dir.is_empty() {
        rest.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{rest}")
    } else {
        format!("{dir}/{rest}")
    }
}

/// Outcome of an import as observed through its marker files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportState {
    /// No marker yet; check again later
    Pending,
    /// The success marker exists
    Succeeded,
    /// The error marker exists
    Failed,
}

impl ImportState {
    /// Succeeded and Failed never change again
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Upload and status workflow for the batch import drop.
///
/// `upload` and `check` open a session, run, and close it again on every
/// exit path. The `*_with` variants run on a session the caller opened with
/// [`FileDrop::open_session`] and leave it open.
#[derive(Debug, Clone)]
pub struct FileDrop<C> {
    connector: C,
    root: String,
}

impl FileDrop<SftpConnector> {
    /// SFTP-backed file drop. Fails with a configuration error when the
    /// host-key policy cannot be resolved.
    pub fn from_config(config: &SftpConfig) -> Result<Self> {
        Ok(Self::new(SftpConnector::from_config(config)?, &config.root))
    }
}

impl<C: StoreConnector> FileDrop<C> {
    /// File drop rooted at `root` (the directory containing `Import/`)
    pub fn new(connector: C, root: impl Into<String>) -> Self {
        let root = root.into().trim_end_matches('/').to_string();
        Self { connector, root }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Open a session the caller can reuse across several calls
    pub async fn open_session(&self) -> Result<C::Store> {
        self.connector.connect().await
    }

    /// Remote path a file is staged under before commit
    pub fn staging_path(&self, import_type: &str, filename: &str) -> String {
        format!("{}/Import/{import_type}/{filename}", self.root)
    }

    /// Upload `local` as an import of `import_type` and commit it.
    ///
    /// The size limit is checked before any connection is made.
    pub async fn upload(&self, local: &Path, import_type: &str) -> Result<ImportToken> {
        let filename = prepare_upload(local, import_type).await?;
        let store = self.open_session().await?;
        let result = self.transfer(&store, local, import_type, &filename).await;
        release(store, result).await
    }

    /// [`FileDrop::upload`] on a caller-held session
    pub async fn upload_with(
        &self,
        store: &C::Store,
        local: &Path,
        import_type: &str,
    ) -> Result<ImportToken> {
        let filename = prepare_upload(local, import_type).await?;
        self.transfer(store, local, import_type, &filename).await
    }

    /// Classify the import behind `token`.
    ///
    /// Pending is a normal result. A failure marker is returned as
    /// [`Error::ImportFailed`].
    pub async fn check(&self, token: &ImportToken) -> Result<ImportState> {
        let store = self.open_session().await?;
        let result = check_markers(&store, token).await;
        release(store, result).await
    }

    /// [`FileDrop::check`] on a caller-held session
    pub async fn check_with(&self, store: &C::Store, token: &ImportToken) -> Result<ImportState> {
        check_markers(store, token).await
    }

    async fn transfer(
        &self,
        store: &C::Store,
        local: &Path,
        import_type: &str,
        filename: &str,
    ) -> Result<ImportToken> {
        let token = ImportToken::new(self.staging_path(import_type, filename));

        store.put_file(local, token.as_str()).await?;
        // A scanner could see the staged name between these two calls; it is
        // expected to ignore files without the ready suffix.
        store.rename(token.as_str(), &token.ready_path()).await?;

        info!("Committed import {}", token.ready_path());
        Ok(token)
    }
}

/// Local preconditions: a file name, an import type, and the size limit
async fn prepare_upload(local: &Path, import_type: &str) -> Result<String> {
    if import_type.is_empty() || import_type.contains('/') {
        return Err(Error::invalid_value(
            "import_type",
            format!("'{import_type}' is not a single directory name"),
        ));
    }

    let filename = local
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            Error::invalid_value("local_file", format!("{} has no file name", local.display()))
        })?
        .to_string();

    let size = tokio::fs::metadata(local).await?.len();
    if size > MAX_UPLOAD_BYTES {
        return Err(Error::FileTooLarge {
            path: local.display().to_string(),
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    debug!("Uploading {} ({} bytes) as {}", local.display(), size, import_type);
    Ok(filename)
}

async fn check_markers<S: RemoteStore>(store: &S, token: &ImportToken) -> Result<ImportState> {
    if store.exists(&token.done_marker()).await? {
        info!("Import {} succeeded", token);
        return Ok(ImportState::Succeeded);
    }

    let error_marker = token.error_marker();
    if store.exists(&error_marker).await? {
        warn!("Import {} failed, marker at {}", token, error_marker);
        return Err(Error::ImportFailed {
            token: token.to_string(),
            marker: error_marker,
        });
    }

    debug!("Import {} pending", token);
    Ok(ImportState::Pending)
}

/// Close a session we opened; the operation's own error wins over a close
/// failure.
async fn release<S: RemoteStore, T>(store: S, result: Result<T>) -> Result<T> {
    let closed = store.close().await;
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("Failed to close session after error: {close_err}");
            Err(e)
        }
    }
}
