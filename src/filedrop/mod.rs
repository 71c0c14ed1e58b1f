//! Batch import file drop
//!
//! Uploads import files over SFTP, commits them with an atomic rename, and
//! reads their outcome back from marker files written by the Dayforce batch
//! processor.
//!
//! # Overview
//!
//! - [`FileDrop`]: upload-then-rename, and single non-blocking status checks
//! - [`RemoteStore`] / [`StoreConnector`]: the remote operations the workflow needs
//! - [`SftpConnector`]: the russh-based SFTP implementation
//! - [`MemoryStore`]: an in-memory implementation
//! - [`HostKeyPolicy`]: validated server-key trust

mod host_key;
mod import;
mod memory;
mod sftp;
mod store;

pub use host_key::{HostKeyPolicy, PinnedKey};
pub use import::{FileDrop, ImportState, ImportToken, MAX_UPLOAD_BYTES};
pub use memory::{MemoryStore, StoreOp};
pub use sftp::{SftpConnector, SftpStore};
pub use store::{RemoteStore, StoreConnector};

#[cfg(test)]
mod tests;
