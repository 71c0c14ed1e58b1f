//! SFTP-backed remote store (russh + russh-sftp)

use super::host_key::HostKeyPolicy;
use super::store::{RemoteStore, StoreConnector};
use crate::auth::Credentials;
use crate::config::SftpConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::Disconnect;
use russh_keys::key::PublicKey;
use russh_sftp::client::SftpSession;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Verifies the server key against the configured policy
struct TrustHandler {
    policy: HostKeyPolicy,
}

#[async_trait]
impl client::Handler for TrustHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let trusted = self.policy.accepts(server_public_key);
        if !trusted {
            warn!(
                "Rejecting SFTP host key with fingerprint {}",
                server_public_key.fingerprint()
            );
        }
        Ok(trusted)
    }
}

fn sftp_err(context: &str, e: impl fmt::Display) -> Error {
    Error::sftp(format!("{context}: {e}"))
}

/// Opens authenticated SFTP sessions
#[derive(Debug, Clone)]
pub struct SftpConnector {
    host: String,
    port: u16,
    credentials: Credentials,
    policy: HostKeyPolicy,
    timeout: Duration,
}

impl SftpConnector {
    /// Build a connector. Fails with a configuration error when the host-key
    /// policy cannot be resolved.
    pub fn from_config(config: &SftpConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            credentials: config.credentials(),
            policy: config.host_key_policy()?,
            timeout: config.timeout(),
        })
    }

    pub fn policy(&self) -> &HostKeyPolicy {
        &self.policy
    }
}

#[async_trait]
impl StoreConnector for SftpConnector {
    type Store = SftpStore;

    async fn connect(&self) -> Result<SftpStore> {
        debug!("Opening SFTP session to {}:{}", self.host, self.port);

        let config = Arc::new(client::Config {
            inactivity_timeout: Some(self.timeout),
            ..Default::default()
        });
        let handler = TrustHandler {
            policy: self.policy.clone(),
        };

        let mut handle = tokio::time::timeout(
            self.timeout,
            client::connect(config, (self.host.as_str(), self.port), handler),
        )
        .await
        .map_err(|_| {
            Error::sftp(format!(
                "connecting to {}:{} timed out after {:?}",
                self.host, self.port, self.timeout
            ))
        })?
        .map_err(|e| sftp_err("connect", e))?;

        let authenticated = handle
            .authenticate_password(
                self.credentials.username.clone(),
                self.credentials.password.expose().to_string(),
            )
            .await
            .map_err(|e| sftp_err("authenticate", e))?;
        if !authenticated {
            return Err(Error::sftp(format!(
                "authentication rejected for user '{}'",
                self.credentials.username
            )));
        }

        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| sftp_err("open channel", e))?;
        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| sftp_err("request sftp subsystem", e))?;
        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| sftp_err("start sftp session", e))?;

        Ok(SftpStore {
            sftp,
            handle,
            timeout: self.timeout,
        })
    }
}

/// An open SFTP session
pub struct SftpStore {
    sftp: SftpSession,
    handle: Handle<TrustHandler>,
    timeout: Duration,
}

impl SftpStore {
    /// Bound a metadata operation by the configured timeout
    async fn timed<T, F>(&self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| Error::sftp(format!("{what} timed out after {:?}", self.timeout)))?
    }
}

#[async_trait]
impl RemoteStore for SftpStore {
    // Transfers are bounded by the session inactivity timeout, not by a total
    // deadline, so large files are not cut off.
    async fn put_file(&self, local: &Path, remote: &str) -> Result<()> {
        let mut source = tokio::fs::File::open(local).await?;
        let mut target = self
            .timed("create", async {
                self.sftp
                    .create(remote)
                    .await
                    .map_err(|e| sftp_err(&format!("create {remote}"), e))
            })
            .await?;

        let copied = tokio::io::copy(&mut source, &mut target).await?;
        target.shutdown().await?;
        debug!("Wrote {} bytes to {}", copied, remote);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.timed("rename", async {
            self.sftp
                .rename(from, to)
                .await
                .map_err(|e| sftp_err(&format!("rename {from} -> {to}"), e))
        })
        .await
    }

    async fn exists(&self, remote: &str) -> Result<bool> {
        self.timed("stat", async {
            self.sftp
                .try_exists(remote)
                .await
                .map_err(|e| sftp_err(&format!("stat {remote}"), e))
        })
        .await
    }

    async fn close(&self) -> Result<()> {
        debug!("Closing SFTP session");
        self.sftp
            .close()
            .await
            .map_err(|e| sftp_err("close sftp session", e))?;
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(|e| sftp_err("disconnect", e))
    }
}

impl fmt::Debug for SftpStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SftpStore")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
