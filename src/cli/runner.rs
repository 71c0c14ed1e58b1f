//! CLI runner - executes commands

use crate::api::DayforceClient;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::DayforceConfig;
use crate::error::{Error, Result};
use crate::filedrop::{FileDrop, ImportState, ImportToken, StoreConnector};
use crate::http::QueryParams;
use crate::pagination::{PaginatedSequence, RecordShape};
use futures::StreamExt;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Get {
                resource,
                params,
                rows,
                page,
            } => {
                let shape = if *rows {
                    RecordShape::NestedRows
                } else {
                    RecordShape::Flat
                };
                self.get(resource, to_params(params), shape, *page).await
            }
            Commands::Report { xref_code, params } => {
                self.report(xref_code, to_params(params)).await
            }
            Commands::Upload { file, import_type } => self.upload(file, import_type).await,
            Commands::Status {
                token,
                wait,
                interval,
            } => {
                self.status(
                    &ImportToken::new(token.as_str()),
                    *wait,
                    Duration::from_secs(*interval),
                )
                .await
            }
        }
    }

    /// Load the config file named on the command line
    fn load_config(&self) -> Result<DayforceConfig> {
        debug!("Loading config from {}", self.cli.config.display());
        DayforceConfig::from_file(&self.cli.config)
    }

    fn client(&self) -> Result<DayforceClient> {
        let config = self.load_config()?;
        DayforceClient::new(&config.api)
    }

    fn file_drop(&self) -> Result<FileDrop<crate::filedrop::SftpConnector>> {
        let config = self.load_config()?;
        FileDrop::from_config(config.require_sftp()?)
    }

    async fn get(
        &self,
        resource: &str,
        params: QueryParams,
        shape: RecordShape,
        first_page_only: bool,
    ) -> Result<()> {
        let client = self.client()?;
        if first_page_only {
            let page = client.get_resource(resource, &params).await?;
            self.output_message(page.body());
            return Ok(());
        }
        let sequence = client.paginate(resource, params, shape).await?;
        self.output_records(sequence).await
    }

    async fn report(&self, xref_code: &str, params: QueryParams) -> Result<()> {
        let sequence = self.client()?.report_rows(xref_code, params).await?;
        self.output_records(sequence).await
    }

    async fn upload(&self, file: &Path, import_type: &str) -> Result<()> {
        let token = self.file_drop()?.upload(file, import_type).await?;
        self.output_message(&json!({ "token": token }));
        Ok(())
    }

    async fn status(&self, token: &ImportToken, wait: bool, interval: Duration) -> Result<()> {
        let file_drop = self.file_drop()?;
        let outcome = if wait {
            poll_until_terminal(&file_drop, token, interval).await
        } else {
            file_drop.check(token).await
        };

        match outcome {
            Ok(state) => {
                self.output_message(&json!({ "token": token, "state": state.to_string() }));
                Ok(())
            }
            Err(Error::ImportFailed { token, marker }) => {
                self.output_message(&json!({
                    "token": token,
                    "state": ImportState::Failed.to_string(),
                    "marker": marker,
                }));
                Err(Error::ImportFailed { token, marker })
            }
            Err(e) => Err(e),
        }
    }

    /// Print every record of a sequence as it arrives
    async fn output_records(&self, sequence: PaginatedSequence) -> Result<()> {
        let mut records = std::pin::pin!(sequence.into_stream());
        let mut count = 0usize;
        while let Some(item) = records.next().await {
            let (_, record) = item?;
            self.output_message(&record);
            count += 1;
        }
        info!("Fetched {} records", count);
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

fn to_params(pairs: &[(String, String)]) -> QueryParams {
    pairs.iter().cloned().collect()
}

/// Check an import until it reaches a terminal state, sleeping between checks
async fn poll_until_terminal<C: StoreConnector>(
    file_drop: &FileDrop<C>,
    token: &ImportToken,
    interval: Duration,
) -> Result<ImportState> {
    loop {
        let state = file_drop.check(token).await?;
        if state.is_terminal() {
            return Ok(state);
        }
        debug!("Import {} still pending, next check in {:?}", token, interval);
        tokio::time::sleep(interval).await;
    }
}
