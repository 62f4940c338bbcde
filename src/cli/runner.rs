//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::{BtagClient, Page, SendMessage};
use crate::config::ClientConfig;
use crate::error::{Error, Result, ResultExt};
use crate::message::{MessageBuilder, MessageFields};
use crate::types::{params, Credentials, RequestOptions};
use serde_json::Value;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

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
            Commands::Request {
                endpoint,
                params,
                all,
            } => self.request(endpoint, params, *all).await,
            Commands::BuildMessage { fields } => self.build_message(fields).await,
            Commands::Send {
                fields,
                sender,
                no_track,
            } => self.send(fields, sender.as_deref(), !*no_track).await,
        }
    }

    /// Load the client configuration from `--config` or the environment
    fn load_config(&self) -> Result<ClientConfig> {
        match &self.cli.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                ClientConfig::from_file(path)
            }
            None => Ok(ClientConfig::from_env()),
        }
    }

    /// Build a client from the environment credentials
    fn client(&self) -> Result<BtagClient> {
        BtagClient::with_config(Credentials::from_env()?, self.load_config()?)
    }

    async fn request(&self, endpoint: &str, pairs: &[(String, String)], all: bool) -> Result<()> {
        let client = self.client()?;
        let params = params(pairs.iter().cloned());

        let mut options = if all {
            RequestOptions::all_results()
        } else {
            RequestOptions::new()
        };

        if all {
            let token = CancellationToken::new();
            let on_signal = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping after the current page");
                    on_signal.cancel();
                }
            });
            options = options.with_cancel(token);
        }

        let pages = client
            .request_each(endpoint, params, options, |page| self.emit_page(page))
            .await?;

        info!(endpoint, pages, "Request complete");
        Ok(())
    }

    async fn build_message(&self, path: &Path) -> Result<()> {
        let fields = read_fields(path)?;
        let raw = MessageBuilder::new().build(&fields).await?;
        println!("{raw}");
        Ok(())
    }

    async fn send(&self, path: &Path, sender: Option<&str>, track: bool) -> Result<()> {
        let fields = read_fields(path)?;
        let client = self.client()?;

        let sender = match sender {
            Some(sender) => sender.to_string(),
            None => fields
                .from
                .clone()
                .ok_or_else(|| Error::missing_field("from"))?,
        };

        let raw = client.build_message(&fields).await?;
        let page = client
            .send_message(&SendMessage::new(sender, raw).track(track))
            .await?;

        self.emit(&page.body);
        Ok(())
    }

    fn emit_page(&self, page: &Page) {
        debug!(fingerprint = %page.fingerprint, next = ?page.next, total = ?page.total, "Page");
        self.emit(&page.body);
    }

    fn emit(&self, body: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(body).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(body).unwrap_or_default());
            }
        }
    }
}

/// Read message fields from a JSON file
fn read_fields(path: &Path) -> Result<MessageFields> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read message fields {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid message fields in {}", path.display()))
}
