//! CLI runner - executes commands

use crate::auth::Credentials;
use crate::cli::commands::{Cli, Commands, OutputFormat, ResourceKind};
use crate::client::{CallOptions, ConfigServiceV2Client};
use crate::config::{load_client_options, ClientOptions};
use crate::error::{Error, Result, ResultExt};
use crate::model::{
    DeleteBucketRequest, DeleteViewRequest, GetBucketRequest, GetCmekSettingsRequest,
    GetViewRequest, ListBucketsRequest, ListExclusionsRequest, ListSinksRequest,
    ListViewsRequest,
};
use crate::resource_names::parse_resource_name;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
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
            Commands::List {
                kind,
                parent,
                page_size,
                max_items,
            } => self.list(*kind, parent, *page_size, *max_items).await,
            Commands::Get { kind, name } => self.get(*kind, name).await,
            Commands::Delete { kind, name } => self.delete(*kind, name).await,
            Commands::Cmek { name } => self.cmek(name).await,
            Commands::ParseName { path } => self.parse_name(path),
        }
    }

    /// Client options from the options file, overridden by flags
    fn client_options(&self) -> Result<ClientOptions> {
        let mut options = match &self.cli.options {
            Some(path) => load_client_options(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?,
            None => ClientOptions::default(),
        };
        if let Some(endpoint) = &self.cli.endpoint {
            options.api_endpoint = Some(endpoint.clone());
        }
        if let Some(api_key) = &self.cli.api_key {
            options.api_key = Some(api_key.clone());
        }
        Ok(options)
    }

    fn build_client(&self) -> Result<ConfigServiceV2Client> {
        let mut builder = ConfigServiceV2Client::builder().client_options(self.client_options()?);
        if let Some(path) = &self.cli.credentials {
            let credentials = Credentials::from_service_account_file(path)
                .context("Failed to load service account credentials")?;
            builder = builder.credentials(credentials);
        }
        builder.build()
    }

    async fn list(
        &self,
        kind: ResourceKind,
        parent: &str,
        page_size: Option<i32>,
        max_items: Option<usize>,
    ) -> Result<()> {
        let client = self.build_client()?;
        let page_size = page_size.unwrap_or_default();
        let options = CallOptions::new();

        let emitted = match kind {
            ResourceKind::Bucket => {
                let request = ListBucketsRequest {
                    parent: parent.to_string(),
                    page_size,
                    ..Default::default()
                };
                let pager = client.list_buckets(Some(request), None, options).await?;
                self.emit_items(pager.items(), max_items).await?
            }
            ResourceKind::View => {
                let request = ListViewsRequest {
                    parent: parent.to_string(),
                    page_size,
                    ..Default::default()
                };
                let pager = client.list_views(Some(request), None, options).await?;
                self.emit_items(pager.items(), max_items).await?
            }
            ResourceKind::Sink => {
                let request = ListSinksRequest {
                    parent: parent.to_string(),
                    page_size,
                    ..Default::default()
                };
                let pager = client.list_sinks(Some(request), None, options).await?;
                self.emit_items(pager.items(), max_items).await?
            }
            ResourceKind::Exclusion => {
                let request = ListExclusionsRequest {
                    parent: parent.to_string(),
                    page_size,
                    ..Default::default()
                };
                let pager = client.list_exclusions(Some(request), None, options).await?;
                self.emit_items(pager.items(), max_items).await?
            }
        };

        info!(count = emitted, parent, "Listed {kind:?} resources");
        Ok(())
    }

    /// Print items until the stream ends or `max_items` is reached
    ///
    /// Stops polling at the limit, so no page beyond it is fetched.
    async fn emit_items<T: Serialize>(
        &self,
        mut items: BoxStream<'static, Result<T>>,
        max_items: Option<usize>,
    ) -> Result<usize> {
        let mut count = 0;
        loop {
            if max_items.is_some_and(|max| count >= max) {
                break;
            }
            let Some(item) = items.next().await else {
                break;
            };
            self.output_message(&serde_json::to_value(item?)?);
            count += 1;
        }
        Ok(count)
    }

    async fn get(&self, kind: ResourceKind, name: &str) -> Result<()> {
        let client = self.build_client()?;
        let options = CallOptions::new();

        let value = match kind {
            ResourceKind::Bucket => {
                let request = GetBucketRequest {
                    name: name.to_string(),
                };
                serde_json::to_value(client.get_bucket(request, options).await?)?
            }
            ResourceKind::View => {
                let request = GetViewRequest {
                    name: name.to_string(),
                };
                serde_json::to_value(client.get_view(request, options).await?)?
            }
            ResourceKind::Sink => {
                serde_json::to_value(client.get_sink(None, Some(name), options).await?)?
            }
            ResourceKind::Exclusion => {
                serde_json::to_value(client.get_exclusion(None, Some(name), options).await?)?
            }
        };

        self.output_message(&value);
        Ok(())
    }

    async fn delete(&self, kind: ResourceKind, name: &str) -> Result<()> {
        let client = self.build_client()?;
        let options = CallOptions::new();

        match kind {
            ResourceKind::Bucket => {
                let request = DeleteBucketRequest {
                    name: name.to_string(),
                };
                client.delete_bucket(request, options).await?;
            }
            ResourceKind::View => {
                let request = DeleteViewRequest {
                    name: name.to_string(),
                };
                client.delete_view(request, options).await?;
            }
            ResourceKind::Sink => client.delete_sink(None, Some(name), options).await?,
            ResourceKind::Exclusion => client.delete_exclusion(None, Some(name), options).await?,
        }

        debug!(name, "Deleted {kind:?}");
        self.output_message(&json!({ "deleted": name }));
        Ok(())
    }

    async fn cmek(&self, name: &str) -> Result<()> {
        let client = self.build_client()?;
        let request = GetCmekSettingsRequest {
            name: name.to_string(),
        };
        let settings = client.get_cmek_settings(request, CallOptions::new()).await?;
        self.output_message(&serde_json::to_value(settings)?);
        Ok(())
    }

    /// Identify a resource name without contacting the service
    fn parse_name(&self, path: &str) -> Result<()> {
        let (kind, segments) = parse_resource_name(path).ok_or_else(|| {
            Error::invalid_argument(format!("'{path}' does not match any known resource name"))
        })?;
        self.output_message(&json!({ "kind": kind, "segments": segments }));
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
