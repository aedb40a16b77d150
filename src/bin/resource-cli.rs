use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use resource_api_client::auth::StaticTokenProvider;
use resource_api_client::config::{load_config, ClientConfig};
use resource_api_client::observability::init_logging;
use resource_api_client::{ClientBuilder, IdEither, ListScope, ResourceApi, ToVecLimit};

#[derive(Parser)]
#[command(name = "resource-cli")]
#[command(about = "List and retrieve resources from the command line", long_about = None)]
struct Cli {
    /// TOML config file. Flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL, e.g. https://api.example.com/api/v1/projects/demo
    #[arg(short, long)]
    base_url: Option<String>,

    /// Bearer token
    #[arg(short, long, env = "RESOURCE_API_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List items of a resource, e.g. `list assets`
    List {
        resource: String,
        /// Maximum items to print (0 for all)
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
    },
    /// Retrieve items by numeric id or external id
    Retrieve {
        resource: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    init_logging(&config.observability.log_level)?;

    let mut builder = ClientBuilder::from_config(config);
    if let Some(token) = cli.token {
        builder = builder.auth_provider(Arc::new(StaticTokenProvider::new(token)));
    }
    let client = Arc::new(builder.build()?);

    match cli.command {
        Commands::List { resource, limit } => {
            let api: ResourceApi<Value> = ResourceApi::new(client, resource_path(&resource));
            let limit = if limit == 0 {
                ToVecLimit::All
            } else {
                ToVecLimit::Limit(limit)
            };
            let items = api.list(ListScope::new()).to_vec(limit).await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        Commands::Retrieve { resource, ids } => {
            let api: ResourceApi<Value> = ResourceApi::new(client, resource_path(&resource));
            let ids: Vec<IdEither> = ids.iter().map(|raw| parse_id(raw)).collect();
            let items = api.retrieve(&ids).await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }

    Ok(())
}

fn resource_path(resource: &str) -> String {
    format!("/{}", resource.trim_matches('/'))
}

/// Digits are internal ids, anything else an external id.
fn parse_id(raw: &str) -> IdEither {
    match raw.parse::<u64>() {
        Ok(id) => IdEither::id(id),
        Err(_) => IdEither::external_id(raw),
    }
}
