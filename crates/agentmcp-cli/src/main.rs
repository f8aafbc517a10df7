//! agentmcp - portable MCP servers for agent CLIs
//!
//! Usage:
//!   agentmcp catalog                      # List catalog servers
//!   agentmcp resolve brave weather        # Show resolved definitions
//!   agentmcp render -p claude brave       # Show provider-native config
//!   agentmcp run -p gemini -s brave "..." # Run one goal

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agentmcp_core::client::{AgentClient, resolve_mcp_servers};
use agentmcp_core::config::{AgentMcpConfig, ProviderKind, load_config};
use agentmcp_core::mcp::{McpServerCatalog, ResolvedServers};

#[derive(Parser)]
#[command(name = "agentmcp")]
#[command(about = "Portable MCP server catalog for agent CLIs", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/agentmcp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List servers in the catalog
    Catalog {
        /// Catalog file or directory (overrides config)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Resolve server names to their portable definitions
    Resolve {
        /// Server names
        names: Vec<String>,

        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print the provider-native configuration for server names
    Render {
        #[arg(short, long)]
        provider: ProviderArg,

        names: Vec<String>,

        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Run one goal with MCP servers attached
    Run {
        /// Provider (defaults to config)
        #[arg(short, long)]
        provider: Option<ProviderArg>,

        /// Server name, repeatable
        #[arg(short, long = "server", value_name = "NAME")]
        servers: Vec<String>,

        /// Working directory (defaults to config, then current directory)
        #[arg(short, long)]
        workdir: Option<PathBuf>,

        /// Timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        #[arg(long)]
        catalog: Option<PathBuf>,

        prompt: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Gemini,
    Claude,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Gemini => ProviderKind::Gemini,
            ProviderArg::Claude => ProviderKind::Claude,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agentmcp=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Catalog { catalog, format } => run_catalog(&config, catalog.as_deref(), format),
        Commands::Resolve { names, catalog } => run_resolve(&config, catalog.as_deref(), &names),
        Commands::Render {
            provider,
            names,
            catalog,
        } => run_render(&config, catalog.as_deref(), provider.into(), &names),
        Commands::Run {
            provider,
            servers,
            workdir,
            timeout,
            catalog,
            prompt,
        } => run_goal(
            &config,
            RunArgs {
                provider: provider.map(Into::into),
                servers,
                workdir,
                timeout,
                catalog,
                prompt,
            },
        ),
    }
}

fn load_catalog(
    config: &AgentMcpConfig,
    explicit: Option<&Path>,
) -> Result<Option<McpServerCatalog>> {
    match explicit {
        Some(path) => McpServerCatalog::from_path(path)
            .map(Some)
            .with_context(|| format!("Failed to load catalog from {}", path.display())),
        None => config.load_catalog().context("Failed to load configured catalog"),
    }
}

fn resolve(
    config: &AgentMcpConfig,
    catalog: Option<&Path>,
    names: &[String],
) -> Result<ResolvedServers> {
    let catalog = load_catalog(config, catalog)?;
    Ok(resolve_mcp_servers(
        catalog.as_ref(),
        &config.default_servers,
        names,
    )?)
}

fn run_catalog(
    config: &AgentMcpConfig,
    catalog: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let Some(catalog) = load_catalog(config, catalog)? else {
        println!("No catalog configured.");
        return Ok(());
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(catalog.all())?);
        }
        OutputFormat::Table => {
            if catalog.is_empty() {
                println!("Catalog is empty.");
                return Ok(());
            }
            let width = catalog.names().map(str::len).max().unwrap_or(0).max(4);
            println!("{:<width$}  {:<5}  ENDPOINT", "NAME", "TYPE");
            for (name, definition) in catalog.all() {
                println!(
                    "{:<width$}  {:<5}  {}",
                    name,
                    definition.transport().as_str(),
                    definition.endpoint()
                );
            }
        }
    }
    Ok(())
}

fn run_resolve(config: &AgentMcpConfig, catalog: Option<&Path>, names: &[String]) -> Result<()> {
    let resolved = resolve(config, catalog, names)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

fn run_render(
    config: &AgentMcpConfig,
    catalog: Option<&Path>,
    provider: ProviderKind,
    names: &[String],
) -> Result<()> {
    let resolved = resolve(config, catalog, names)?;
    let mut servers = Map::new();
    for (name, definition) in &resolved {
        servers.insert(name.clone(), provider.render(definition)?);
    }

    let mut document = Map::new();
    document.insert("mcpServers".to_string(), Value::Object(servers));
    println!("{}", serde_json::to_string_pretty(&Value::Object(document))?);
    Ok(())
}

struct RunArgs {
    provider: Option<ProviderKind>,
    servers: Vec<String>,
    workdir: Option<PathBuf>,
    timeout: Option<u64>,
    catalog: Option<PathBuf>,
    prompt: String,
}

fn run_goal(config: &AgentMcpConfig, args: RunArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let workdir = args
        .workdir
        .or_else(|| config.working_directory_in(&cwd))
        .unwrap_or(cwd);
    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.timeout());
    debug!("Running in {} with timeout {:?}", workdir.display(), timeout);

    let mut builder = AgentClient::builder(config.build_model(args.provider))
        .default_mcp_servers(config.default_servers.iter().cloned())
        .default_working_directory(&workdir)
        .default_timeout(timeout);
    if let Some(catalog) = load_catalog(config, args.catalog.as_deref())? {
        builder = builder.mcp_server_catalog(catalog);
    }
    let client = builder.build();

    let response = client
        .goal(args.prompt)
        .mcp_servers(args.servers)
        .run()
        .context("Agent run failed")?;

    if response.is_successful() {
        println!("{}", response.result());
        Ok(())
    } else {
        let detail = response
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        anyhow::bail!("Agent returned no result: {}", detail)
    }
}
