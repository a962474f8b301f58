use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use commitflow_agent::{
    commit_workflow, status_banners, DiscoveryPrologue, WorkflowDeps, COMPLETION_BANNER,
};
use commitflow_channel::{OutputFrame, StatusReporter, StdioChannel, StdioTransport};
use commitflow_core::traits::GitBackend;
use commitflow_core::AppConfig;
use commitflow_git::GitCli;
use commitflow_graph::Executor;
use commitflow_llm::create_provider;

#[derive(Parser)]
#[command(
    name = "commitflow",
    version,
    about = "Stage, commit, and push with a generated commit message"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "commitflow.toml")]
    config: PathBuf,

    /// Repository to operate on (defaults to the current directory)
    #[arg(short, long)]
    repo: Option<PathBuf>,

    /// Discover repositories under $HOME and pick one interactively
    #[arg(long)]
    pick_repo: bool,
}

#[tokio::main]
async fn main() {
    // stdout carries the wire protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Credentials may live in a local .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let (transport, channel) = StdioChannel::stdio();

    let code = match run(&cli, transport.clone(), channel).await {
        Ok(()) => 0,
        Err(err) => {
            error!("workflow failed: {err:#}");
            let _ = transport
                .write_frame(&OutputFrame::error(&format!("{err:#}")))
                .await;
            1
        }
    };
    std::process::exit(code);
}

async fn run(
    cli: &Cli,
    transport: Arc<StdioTransport>,
    channel: StdioChannel,
) -> anyhow::Result<()> {
    let config = AppConfig::load_or_default(&cli.config)?;

    let discovery = if cli.pick_repo || config.discovery.enabled {
        let root = config
            .discovery_root()
            .unwrap_or_else(|| PathBuf::from("."));
        Some(DiscoveryPrologue {
            root,
            exclude: config.discovery.exclude.clone(),
        })
    } else {
        None
    };

    // With discovery the repository is chosen mid-run, so the backend must
    // follow the process working directory instead of pinning one up front.
    let pinned_repo = cli.repo.clone().or_else(|| config.workflow.repo.clone());
    let git: Arc<dyn GitBackend> = match (&discovery, pinned_repo) {
        (None, Some(repo)) => Arc::new(GitCli::new(repo)),
        _ => Arc::new(GitCli::process_cwd()),
    };

    let provider = create_provider(&config.provider)?;

    let deps = WorkflowDeps {
        git,
        provider,
        input: Arc::new(channel),
    };
    let graph = commit_workflow(&deps, discovery)?;

    let reporter = Arc::new(StatusReporter::new(
        transport,
        status_banners(),
        COMPLETION_BANNER,
    ));
    Executor::new().with_observer(reporter).run(&graph).await?;
    Ok(())
}
