//! breadcrumbs - diagnostic assistant for the local machine

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use breadcrumbs_core::{
    build_front_door, CancellationToken, ConsoleLogger, EnvSecretStore, HostSignals,
    Logger, ServiceConfig, SystemSignals, ToolRegistry, VpnDetector,
};
use breadcrumbs_server::{run, AppState, ServerResult};

#[derive(Parser)]
#[command(name = "breadcrumbs")]
#[command(version, about = "Ask questions about this machine's network state")]
struct Cli {
    /// Configuration file (default: ~/.config/breadcrumbs/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },

    /// Ask one question and print the answer
    Ask {
        message: String,
        /// Answer without offering any tools
        #[arg(long)]
        no_tools: bool,
        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// List the diagnostic tools
    Tools,

    /// Run VPN detection and print the result as JSON
    Vpn,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new().from_env());

    match execute(cli, logger).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli, logger: Arc<dyn Logger>) -> ServerResult<()> {
    let signals: Arc<dyn SystemSignals> = Arc::new(HostSignals::new(Arc::clone(&logger)));

    match cli.command {
        Commands::Serve { bind } => {
            let mut config = ServiceConfig::load(cli.config.as_deref())?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let addr = config.bind_addr()?;
            let door = build_front_door(&config, signals, Arc::new(EnvSecretStore::new()), Arc::clone(&logger))?;
            let state = AppState::new(Arc::new(door), config.server.api_keys.clone(), logger);
            run(state, addr).await?;
        }

        Commands::Ask {
            message,
            no_tools,
            timeout_secs,
        } => {
            let config = ServiceConfig::load(cli.config.as_deref())?;
            let door = build_front_door(&config, signals, Arc::new(EnvSecretStore::new()), logger)?;
            let reply = door
                .handle(&message, !no_tools, timeout_secs.map(Duration::from_secs), None)
                .await?;

            println!("{}", reply.answer);
            if !reply.tools_used.is_empty() {
                println!("\n(tools: {})", reply.tools_used.join(", "));
            }
        }

        Commands::Tools => {
            let registry = ToolRegistry::with_builtin_tools(signals, logger);
            for tool in registry.definitions() {
                println!("{:<20} {}", tool.name, tool.description);
            }
        }

        Commands::Vpn => {
            let detector = VpnDetector::new(signals, logger);
            let result = detector.detect(CancellationToken::new()).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
