//! ussdflow CLI and USSD gateway entry point.
//!
//! Binary name: `ussdflow`
//!
//! Parses CLI arguments, initializes tracing and state, then either serves
//! the gateway or runs a terminal command.

mod cli;
mod demo;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;
use ussdflow_infra::config::{load_global_config, resolve_data_dir};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,ussdflow=debug,ussdflow_core=debug,ussdflow_infra=debug",
        _ => "trace",
    };
    ussdflow_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    ussdflow_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "ussdflow", &mut std::io::stdout());
        return Ok(());
    }

    if let Commands::Simulate {
        session,
        ephemeral: true,
    } = &cli.command
    {
        let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
        let config = load_global_config(&data_dir).await;
        let state = AppState::ephemeral(config, data_dir)?;
        return cli::simulate::run_simulation(&state, session.clone()).await;
    }

    let state = AppState::init(cli.data_dir).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} ussdflow gateway listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}/api/v1/ussd")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Simulate { session, .. } => {
            cli::simulate::run_simulation(&state, session).await?;
        }

        Commands::Inspect { session } => {
            cli::session::inspect_session(&state, &session).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
