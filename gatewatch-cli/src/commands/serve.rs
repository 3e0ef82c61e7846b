//! Serve command - run the HTTP API with background pollers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use gatewatch::server::{router, serve, AppState};
use gatewatch::tracking::BasePoller;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the serve command.
pub struct ServeArgs {
    pub config: Option<PathBuf>,
    pub debug: bool,
    pub bind: Option<String>,
    pub no_poll: bool,
    pub record_history: bool,
}

/// Run the serve command.
pub async fn run(args: ServeArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new(args.config.as_deref(), args.debug, true)?;
    runner.log_startup("serve");

    if let Some(bind) = args.bind {
        runner.config_mut().server.bind = bind;
    }
    if args.record_history {
        runner.config_mut().tracking.record_history = true;
    }

    let config = runner.config().clone();
    let addr: SocketAddr = config.server.bind.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid bind address '{}', expected host:port",
            config.server.bind
        ))
    })?;

    let coordinator = runner.create_coordinator().await?;
    let state = Arc::new(
        AppState::new(
            Arc::clone(&coordinator),
            runner.layout_store(),
            config.tracking.default_radius_nm,
        )
        .with_request_driven_trails(args.no_poll),
    );

    let cancel = CancellationToken::new();
    let mut pollers = Vec::new();

    if args.no_poll {
        info!("Background polling disabled; trails follow client requests");
    } else {
        let poller_config = config.poller_config();
        for base in coordinator.registry().iter() {
            let Some(trails) = state.trails(&base.code) else {
                continue;
            };
            let poller = BasePoller::new(
                &base.code,
                Arc::clone(&coordinator),
                Arc::clone(trails),
                poller_config.clone(),
            );
            pollers.push(poller.start(cancel.child_token()));
        }
    }

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|error| CliError::Bind {
            addr: addr.to_string(),
            error,
        })?;

    println!("gatewatch v{}", gatewatch::VERSION);
    println!("==============");
    println!();
    println!("Listening:  http://{}", addr);
    println!("Bases:      {}", coordinator.registry().codes().join(", "));
    println!(
        "Polling:    {}",
        if args.no_poll {
            "off".to_string()
        } else {
            format!("every {}s", config.tracking.poll_interval_secs)
        }
    );
    println!("Log file:   {}", config.logging.file.display());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        info!("Shutdown requested");
        shutdown.cancel();
    });

    let result = serve(listener, router(state), cancel.clone()).await;

    cancel.cancel();
    for handle in pollers {
        if let Err(e) = handle.await {
            warn!(error = %e, "Poller task failed");
        }
    }

    result.map_err(CliError::Serve)?;
    println!("Server stopped.");
    Ok(())
}
