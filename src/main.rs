use anyhow::Result;

use wellness_sentinel::{config, realtime, routes, store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let mut config = config::Config::load()?;

    // Initialize logging with a configured level
    let log_level = if config.debug {
        "debug".to_string()
    } else {
        config.log_level.to_lowercase()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    config.validate()?;

    tracing::info!("🚀 {} starting...", config.app_name);
    tracing::info!(
        "Server configured: {}:{}",
        config.server_host,
        config.server_port
    );
    tracing::debug!("Debug mode: {}", config.debug);

    let assessments = match &config.database_file {
        Some(path) => store::AssessmentStore::open(path)?,
        None => {
            tracing::warn!("DATABASE_URL not set, saved assessments are kept in memory");
            store::AssessmentStore::in_memory()?
        }
    };
    tracing::info!("✅ Assessment store initialized");

    let state = routes::AppState::new(config.clone(), assessments)?;
    if state.openai.is_configured() {
        tracing::info!("✅ OpenAI client initialized (model: {})", config.openai_model);
    } else {
        tracing::warn!("Symptom analysis is disabled until OPENAI_API_KEY is set");
    }

    let heartbeat = realtime::start_heartbeat(state.rooms.clone(), state.lobby.clone());

    let app = routes::build_router(state.clone());

    // Bind to configured host and port
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    print_startup_banner(&config);

    tracing::info!("🚀 Server listening on http://{}", addr);

    let shutdown_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            heartbeat.abort();
            shutdown_state.close_sockets().await;
        })
        .await?;

    tracing::info!("👋 Server shutdown complete");

    Ok(())
}

/// Print startup banner
fn print_startup_banner(config: &config::Config) {
    let banner = r#"
╔═══════════════════════════════════════════════════════════╗
║                                                           ║
║               🩺 Wellness Sentinel Backend                ║
║                                                           ║
║  Risk assessment, symptom checking, content and chat     ║
║                                                           ║
╚═══════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner);
    println!("  Version:     {}", config.app_version);
    println!(
        "  Server:      http://{}:{}",
        config.server_host, config.server_port
    );
    println!("  API prefix:  {}", config.api_prefix);
    println!("  Frontend:    {}", config.frontend_url);
    println!(
        "  OpenAI:      {} ({})",
        if config.openai_api_key.is_some() {
            "configured"
        } else {
            "not configured"
        },
        config.openai_model
    );
    println!(
        "  Database:    {}",
        config
            .database_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "in-memory".to_string())
    );
    println!("  Log Level:   {}", config.log_level);
    println!();
}

/// Handle graceful shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
