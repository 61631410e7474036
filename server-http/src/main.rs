use itroom::auth::{AuthError, RoleName};
use server_http::{AppState, build_router};
use shared::config::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file (if exists)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting ITRoom API server...");
    if dotenv_loaded {
        info!("Loaded environment variables from .env file");
    } else {
        info!("No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    config.validate()?;

    info!("Opening stores under {}", config.data_dir);
    let state = AppState::open(&config)?;

    seed(&state, &config).await?;

    info!(
        "Permission cache TTL: {}s, elevated roles: {:?}",
        config.permission_cache_ttl.as_secs(),
        config.elevated_roles
    );

    let router = build_router(state, &config.allowed_origins);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("HTTP Server listening on http://{}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Seed default permission records and the admin account on first start
async fn seed(state: &AppState, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let created = state
        .permission_service
        .initialize_default_permissions()
        .await?;
    if !created.is_empty() {
        info!("Seeded {} default permission records", created.len());
    }

    match state.user_service.get_user(&config.admin_username).await {
        Ok(_) => info!("Admin user already exists: {}", config.admin_username),
        Err(AuthError::UserNotFound) => {
            info!("Creating default admin user: {}", config.admin_username);
            state
                .user_service
                .seed_user(
                    config.admin_username.clone(),
                    config.admin_password.clone(),
                    RoleName::admin(),
                )
                .await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
