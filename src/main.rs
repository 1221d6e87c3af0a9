// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use axum_server::tls_rustls::RustlsConfig;
use chrono::Utc;
use clap::{Parser, Subcommand};

use cb_administration::{
    api::router,
    auth::{AuthorizationPolicy, TokenCodec},
    config::AppConfig,
    logging::init_tracing,
    models::NewUser,
    state::AppState,
    storage::{DatabaseStore, InMemoryStore, UserStore},
};

/// Grace period for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// CB Administration - user and audit log backend
#[derive(Parser)]
#[command(name = "cb-administration")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print a bearer token for an existing user
    IssueToken {
        #[arg(long)]
        username: String,
    },
    /// Register a user in the persistent store
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env().context("failed to load configuration")?;
    init_tracing(config.log_format);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::IssueToken { username } => issue_token(&config, &username),
        Command::AddUser {
            username,
            first_name,
            last_name,
            email,
        } => add_user(
            &config,
            NewUser {
                username,
                first_name,
                last_name,
                email,
            },
        ),
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let codec = TokenCodec::from_settings(&config.jwt).context("invalid JWT secret")?;
    let policy = AuthorizationPolicy::with_public_paths(config.public_paths.iter().cloned())
        .context("invalid public path pattern")?;
    for rule in policy.rules() {
        tracing::info!(pattern = %rule.path_pattern, requires_auth = rule.requires_auth, "Route rule loaded");
    }

    let state = match config.database_path() {
        Some(path) => {
            let store = open_store(path)?;
            AppState::new(Arc::new(store), codec, policy)
        }
        None => {
            tracing::warn!("DATA_DIR not set; users and logs are kept in memory only");
            AppState::new(Arc::new(InMemoryStore::new()), codec, policy)
        }
    };
    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining connections");
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            // Must happen before any rustls config is built.
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                tracing::debug!("rustls crypto provider already installed");
            }
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .with_context(|| {
                    format!(
                        "failed to load TLS material from {} and {}",
                        tls.cert_path.display(),
                        tls.key_path.display()
                    )
                })?;

            tracing::info!(%addr, "CB Administration listening on https (docs at /swagger-ui.html)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app)
                .await
                .context("HTTPS server failed")?;
        }
        None => {
            tracing::info!(%addr, "CB Administration listening on http (docs at /swagger-ui.html)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app)
                .await
                .context("HTTP server failed")?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn issue_token(config: &AppConfig, username: &str) -> anyhow::Result<()> {
    let store = persistent_store(config)?;
    if store.find_by_username(username)?.is_none() {
        bail!("no user named '{username}'");
    }

    let codec = TokenCodec::from_settings(&config.jwt).context("invalid JWT secret")?;
    let token = codec.encode(username, Utc::now())?;
    tracing::info!(username, expires_in_secs = codec.expiration().as_secs(), "Token issued");
    println!("{token}");
    Ok(())
}

fn add_user(config: &AppConfig, user: NewUser) -> anyhow::Result<()> {
    let store = persistent_store(config)?;
    let user = store.insert_user(user)?;
    tracing::info!(user_id = user.id, username = %user.username, "User added");
    println!("{}", user.id);
    Ok(())
}

fn persistent_store(config: &AppConfig) -> anyhow::Result<DatabaseStore> {
    match config.database_path() {
        Some(path) => open_store(path),
        None => bail!("DATA_DIR must be set for this command"),
    }
}

fn open_store(path: PathBuf) -> anyhow::Result<DatabaseStore> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;
    }
    let store = DatabaseStore::open(&path)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    tracing::info!(path = %path.display(), "Database opened");
    Ok(store)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
