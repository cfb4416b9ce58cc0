//! gitrest - serve the git repositories below a directory as a read-only
//! HTTP/JSON API
//!
//! # Usage
//! ```bash
//! gitrest /srv/git                              # Serve on 127.0.0.1:3001
//! gitrest /srv/git --port 8080 --enable-cors    # Custom port, CORS headers
//! GITREST_PUBLIC_URL=https://git.example.com gitrest /srv/git
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gitrest::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing (quiet unless RUST_LOG says otherwise)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if !config.repo_base_path.is_dir() {
        eprintln!("✗ Repository base path is not a directory");
        eprintln!("  Path: {}", config.repo_base_path.display());
        std::process::exit(1);
    }

    let addr = config.bind_addr();
    let base_path = config.repo_base_path.display().to_string();
    let app = gitrest::app(config)?;

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to {}: {}", addr, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, base = %base_path, "serving repositories");
    println!();
    println!("  Repositories: {}", base_path);
    println!("  Server:       http://{}/repos/", addr);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
