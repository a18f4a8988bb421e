use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_edu_core::{Catalog, CatalogDocument};
use services::{AppServices, Clock};

/// Chess lesson and progress server.
#[derive(Debug, Parser)]
#[command(name = "chess-edu", version, about)]
struct Args {
    /// Address to bind.
    #[arg(long, env = "CHESS_EDU_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "CHESS_EDU_PORT", default_value_t = 5001)]
    port: u16,

    /// JSON catalog file. The built-in chess fundamentals course is used when absent.
    #[arg(long, env = "CHESS_EDU_CATALOG")]
    catalog: Option<PathBuf>,

    /// Directory served under `/static`.
    #[arg(long, env = "CHESS_EDU_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

impl Args {
    /// Bind the listener. `host` may be an IP literal or a resolvable name.
    async fn bind(&self) -> Result<TcpListener> {
        TcpListener::bind((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("failed to bind {}:{}", self.host, self.port))
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::chess_fundamentals());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let doc: CatalogDocument = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse catalog {}", path.display()))?;
    Catalog::try_from(doc).with_context(|| format!("invalid catalog {}", path.display()))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let catalog = Arc::new(load_catalog(args.catalog.as_deref())?);
    info!(lessons = catalog.len(), "catalog loaded");

    let services = AppServices::in_memory(Clock::system(), catalog);
    let router = web::router(services, args.static_dir.clone());

    let listener = args.bind().await?;
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!("{err:#}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_classic_port() {
        let args = Args::try_parse_from(["chess-edu"]).unwrap();
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 5001);
        assert!(args.catalog.is_none());
    }

    #[tokio::test]
    async fn hostname_is_resolved_when_binding() {
        let args = Args::try_parse_from(["chess-edu", "--host", "localhost", "--port", "0"]).unwrap();
        let listener = args.bind().await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn unresolvable_host_is_reported() {
        let args = Args::try_parse_from(["chess-edu", "--host", "not a host", "--port", "0"]).unwrap();
        let err = args.bind().await.unwrap_err();
        assert!(err.to_string().starts_with("failed to bind not a host:0"));
    }

    #[test]
    fn catalog_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"lessons": [{{"id": 1, "title": "Endgames", "interactive_exercises": ["opposition"]}}]}}"#
        )
        .unwrap();

        let catalog = load_catalog(Some(file.path())).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lessons()[0].title(), "Endgames");
    }

    #[test]
    fn invalid_catalog_file_fails_startup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"lessons": [{{"id": 1, "title": ""}}]}}"#).unwrap();

        let err = load_catalog(Some(file.path())).unwrap_err();
        assert!(err.to_string().starts_with("invalid catalog"));
    }
}
