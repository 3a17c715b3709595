//! pageinfo-web - navigation metadata service
//!
//! Loads the handler manifest named in the config, builds the navigation
//! tree for the default locale and serves it over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pageinfo_common::cache::CacheOptions;
use pageinfo_common::config::{EngineConfig, SettingsGate};
use pageinfo_common::discovery::StaticSource;
use pageinfo_common::manifest::ManifestSource;
use pageinfo_common::redirect::RedirectRegistry;
use pageinfo_common::{MetadataSource, PageInfoCache};
use pageinfo_web::{build_router, AppState};
use tracing::{error, info, warn};

/// Navigation metadata service
#[derive(Debug, Parser)]
#[command(name = "pageinfo-web", version, about)]
struct Args {
    /// Config file (overrides PAGEINFO_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "PAGEINFO_BIND", default_value = "127.0.0.1:5730")]
    bind: String,

    /// Default locale (overrides the config file)
    #[arg(short, long)]
    locale: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting pageinfo-web v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = EngineConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(locale) = args.locale {
        config.default_locale = locale;
    }
    info!("Default locale: {}", config.default_locale);

    let source: Arc<dyn MetadataSource> = match &config.manifest_path {
        Some(path) => {
            info!("Handler manifest: {}", path.display());
            let gate = Arc::new(SettingsGate::new(config.settings.clone()));
            Arc::new(ManifestSource::from_path(path.clone(), gate))
        }
        None => {
            warn!("No manifest_path configured, serving an empty navigation tree");
            Arc::new(StaticSource::default())
        }
    };

    let options = CacheOptions {
        reject_duplicate_keys: config.reject_duplicate_keys,
        sitemap_base_url: config.sitemap.base_url.clone(),
    };
    let cache = PageInfoCache::new(source, options);

    // Build the default locale up front so manifest errors surface at startup
    match cache.get_or_build(&config.default_locale) {
        Ok(entry) => info!("✓ Navigation ready: {} pages", entry.tree().len()),
        Err(e) => {
            error!("Failed to build navigation: {}", e);
            return Err(e.into());
        }
    }

    let redirects = RedirectRegistry::new();
    redirects
        .add_range(config.redirects.iter().map(|(from, to)| (from.as_str(), to.as_str())))
        .context("Invalid redirect in config")?;
    if !redirects.is_empty() {
        info!("Registered {} redirects from config", redirects.len());
    }

    let bind = args.bind;
    let state = AppState::new(cache, redirects, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;
    info!("pageinfo-web listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
