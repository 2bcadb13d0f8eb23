use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use vitrine::application::accessor::ContentAccessor;
use vitrine::application::lookup::DetailLookup;
use vitrine::cache::{CacheConfig, SnapshotStore};
use vitrine::config::{self, CliArgs, Command, Settings};
use vitrine::infra::{http::HttpContentSource, telemetry};

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();

    let settings = match config::load(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("configuration error: {err}");
            process::exit(2);
        }
    };

    if let Err(err) = telemetry::init(&settings.logging) {
        eprintln!("telemetry error: {err}");
        process::exit(2);
    }

    let command = cli.command.unwrap_or(Command::Warm);
    process::exit(run(command, &settings).await);
}

async fn run(command: Command, settings: &Settings) -> i32 {
    let source = match HttpContentSource::new(
        settings.remote.base_url.clone(),
        settings.remote.admin_token.clone(),
    ) {
        Ok(source) => Arc::new(source),
        Err(err) => {
            error!(error = %err, "remote source rejected configuration");
            return 2;
        }
    };

    let store = Arc::new(SnapshotStore::new());
    let cache_config = CacheConfig::from(&settings.cache);
    let accessor = ContentAccessor::new(cache_config.clone(), store.clone(), source.clone());

    match command {
        Command::Warm => {
            let view = accessor.content().await;
            if let Some(message) = view.error {
                error!(error = message, "content warm-up failed");
                return 1;
            }
            println!(
                "articles: {} products: {}",
                view.articles.len(),
                view.products.len()
            );
            0
        }
        Command::Article { id } => {
            let lookup = DetailLookup::new(cache_config, store, source);
            match lookup.article_from_route(&id).await {
                Ok(Some(article)) => print_json(&article),
                Ok(None) => {
                    eprintln!("article not found");
                    1
                }
                Err(err) => {
                    error!(error = %err, "article lookup failed");
                    1
                }
            }
        }
        Command::Product { id } => {
            let lookup = DetailLookup::new(cache_config, store, source);
            match lookup.product_from_route(&id).await {
                Ok(Some(product)) => print_json(&product),
                Ok(None) => {
                    eprintln!("product not found");
                    1
                }
                Err(err) => {
                    error!(error = %err, "product lookup failed");
                    1
                }
            }
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(err) => {
            error!(error = %err, "failed to encode record");
            1
        }
    }
}
