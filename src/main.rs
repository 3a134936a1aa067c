//! StatusDeck - status pages, uptime history, and embeddable badges.
//!
//! The health-check prober runs elsewhere and writes daily aggregates and
//! live status into the database; this binary serves the presentation
//! layer on top of them.

mod config;
mod core;
mod db;
mod web;

use config::ServerConfig;
use db::Store;
use web::Server;

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("statusdeck=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting StatusDeck on port {}...", cfg.http_port);
    tracing::info!("Using database at {}", cfg.db_path);

    // Initialize database
    let store = Arc::new(Store::new(&cfg.db_path)?);
    tracing::info!("Database initialized successfully");

    // Seed a demo status page if the database is empty
    if store.get_monitor_by_slug("demo").is_err() {
        seed_demo_data(&store)?;
    }

    // Start web server
    let server = Server::new(cfg, store);
    server.start().await?;

    Ok(())
}

fn seed_demo_data(store: &Store) -> Result<(), db::DbError> {
    tracing::info!("Adding demo account and monitor");

    let account_id = store.add_account("demo", "business")?;
    let mut monitor = db::Monitor {
        account_id,
        app_name: "Demo API".to_string(),
        slug: "demo".to_string(),
        health_url: "https://demo.example.com/health".to_string(),
        ..Default::default()
    };
    store.add_monitor(&mut monitor)?;

    let today = Utc::now().date_naive();
    for (days_ago, total, ok) in [(2, 288, 288), (1, 288, 275), (0, 120, 120)] {
        store.upsert_daily_uptime(&db::DailyUptimeRow {
            monitor_id: monitor.id,
            date: today - Duration::days(days_ago),
            total_checks: total,
            successful_checks: ok,
        })?;
    }

    store.upsert_live_status(&db::LiveStatus {
        monitor_id: monitor.id,
        status_code: 200,
        checked_at: Utc::now(),
        ssl_days_remaining: Some(72),
    })?;

    Ok(())
}
