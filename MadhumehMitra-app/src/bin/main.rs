use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use dotenv::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use madhumeh_mitra_data::database::{open_database_pool, open_in_memory_pool, DatabaseConfig};
use madhumeh_mitra_data::repository::{DatabaseStorage, KeyValueStore};
use madhumeh_mitra_domain::auth::select_session;
use madhumeh_mitra_domain::config::AppConfig;
use madhumeh_mitra_domain::reminders::{ReminderScheduler, TracingNotifier};
use madhumeh_mitra_domain::services::daily_log::summarize;
use madhumeh_mitra_domain::services::{
    build_week, chart_points, refresh_insight, AiAssistant, DailyLogService, ProfileService,
};

/// Entry point for Madhumeh Mitra
///
/// 1. Loads `.env` and initialises tracing
/// 2. Opens the SQLite store, falling back to memory
/// 3. Picks the guest or signed-in identity
/// 4. Logs today's summary and the weekly history
/// 5. Runs hydration and activity reminders until Ctrl-C
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting Madhumeh Mitra");

    let config = AppConfig::from_env().context("invalid configuration")?;
    let db_config = DatabaseConfig::from_env().context("invalid database configuration")?;

    let pool = match open_database_pool(&db_config) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            warn!("Continuing with an in-memory database; nothing will be kept after exit");
            open_in_memory_pool().context("failed to open in-memory database")?
        }
    };
    info!("{}", pool.connection_info());

    let local: Arc<dyn KeyValueStore> = Arc::new(DatabaseStorage::new(pool));
    let session = select_session(&config.auth, Arc::clone(&local)).await;
    let identity = session.identity();

    let profiles = ProfileService::new(Arc::clone(&session.store), identity.clone());
    let metadata = profiles.load().await;
    if !metadata.onboarding_completed {
        info!("Onboarding not completed, using default targets");
    }

    let logs = DailyLogService::new(Arc::clone(&session.store), Arc::clone(&local), identity.clone());
    let today = Local::now().date_naive();
    let mut log = logs.load(today).await;

    let assistant = AiAssistant::from_config(&config.ai);
    if log.has_data() {
        let (updated, outcome) = refresh_insight(&assistant, &logs, log).await;
        log = updated;
        if let Some(outcome) = outcome {
            info!("Insight saved: {:?}", outcome);
        }
    }

    let summary = summarize(&log, &metadata);
    info!(
        "Today ({}): {}/{} kcal ({:.0}%), {} kcal burned, net {}, {} g carbs, water {}/{} glasses",
        summary.date,
        summary.calories_in,
        summary.calorie_target,
        summary.calorie_progress,
        summary.calories_burned,
        summary.net_calories,
        summary.carbs,
        summary.water_glasses,
        summary.water_target,
    );
    if let Some(insight) = &log.ai_insight {
        info!("Insight: {}", insight);
    }

    let week = build_week(session.store.as_ref(), &identity, today).await;
    for point in chart_points(&week) {
        info!(
            "{}: {} kcal in, {} kcal burned, water {}",
            point.label, point.calories_in, point.calories_burned, point.water_scaled
        );
    }

    let reminders = ReminderScheduler::new(local, Arc::new(TracingNotifier))
        .with_intervals(config.reminders.water_interval, config.reminders.activity_interval);
    reminders
        .run_until(config.reminders.poll_interval, shutdown_signal())
        .await;

    info!("Shutdown complete");
    Ok(())
}

/// Completes on Ctrl-C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutting down...");
}
