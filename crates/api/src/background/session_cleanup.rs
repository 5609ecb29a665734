//! Hourly purge of refresh sessions past their expiry.

use std::time::Duration;

use onboard_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const SWEEP_EVERY: Duration = Duration::from_secs(60 * 60);

pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(SWEEP_EVERY);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(every_secs = SWEEP_EVERY.as_secs(), "Session sweeper running");

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => sweep(&pool).await,
        }
    }
    tracing::info!("Session sweeper stopped");
}

async fn sweep(pool: &PgPool) {
    match SessionRepo::cleanup_expired(pool).await {
        Ok(0) => {}
        Ok(purged) => tracing::info!(purged, "Expired sessions purged"),
        Err(e) => tracing::error!(error = %e, "Session sweep failed"),
    }
}
