use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use onboard_notify::{ActivityPersistence, EmailConfig, EventBus, LogMailer, Mailer, SmtpMailer};
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use onboard_api::auth::github::GitHubOAuth;
use onboard_api::background;
use onboard_api::captcha::{CaptchaVerifier, NoCaptcha, SiteVerify};
use onboard_api::config::ServerConfig;
use onboard_api::router::build_app_router;
use onboard_api::state::AppState;

/// Tasks that outlive individual requests and must be wound down after the
/// listener stops.
struct Background {
    cancel: CancellationToken,
    session_cleanup: JoinHandle<()>,
    activity: JoinHandle<()>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Configuration loaded");

    let pool = connect(&config.database_url).await;

    let event_bus = Arc::new(EventBus::default());
    let background = spawn_background(&pool, &event_bus);
    tracing::info!(
        subscribers = event_bus.subscriber_count(),
        "Activity bus ready"
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        identity: Arc::new(GitHubOAuth::new(config.github.clone())),
        mailer: mailer(),
        captcha: captcha(&config),
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Onboarding portal API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    drain(
        background,
        event_bus,
        Duration::from_secs(config.shutdown_timeout_secs),
    )
    .await;
    tracing::info!("Shutdown complete");
}

/// `LOG_FORMAT=json` switches to one JSON object per line; `RUST_LOG`
/// overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "onboard_api=debug,onboard_notify=info,tower_http=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect(database_url: &str) -> PgPool {
    let pool = onboard_db::create_pool(database_url)
        .await
        .expect("Failed to connect to database");
    onboard_db::health_check(&pool)
        .await
        .expect("Database is not answering queries");
    onboard_db::run_migrations(&pool)
        .await
        .expect("Failed to apply migrations");
    tracing::info!("Database ready");
    pool
}

fn spawn_background(pool: &PgPool, event_bus: &EventBus) -> Background {
    let cancel = CancellationToken::new();
    let session_cleanup = tokio::spawn(background::session_cleanup::run(
        pool.clone(),
        cancel.clone(),
    ));
    let activity = tokio::spawn(ActivityPersistence::run(pool.clone(), event_bus.subscribe()));
    Background {
        cancel,
        session_cleanup,
        activity,
    }
}

/// SMTP when `SMTP_HOST` is configured, otherwise codes go to the log.
fn mailer() -> Arc<dyn Mailer> {
    let Some(email) = EmailConfig::from_env() else {
        tracing::warn!("SMTP_HOST not set, verification codes will only be logged");
        return Arc::new(LogMailer);
    };
    tracing::info!(host = %email.smtp_host, "Sending mail over SMTP");
    Arc::new(SmtpMailer::new(email).expect("Invalid SMTP configuration"))
}

fn captcha(config: &ServerConfig) -> Arc<dyn CaptchaVerifier> {
    match &config.captcha {
        Some(captcha) => Arc::new(SiteVerify::new(captcha.clone())),
        None => {
            tracing::warn!("CAPTCHA_SECRET not set, public registration is unprotected");
            Arc::new(NoCaptcha)
        }
    }
}

/// Stop the cleanup loop, then let activity persistence flush what the bus
/// still holds. Dropping our sender closes the channel once no request
/// handler holds a clone.
async fn drain(background: Background, event_bus: Arc<EventBus>, grace: Duration) {
    background.cancel.cancel();
    if tokio::time::timeout(grace, background.session_cleanup)
        .await
        .is_err()
    {
        tracing::warn!("Session cleanup did not stop in time");
    }

    drop(event_bus);
    if tokio::time::timeout(grace, background.activity).await.is_err() {
        tracing::warn!("Activity persistence did not drain in time");
    }
}

async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl-C");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to listen for SIGTERM")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("Interrupted, shutting down"),
        () = terminate => tracing::info!("Terminated, shutting down"),
    }
}
