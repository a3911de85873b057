use std::net::SocketAddr;
use std::sync::Arc;

use auth::Authenticator;
use chrono::Duration;
use identity_service::config::Config;
use identity_service::domain::access::policy::AccessPolicy;
use identity_service::domain::account::ports::AccountRepository;
use identity_service::domain::account::service::AccountService;
use identity_service::domain::account::service::AccountServiceSettings;
use identity_service::inbound::http::rate_limit::RateLimit;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::mail::LogMailer;
use identity_service::outbound::repositories::InMemoryAccountRepository;
use identity_service::outbound::repositories::PostgresAccountRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        database = config.database.url.is_some(),
        session_ttl_hours = config.jwt.expiration_hours,
        reset_ttl_minutes = config.reset.expiration_minutes,
        "Configuration loaded"
    );

    match config.database.url.clone() {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            serve(Arc::new(PostgresAccountRepository::new(pg_pool)), &config).await
        }
        None => {
            tracing::warn!("No database configured, accounts are kept in memory");
            serve(Arc::new(InMemoryAccountRepository::new()), &config).await
        }
    }
}

async fn serve<AR: AccountRepository>(
    repository: Arc<AR>,
    config: &Config,
) -> Result<(), anyhow::Error> {
    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        config.password.standard_cost(),
        config.password.reset_cost(),
    )?);
    let policy = Arc::new(AccessPolicy::new()?);
    let mailer = Arc::new(LogMailer::new());

    let account_service = Arc::new(AccountService::new(
        repository,
        mailer,
        authenticator,
        policy,
        AccountServiceSettings {
            session_ttl: Duration::hours(config.jwt.expiration_hours),
            reset_ttl: Duration::minutes(config.reset.expiration_minutes),
            reset_link_base_url: config.reset.link_base_url.clone(),
        },
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let reset_limit = RateLimit {
        max_requests: config.reset.redeem_limit,
        window: std::time::Duration::from_secs(config.reset.redeem_window_seconds),
    };
    let router = create_router(account_service, reset_limit);

    axum::serve(
        http_listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    tracing::info!("Server exited");

    Ok(())
}
