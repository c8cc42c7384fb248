use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use podium::adapters::auth::{HttpTokenRefresher, JwtConfig, JwtSessionValidator, RefreshConfig};
use podium::adapters::http::{app_router, with_http_layers, AppState, SessionSettings};
use podium::adapters::postgres::{
    PostgresApplicationRepository, PostgresMemberRepository, PostgresMessageRepository,
    PostgresOpportunityRepository, PostgresOrganizationRepository, PostgresPaymentLedger,
    PostgresSubscriptionRepository,
};
use podium::adapters::replay::RedisReplayGuard;
use podium::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use podium::config::AppConfig;
use podium::domain::billing::StripeWebhookVerifier;
use podium::ports::SessionValidator;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    tracing::info!("Connected to database");

    if config.database.run_migrations {
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let redis = redis::Client::open(config.redis.url.as_str())?;
    let redis_conn =
        tokio::time::timeout(config.redis.timeout(), redis.get_multiplexed_tokio_connection())
            .await??;
    tracing::info!("Connected to redis");

    let http_client = reqwest::Client::builder()
        .timeout(config.server.request_timeout())
        .build()?;

    let mut jwt = JwtConfig::new(config.auth.jwt_secret.clone()).with_leeway(config.auth.leeway_secs);
    if let Some(audience) = &config.auth.audience {
        jwt = jwt.with_audience(audience.clone());
    }
    let session_validator: Arc<dyn SessionValidator> = Arc::new(JwtSessionValidator::new(jwt));
    let token_refresher = Arc::new(HttpTokenRefresher::new(
        RefreshConfig::new(config.auth.auth_url.clone(), config.auth.anon_key.clone()),
        http_client.clone(),
        session_validator.clone(),
    ));

    let mut stripe = StripeConfig::new(config.payment.stripe_api_key.clone());
    if let Some(base_url) = &config.payment.stripe_api_base_url {
        stripe = stripe.with_base_url(base_url.clone());
    }
    if !config.payment.is_live_mode() {
        tracing::warn!("Stripe is running with a test key");
    }

    let state = AppState {
        members: Arc::new(PostgresMemberRepository::new(pool.clone())),
        organizations: Arc::new(PostgresOrganizationRepository::new(pool.clone())),
        opportunities: Arc::new(PostgresOpportunityRepository::new(pool.clone())),
        applications: Arc::new(PostgresApplicationRepository::new(pool.clone())),
        messages: Arc::new(PostgresMessageRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        ledger: Arc::new(PostgresPaymentLedger::new(pool)),
        payments: Arc::new(StripePaymentAdapter::new(stripe, http_client)),
        replay_guard: Arc::new(RedisReplayGuard::new(redis_conn)),
        session_validator,
        token_refresher,
        webhook_verifier: StripeWebhookVerifier::new(config.payment.stripe_webhook_secret.clone()),
        prices: config.payment.price_table(),
        app_base_url: config.server.app_base_url().to_string(),
        session: SessionSettings::from_config(&config),
    };

    let app = with_http_layers(app_router(state), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Podium listening");

    axum::serve(listener, app).await?;
    Ok(())
}
