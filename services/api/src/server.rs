use crate::cli::ServeArgs;
use crate::infra::{require_admin, AppState};
use crate::routes::with_ops_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use landivo::buyers::{buyer_router, BuyerService};
use landivo::config::AppConfig;
use landivo::error::AppError;
use landivo::lists::{list_router, ListService};
use landivo::notifications::{
    run_outbox_worker, ConsoleEmailSender, EmailSender, SmtpEmailSender, SmtpSettings,
};
use landivo::offers::{offer_router, OfferService};
use landivo::properties::{property_admin_router, property_router};
use landivo::qualification::{qualification_router, QualificationService};
use landivo::store::{
    self, SqliteBuyerRepository, SqliteListRepository, SqliteOfferRepository,
    SqliteOutboxRepository, SqlitePropertyRepository, SqliteSessionRepository,
};
use landivo::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        admin_token: config.admin_token.clone().map(Arc::new),
    };

    let pool = store::init_pool(&config.database.url).await?;
    store::run_migrations(&pool).await?;

    let buyers = Arc::new(SqliteBuyerRepository::new(pool.clone()));
    let offers = Arc::new(SqliteOfferRepository::new(pool.clone()));
    let properties = Arc::new(SqlitePropertyRepository::new(pool.clone()));
    let lists = Arc::new(SqliteListRepository::new(pool.clone()));
    let sessions = Arc::new(SqliteSessionRepository::new(pool.clone()));
    let outbox = Arc::new(SqliteOutboxRepository::new(pool.clone()));

    let sender: Arc<dyn EmailSender> = match SmtpSettings::from_env() {
        Some(settings) => match SmtpEmailSender::new(settings) {
            Ok(sender) => Arc::new(sender),
            Err(err) => {
                tracing::warn!(%err, "smtp unavailable, falling back to console sender");
                Arc::new(ConsoleEmailSender::new())
            }
        },
        None => Arc::new(ConsoleEmailSender::new()),
    };
    tokio::spawn(run_outbox_worker(
        outbox.clone(),
        sender,
        config.outbox.clone(),
    ));

    let buyer_service = Arc::new(BuyerService::new(buyers.clone()));
    let offer_service = Arc::new(OfferService::new(offers, buyers.clone()));
    let list_service = Arc::new(ListService::new(lists, buyers, outbox));
    let qualification_service = Arc::new(QualificationService::new(sessions, properties.clone()));

    let admin_routes = axum::Router::new()
        .merge(property_admin_router(properties.clone()))
        .merge(list_router(list_service))
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            require_admin,
        ));

    let app = axum::Router::new()
        .merge(buyer_router(buyer_service))
        .merge(offer_router(offer_service))
        .merge(property_router(properties))
        .merge(qualification_router(qualification_service))
        .merge(admin_routes);

    let app = with_ops_routes(app)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "marketplace api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
