//! `shoutout-server`: HTTP surface, mail dispatcher and transcoding workers in
//! one process.

use std::sync::Arc;

use anyhow::Context;
use shoutout_core::environment::SystemClock;
use shoutout_core::ports::{AlertChannel, ErrorTracker, MailSender};
use shoutout_post_office::{ConsoleMailSender, LogAlertChannel, MailgunCarrier, TelegramAlertChannel, spawn_mail_dispatcher};
use shoutout_postgres::PostgresStore;
use shoutout_runtime::{ShoutoutEnvironment, TracingErrorTracker, fulfill_shoutout_request_bus};
use shoutout_transcoder::{FfmpegEncoder, LocalVideoStorage, TranscodeWorker, spawn_workers, transcode_channel};
use shoutout_web::{AppState, Config, build_router};
use shoutout_wirecard::WirecardClient;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shoutout=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }

    let config = Config::from_env();
    info!(
        address = %config.server.address(),
        wirecard = %config.wirecard.base_url,
        mailgun = config.mailgun.is_some(),
        telegram = config.telegram.is_some(),
        "configuration loaded"
    );

    let store = PostgresStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("connecting to the database")?;
    store.migrate().await.context("running migrations")?;
    info!("database ready");

    let error_tracker: Arc<dyn ErrorTracker> = Arc::new(TracingErrorTracker);
    let payment_gateway = WirecardClient::new(config.wirecard.clone()).context("building the payment gateway client")?;

    let alerts: Arc<dyn AlertChannel> = match config.telegram.clone() {
        Some(telegram) => Arc::new(TelegramAlertChannel::new(telegram)),
        None => Arc::new(LogAlertChannel),
    };

    let carrier: Arc<dyn MailSender> = match config.mailgun.clone() {
        Some(mailgun) => Arc::new(MailgunCarrier::new(mailgun)),
        None => Arc::new(ConsoleMailSender),
    };
    let (mail_sender, _mail_dispatcher) =
        spawn_mail_dispatcher(carrier, Arc::clone(&error_tracker), config.mail_queue_capacity);

    let (transcode_queue, transcode_jobs) = transcode_channel(config.transcoder.queue_capacity);

    let store_arc = Arc::new(store.clone());
    let env = ShoutoutEnvironment {
        orders: store_arc.clone(),
        talents: store_arc.clone(),
        percentages: store_arc.clone(),
        units_of_work: store_arc.clone(),
        payment_records: store_arc.clone(),
        payment_gateway: Arc::new(payment_gateway),
        mail_sender: Arc::new(mail_sender),
        alerts,
        error_tracker: Arc::clone(&error_tracker),
        transcoder: Arc::new(transcode_queue),
        clock: Arc::new(SystemClock),
        site: config.site.clone(),
    };

    let bus_env = env.clone();
    let worker = TranscodeWorker::new(
        store_arc.clone(),
        Arc::new(LocalVideoStorage::new(config.transcoder.media_root.clone())),
        Arc::new(FfmpegEncoder::new(
            config.transcoder.ffmpeg_path.clone(),
            config.transcoder.watermark_path.clone(),
        )),
        Arc::clone(&error_tracker),
        Arc::new(move || fulfill_shoutout_request_bus(&bus_env)),
        config.transcoder.clone(),
    );
    let workers = spawn_workers(transcode_jobs, Arc::new(worker), config.transcoder.workers);
    info!(workers = workers.len(), "transcoding workers started");

    let state = AppState::new(env, config.wirecard.webhook_token.as_str(), store_arc);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.address())
        .await
        .with_context(|| format!("binding {}", config.server.address()))?;
    info!(address = %config.server.address(), "listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    // Queued mail and transcode jobs still pending are dropped with the runtime.
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(%error, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
