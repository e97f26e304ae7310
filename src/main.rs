use std::sync::Arc;

use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use user_events::adapters::{
    EventConsumer, EventProducer, InMemoryChannel, JsonCodec, RedisStreamChannel,
    RedisStreamSettings,
};
use user_events::application::{SendUserEventHandler, UserActivityLogger};
use user_events::config::{AppConfig, LogFormat, RuntimeConfig, TransportKind};
use user_events::domain::user_event::{UserEvent, UserEventDraft};
use user_events::ports::{MessageChannel, TransportError};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    init_tracing(&config.runtime);

    tracing::info!(
        environment = ?config.runtime.environment,
        transport = ?config.transport.kind,
        partitions = config.transport.partitions,
        immutable_events = %config.channels.immutable_events,
        mutable_events = %config.channels.mutable_events,
        comparison_events = %config.channels.comparison_events,
        "starting user-events"
    );

    let channel = build_channel(&config).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to set up message channel");
        std::process::exit(1);
    });
    if let Err(e) = channel.health_check().await {
        tracing::error!(provider = channel.name(), error = %e, "Message channel is not healthy");
        std::process::exit(1);
    }

    let codec = Arc::new(JsonCodec::new());
    let immutable_activity = Arc::new(UserActivityLogger::new());
    let mutable_activity = Arc::new(UserActivityLogger::new());

    // Consumers
    let immutable_consumer = Arc::new(EventConsumer::<UserEvent>::new(
        codec.clone(),
        immutable_activity.clone(),
    ));
    let mutable_consumer = Arc::new(EventConsumer::<UserEventDraft>::new(
        codec.clone(),
        mutable_activity.clone(),
    ));

    let mut subscriptions = Vec::new();
    let subscribed = async {
        subscriptions.push(
            immutable_consumer
                .subscribe(
                    channel.as_ref(),
                    &config.channels.immutable_events,
                    &config.channels.immutable_group,
                )
                .await?,
        );
        subscriptions.push(
            mutable_consumer
                .subscribe(
                    channel.as_ref(),
                    &config.channels.mutable_events,
                    &config.channels.mutable_group,
                )
                .await?,
        );
        Ok::<(), TransportError>(())
    }
    .await;
    if let Err(e) = subscribed {
        tracing::error!(error = %e, "Failed to subscribe consumers");
        std::process::exit(1);
    }

    // Producers
    let immutable_producer = Arc::new(EventProducer::<UserEvent>::new(
        Arc::clone(&channel),
        codec.clone(),
        &config.channels.immutable_events,
    ));
    let mutable_producer = Arc::new(EventProducer::<UserEventDraft>::new(
        Arc::clone(&channel),
        codec,
        &config.channels.mutable_events,
    ));
    let sender = SendUserEventHandler::new(immutable_producer, mutable_producer);

    match sender.send_samples() {
        Ok(deliveries) => {
            let failed = join_all(deliveries)
                .await
                .into_iter()
                .filter(Result::is_err)
                .count();
            tracing::info!(failed, "Sample events sent");
        }
        Err(e) => tracing::error!(error = %e, "Failed to build sample events"),
    }

    tracing::info!("Consuming events, press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }

    for subscription in subscriptions {
        subscription.shutdown().await;
    }

    tracing::info!(
        immutable = ?immutable_activity.counts(),
        mutable = ?mutable_activity.counts(),
        "user-events stopped"
    );
}

fn init_tracing(runtime: &RuntimeConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&runtime.log_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match runtime.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.init(),
    }
}

async fn build_channel(config: &AppConfig) -> Result<Arc<dyn MessageChannel>, TransportError> {
    match config.transport.kind {
        TransportKind::InMemory => Ok(Arc::new(InMemoryChannel::new(config.transport.partitions))),
        TransportKind::Redis => {
            tracing::info!(url = %config.redis.redacted_url(), "Connecting to Redis");
            let settings = RedisStreamSettings::default()
                .with_partitions(config.transport.partitions)
                .with_block(config.redis.block())
                .with_read_count(config.redis.read_count)
                .with_max_len(config.redis.max_len);
            let channel = RedisStreamChannel::connect(&config.redis.url, settings).await?;
            Ok(Arc::new(channel))
        }
    }
}
