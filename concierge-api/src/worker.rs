use concierge_core::outbox::OutboxRelay;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

/// Drains the sync outbox forever, one batch per tick.
///
/// A failed batch is logged and retried on the next tick; messages stay
/// pending until the publisher accepts them.
pub async fn start_outbox_relay(relay: OutboxRelay, interval_ms: u64) {
    let mut ticker = interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Outbox relay started, polling every {}ms", interval_ms);

    loop {
        ticker.tick().await;
        match relay.run_once().await {
            Ok(0) => {}
            Ok(sent) => debug!("Relayed {} sync event(s)", sent),
            Err(e) => error!("Outbox relay failed: {}", e),
        }
    }
}
