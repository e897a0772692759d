//! Follow cart changes made by other invocations.

use std::time::Duration;

use chloes_boutique_storefront::bus::{CartUpdated, ChangeOrigin};
use chloes_boutique_storefront::error::Result;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use super::Session;

#[allow(clippy::print_stdout)]
fn print_event(event: &CartUpdated) -> Result<()> {
    let line = serde_json::json!({
        "type": event.name(),
        "detail": event,
    });
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

/// Poll the origin every `interval` and print one JSON line per
/// `cart-updated` event until Ctrl+C.
///
/// # Errors
///
/// Returns an error if an event cannot be encoded.
pub async fn run(session: &Session, interval: Duration) -> Result<()> {
    // Settle the poll baseline so ticks only report writes made from now on
    let _ = session.store.snapshot();
    session.storage.poll_external();
    session.store.sync_external();

    let mut rx = session.store.bus().subscribe();
    print_event(&CartUpdated {
        cart: session.store.snapshot(),
        origin: ChangeOrigin::Local,
    })?;

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!(?interval, "watching for cart changes");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if session.storage.poll_external() > 0 {
                    session.store.sync_external();
                }
                loop {
                    match rx.try_recv() {
                        Ok(event) => print_event(&event)?,
                        Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "watch fell behind");
                        }
                        Err(_) => break,
                    }
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "failed to listen for Ctrl+C");
                }
                break;
            }
        }
    }

    tracing::info!("stopped watching");
    Ok(())
}
