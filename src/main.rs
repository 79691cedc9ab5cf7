//! Standalone CLI for testing the candle feed pipeline
//!
//! Run with: cargo run --bin vigil-cli --features cli

#[cfg(not(target_arch = "wasm32"))]
mod core;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use core::{parse_change, CandleChange, IntentionNetwork, MapView, Projector};
    use futures_util::{SinkExt, StreamExt};
    use std::collections::HashSet;
    use std::time::Instant;
    use tokio_tungstenite::{connect_async, tungstenite::Message};
    use tracing::{debug, error, info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vigil=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let url =
        std::env::var("VIGIL_WS").unwrap_or_else(|_| "ws://127.0.0.1:8080/api/feed".to_string());

    info!(url = %url, "Connecting to candle feed");
    let (ws_stream, _) = connect_async(&url).await?;
    let (mut write, mut read) = ws_stream.split();

    info!("WebSocket connected, subscribing...");
    write
        .send(Message::Text(
            r#"{"type":"subscribe","collection":"candles","filter":{"visibility":["public","anonymous"],"located":true}}"#.into(),
        ))
        .await?;

    let start_time = Instant::now();
    // Fixed headless viewport; positions only matter for the draw list.
    let view = MapView::world(1280.0, 800.0);
    let mut network = IntentionNetwork::new();
    let mut connected: HashSet<String> = HashSet::new();
    let mut change_count = 0u64;
    let mut changes_last_interval = 0u64;
    let mut last_tick = 0.0f64;
    let mut stats_interval = tokio::time::interval(std::time::Duration::from_secs(5));

    info!("Subscribed, waiting for changes...");

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let now = start_time.elapsed().as_secs_f64();
                        network.tick((now - last_tick) as f32, now);
                        last_tick = now;

                        let Some(change) = parse_change(&text) else {
                            continue;
                        };
                        change_count += 1;
                        changes_last_interval += 1;

                        match change {
                            CandleChange::Added { id, candle }
                            | CandleChange::Modified { id, candle } => {
                                if connected.contains(&id) {
                                    continue;
                                }
                                let Some(geo) = candle.location.filter(|_| candle.is_mappable())
                                else {
                                    continue;
                                };
                                let Some(screen) = view.project(geo) else {
                                    continue;
                                };
                                network.connect_candle(
                                    &id,
                                    Some(candle.category_or_default()),
                                    geo,
                                    screen,
                                    None,
                                );
                                connected.insert(id);
                            }
                            CandleChange::Removed { id } => {
                                debug!(id, "Candle removed");
                                #[cfg(feature = "removal")]
                                if network.remove_candle(&id) {
                                    connected.remove(&id);
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        warn!("WebSocket closed");
                        break;
                    }
                    Some(Err(e)) => error!(error = %e, "WebSocket error"),
                    _ => {}
                }
            }
            _ = stats_interval.tick() => {
                info!(
                    candles = network.candle_count(),
                    categories = network.category_count(),
                    threads = network.thread_count(),
                    changes = change_count,
                    "/sec" = format!("{:.1}", changes_last_interval as f64 / 5.0),
                    "stats"
                );
                changes_last_interval = 0;
            }
        }
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
