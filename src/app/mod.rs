//! The vigil map application
//!
//! Drains the candle feed, keeps the marker layer and the thread network in
//! sync, and ticks the animation once per frame.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use eframe::egui;
use tracing::debug;

use crate::core::{
    parse_change, Candle, CandleChange, GeoPoint, HighlightFlag, IntentionNetwork, MapView,
    Projector,
};
use crate::theme::candlelight_visuals;
use crate::time::now_seconds;
use crate::websocket_wasm::{FeedClient, MessageBuffer};
use crate::ws_state::SyncState;

mod header;
mod map;

/// Default feed endpoint (override with `window.__vigil_ws_url`)
pub const DEFAULT_FEED_URL: &str = "ws://127.0.0.1:8080/api/feed";

/// A candle currently on the map.
pub(crate) struct CandleMarker {
    pub candle: Candle,
    pub geo: GeoPoint,
    /// Shared with the network; the activation raises it, the marker layer
    /// draws the halo.
    pub highlight: HighlightFlag,
}

pub struct VigilApp {
    pub(crate) view: MapView,
    pub(crate) network: IntentionNetwork,
    pub(crate) markers: HashMap<String, CandleMarker>,
    /// Ids already connected to the network. The store has no upsert
    /// semantics, so each candle is connected exactly once here.
    connected: HashSet<String>,
    /// Mappable candles waiting for their first successful projection
    /// (the map may not be laid out yet on the frame a change arrives).
    pending: VecDeque<String>,
    sync_state: Rc<RefCell<SyncState>>,
    /// Feed client (kept alive)
    #[allow(dead_code)]
    feed: Option<FeedClient>,
    msg_buffer: MessageBuffer,
    pub(crate) fps_counter: header::FpsCounter,
    /// Marker with a click-pinned popup
    pub(crate) selected: Option<String>,
    last_frame: f64,
}

impl VigilApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(candlelight_visuals());

        let sync_state = Rc::new(RefCell::new(SyncState::Connecting));
        let msg_buffer: MessageBuffer = Rc::new(RefCell::new(VecDeque::new()));

        let feed_url = js_sys::eval("window.__vigil_ws_url")
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let feed = FeedClient::connect(&feed_url, msg_buffer.clone(), sync_state.clone()).ok();

        Self {
            // Sized on the first frame; until then every projection is None
            // and connections queue up in `pending`.
            view: MapView::world(0.0, 0.0),
            network: IntentionNetwork::new(),
            markers: HashMap::new(),
            connected: HashSet::new(),
            pending: VecDeque::new(),
            sync_state,
            feed,
            msg_buffer,
            fps_counter: header::FpsCounter::new(),
            selected: None,
            last_frame: now_seconds(),
        }
    }

    pub(crate) fn sync_state(&self) -> SyncState {
        self.sync_state.borrow().clone()
    }

    /// Apply one feed change to the marker layer and, for first sightings,
    /// queue the candle for the network.
    fn apply_change(&mut self, change: CandleChange) {
        match change {
            CandleChange::Added { id, candle } | CandleChange::Modified { id, candle } => {
                let Some(geo) = candle.location.filter(|_| candle.is_mappable()) else {
                    // Became private or lost its location: off the map it goes.
                    self.markers.remove(&id);
                    return;
                };

                match self.markers.entry(id.clone()) {
                    std::collections::hash_map::Entry::Occupied(mut e) => {
                        // Keep the existing highlight flag: the network holds
                        // a clone of it.
                        let marker = e.get_mut();
                        marker.candle = candle;
                        marker.geo = geo;
                    }
                    std::collections::hash_map::Entry::Vacant(e) => {
                        e.insert(CandleMarker {
                            candle,
                            geo,
                            highlight: HighlightFlag::new(),
                        });
                    }
                }

                if !self.connected.contains(&id) && !self.pending.contains(&id) {
                    self.pending.push_back(id);
                }
            }
            CandleChange::Removed { id } => {
                debug!(id, "Candle removed from map");
                self.markers.remove(&id);
                if self.selected.as_deref() == Some(id.as_str()) {
                    self.selected = None;
                }
                #[cfg(feature = "removal")]
                {
                    self.network.remove_candle(&id);
                    self.connected.remove(&id);
                }
            }
        }
    }

    /// Connect queued candles whose position can now be projected.
    fn connect_pending(&mut self) {
        let mut still_pending = VecDeque::new();
        while let Some(id) = self.pending.pop_front() {
            let Some(marker) = self.markers.get(&id) else {
                continue; // removed before it ever connected
            };
            if self.connected.contains(&id) {
                continue;
            }
            match self.view.project(marker.geo) {
                Some(screen) => {
                    self.network.connect_candle(
                        &id,
                        Some(marker.candle.category_or_default()),
                        marker.geo,
                        screen,
                        Some(marker.highlight.clone()),
                    );
                    self.connected.insert(id);
                }
                None => still_pending.push_back(id),
            }
        }
        self.pending = still_pending;
    }
}

impl eframe::App for VigilApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // The shimmer never sleeps
        ctx.request_repaint();

        let now = now_seconds();
        let dt = ((now - self.last_frame) as f32).clamp(0.0, 0.1);
        self.last_frame = now;

        // Drain buffered feed messages
        let messages: Vec<String> = self.msg_buffer.borrow_mut().drain(..).collect();
        for msg in messages {
            // parse_change logs malformed payloads itself; connection
            // chatter comes back as None and is simply skipped.
            if let Some(change) = parse_change(&msg) {
                self.apply_change(change);
            }
        }

        self.connect_pending();
        self.network.tick(dt, now);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.render_header(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(crate::theme::colors::BG_PRIMARY))
            .show(ctx, |ui| {
                self.render_map(ui);
            });
    }
}
