//! Category thread network
//!
//! Every candle joins the bucket of its category; each bucket keeps a
//! complete graph of threads over its candles, maintained incrementally: a
//! newly connected candle gets one thread to every candle already in the
//! bucket, and no other thread creation path exists.
//!
//! Clicking a candle activates its whole category for a fixed duration:
//! all its threads snap to full opacity, the clicked candle's highlight
//! flag is raised, and the activation expires on its own. At most one
//! category is active at any time.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use super::candle::{GeoPoint, DEFAULT_CATEGORY};
use super::project::{Projector, ScreenPos};
use super::thread::{thread_visual, Thread};

/// How long a category stays active after a click.
pub const ACTIVATION_SECS: f64 = 5.0;

/// Opaque highlight capability shared with a candle's marker.
///
/// The network only toggles it; whoever draws the marker reads it. Keeps the
/// graph model free of any rendering type.
#[derive(Debug, Clone, Default)]
pub struct HighlightFlag(Arc<AtomicBool>);

impl HighlightFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, on: bool) {
        self.0.store(on, Ordering::Relaxed);
    }

    pub fn is_on(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A candle participating in the network.
#[derive(Debug, Clone)]
struct CandleNode {
    id: String,
    /// Immutable geographic position; screen position is re-derived from it
    /// on every viewport change.
    geo: GeoPoint,
    screen: ScreenPos,
    highlight: Option<HighlightFlag>,
}

/// Node list + thread list for one category.
#[derive(Debug, Default)]
struct CategoryBucket {
    nodes: Vec<CandleNode>,
    threads: Vec<Thread>,
}

/// The single active category, if any.
#[derive(Debug)]
struct Activation {
    category: String,
    node_id: String,
    deadline: f64,
}

/// One thread's draw instructions for this frame. Endpoints are read fresh
/// from the nodes, never cached on the thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadDraw {
    pub from: ScreenPos,
    pub to: ScreenPos,
    pub opacity: f32,
    pub glow_dot: Option<ScreenPos>,
}

type PhaseSource = Box<dyn FnMut() -> f32 + Send>;

/// Phase in [0, 2π) from OS entropy. On the (unlikely) entropy failure the
/// buffer stays zeroed and the phase degrades to 0 — a constant phase is a
/// visual blemish, not an error.
fn entropy_phase() -> f32 {
    let mut buf = [0u8; 4];
    let _ = getrandom::getrandom(&mut buf);
    u32::from_le_bytes(buf) as f32 / u32::MAX as f32 * TAU
}

/// The category thread network.
pub struct IntentionNetwork {
    buckets: HashMap<String, CategoryBucket>,
    active: Option<Activation>,
    phase_source: PhaseSource,
}

impl Default for IntentionNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentionNetwork {
    pub fn new() -> Self {
        Self::with_phase_source(entropy_phase)
    }

    /// Deterministic pulse phases for tests.
    pub fn with_phase_source(source: impl FnMut() -> f32 + Send + 'static) -> Self {
        Self {
            buckets: HashMap::new(),
            active: None,
            phase_source: Box::new(source),
        }
    }

    /// Connect a candle to the network: one new thread to every candle
    /// already in its category, then the candle itself joins the bucket.
    ///
    /// No dedup by id — connecting the same id twice creates duplicate nodes
    /// and threads. The feed layer is responsible for connecting each candle
    /// at most once.
    pub fn connect_candle(
        &mut self,
        id: &str,
        category: Option<&str>,
        geo: GeoPoint,
        screen: ScreenPos,
        highlight: Option<HighlightFlag>,
    ) {
        let category = category.unwrap_or(DEFAULT_CATEGORY);
        let Self {
            buckets,
            phase_source,
            ..
        } = self;

        let bucket = buckets.entry(category.to_string()).or_default();
        let new_idx = bucket.nodes.len();
        for existing in 0..new_idx {
            bucket
                .threads
                .push(Thread::new(existing, new_idx, phase_source()));
        }
        bucket.nodes.push(CandleNode {
            id: id.to_string(),
            geo,
            screen,
            highlight,
        });

        debug!(
            id,
            category,
            candles = bucket.nodes.len(),
            threads = bucket.threads.len(),
            "Candle connected to network"
        );
    }

    /// Activate a category: all its threads to full opacity, the clicked
    /// candle highlighted, auto-revert after [`ACTIVATION_SECS`].
    ///
    /// Replaces any previous activation in one step and restarts the
    /// deadline, also when the same category is re-activated. The deadline
    /// is a stored value overwritten here, so no stale timer can fire.
    pub fn activate_category(&mut self, category: &str, clicked_id: &str, now: f64) {
        self.deactivate();

        if let Some(bucket) = self.buckets.get_mut(category) {
            for thread in &mut bucket.threads {
                thread.highlighted = true;
            }
            if let Some(node) = bucket.nodes.iter().find(|n| n.id == clicked_id) {
                if let Some(flag) = &node.highlight {
                    flag.set(true);
                }
            }
        }

        debug!(category, clicked_id, "Category activated");
        self.active = Some(Activation {
            category: category.to_string(),
            node_id: clicked_id.to_string(),
            deadline: now + ACTIVATION_SECS,
        });
    }

    fn deactivate(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        if let Some(bucket) = self.buckets.get_mut(&active.category) {
            for thread in &mut bucket.threads {
                thread.highlighted = false;
            }
            if let Some(node) = bucket.nodes.iter().find(|n| n.id == active.node_id) {
                if let Some(flag) = &node.highlight {
                    flag.set(false);
                }
            }
        }
        debug!(category = %active.category, "Category deactivated");
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.category.as_str())
    }

    /// Per-frame tick: expire the activation, then advance the shimmer
    /// clock of every idle thread. `dt` is the elapsed frame time in
    /// seconds; highlighted threads keep their phase frozen.
    pub fn tick(&mut self, dt: f32, now: f64) {
        if self.active.as_ref().is_some_and(|a| now >= a.deadline) {
            self.deactivate();
        }

        let frames = dt * 60.0;
        for bucket in self.buckets.values_mut() {
            for thread in &mut bucket.threads {
                if !thread.highlighted {
                    thread.advance_phase(frames);
                }
            }
        }
    }

    /// Re-derive every candle's screen position after a viewport change.
    /// A failed projection keeps the stale position rather than failing
    /// the pass.
    pub fn refresh_positions(&mut self, projector: &impl Projector) {
        for bucket in self.buckets.values_mut() {
            for node in &mut bucket.nodes {
                match projector.project(node.geo) {
                    Some(screen) => node.screen = screen,
                    None => {
                        trace!(id = %node.id, "Projection unavailable, keeping stale position")
                    }
                }
            }
        }
    }

    /// Draw list for this frame, endpoint positions read fresh.
    pub fn thread_draws(&self) -> impl Iterator<Item = ThreadDraw> + '_ {
        self.buckets.values().flat_map(|bucket| {
            bucket.threads.iter().map(move |thread| {
                let from = bucket.nodes[thread.a].screen;
                let to = bucket.nodes[thread.b].screen;
                let visual = thread_visual(thread.highlighted, thread.pulse_phase);
                ThreadDraw {
                    from,
                    to,
                    opacity: visual.opacity,
                    glow_dot: visual.glow_dot.then(|| from.midpoint(to)),
                }
            })
        })
    }

    /// Every known candle as (id, category, current screen position).
    pub fn candles(&self) -> impl Iterator<Item = (&str, &str, ScreenPos)> {
        self.buckets.iter().flat_map(|(category, bucket)| {
            bucket
                .nodes
                .iter()
                .map(move |n| (n.id.as_str(), category.as_str(), n.screen))
        })
    }

    pub fn candle_count(&self) -> usize {
        self.buckets.values().map(|b| b.nodes.len()).sum()
    }

    pub fn thread_count(&self) -> usize {
        self.buckets.values().map(|b| b.threads.len()).sum()
    }

    pub fn category_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn threads_in(&self, category: &str) -> usize {
        self.buckets.get(category).map_or(0, |b| b.threads.len())
    }

    /// Drop every candle and thread; any activation ends with them.
    pub fn clear(&mut self) {
        self.deactivate();
        self.buckets.clear();
    }

    /// Structurally remove a candle and every thread touching it.
    ///
    /// Feature-gated: the shipped behavior keeps removed candles in the
    /// network (their marker disappears, their threads stay).
    #[cfg(feature = "removal")]
    pub fn remove_candle(&mut self, id: &str) -> bool {
        let Some((category, idx)) = self.buckets.iter().find_map(|(cat, bucket)| {
            bucket
                .nodes
                .iter()
                .position(|n| n.id == id)
                .map(|i| (cat.clone(), i))
        }) else {
            return false;
        };

        let Some(bucket) = self.buckets.get_mut(&category) else {
            return false;
        };
        bucket.nodes.remove(idx);
        bucket.threads.retain(|t| t.a != idx && t.b != idx);
        for thread in &mut bucket.threads {
            if thread.a > idx {
                thread.a -= 1;
            }
            if thread.b > idx {
                thread.b -= 1;
            }
        }
        if bucket.nodes.is_empty() {
            self.buckets.remove(&category);
        }
        debug!(id, category = %category, "Candle removed from network");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic, strictly increasing phase source.
    fn counting_phases() -> impl FnMut() -> f32 + Send {
        let mut next = 0.0f32;
        move || {
            next += 0.1;
            next
        }
    }

    fn net() -> IntentionNetwork {
        IntentionNetwork::with_phase_source(counting_phases())
    }

    fn at(x: f32, y: f32) -> ScreenPos {
        ScreenPos::new(x, y)
    }

    fn geo(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint { lat, lng }
    }

    fn connect(net: &mut IntentionNetwork, id: &str, category: &str) {
        net.connect_candle(id, Some(category), geo(0.0, 0.0), at(0.0, 0.0), None);
    }

    /// Projector that maps (lat, lng) straight to (lng, lat) pixels.
    struct FlatProjector;
    impl Projector for FlatProjector {
        fn project(&self, g: GeoPoint) -> Option<ScreenPos> {
            Some(ScreenPos::new(g.lng as f32, g.lat as f32))
        }
    }

    /// Projector that always fails, like a map with no layout.
    struct DeadProjector;
    impl Projector for DeadProjector {
        fn project(&self, _: GeoPoint) -> Option<ScreenPos> {
            None
        }
    }

    #[test]
    fn test_complete_graph_per_category() {
        let mut net = net();
        for n in 0..6 {
            connect(&mut net, &format!("c{}", n), "hope");
        }
        // n·(n−1)/2 for n = 6
        assert_eq!(net.threads_in("hope"), 15);
        assert_eq!(net.candle_count(), 6);
        assert_eq!(net.category_count(), 1);
    }

    #[test]
    fn test_categories_stay_separate() {
        let mut net = net();
        connect(&mut net, "a", "health");
        connect(&mut net, "b", "health");
        connect(&mut net, "c", "family");
        assert_eq!(net.threads_in("health"), 1);
        assert_eq!(net.threads_in("family"), 0);
        assert_eq!(net.category_count(), 2);
    }

    #[test]
    fn test_missing_category_uses_sentinel() {
        let mut net = net();
        net.connect_candle("x", None, geo(0.0, 0.0), at(0.0, 0.0), None);
        net.connect_candle("y", None, geo(0.0, 0.0), at(0.0, 0.0), None);
        assert_eq!(net.threads_in(DEFAULT_CATEGORY), 1);
    }

    #[test]
    fn test_duplicate_id_is_not_deduplicated() {
        let mut net = net();
        connect(&mut net, "a", "peace");
        connect(&mut net, "b", "peace");
        connect(&mut net, "a", "peace");
        // The store has no upsert semantics; callers must filter.
        assert_eq!(net.candle_count(), 3);
        assert_eq!(net.threads_in("peace"), 3);
    }

    #[test]
    fn test_pulse_phases_differ_between_threads() {
        let mut net = net();
        connect(&mut net, "a", "hope");
        connect(&mut net, "b", "hope");
        connect(&mut net, "c", "hope");
        let draws: Vec<_> = net.thread_draws().collect();
        assert_eq!(draws.len(), 3);
        // Distinct phases give distinct idle opacities here
        assert!(draws[0].opacity != draws[1].opacity || draws[1].opacity != draws[2].opacity);
    }

    #[test]
    fn test_activation_scenario() {
        let mut net = net();
        connect(&mut net, "a", "cat1");
        connect(&mut net, "b", "cat1");
        connect(&mut net, "c", "cat2");
        assert_eq!(net.threads_in("cat1"), 1);
        assert_eq!(net.threads_in("cat2"), 0);

        connect(&mut net, "d", "cat1");
        assert_eq!(net.threads_in("cat1"), 3);
        assert_eq!(net.threads_in("cat2"), 0);

        net.activate_category("cat1", "a", 10.0);
        assert_eq!(net.active_category(), Some("cat1"));
        assert!(net.thread_draws().all(|d| d.opacity == 1.0 && d.glow_dot.is_some()));

        // Still active just before the deadline
        net.tick(0.016, 14.9);
        assert_eq!(net.active_category(), Some("cat1"));

        // Auto-revert after 5s
        net.tick(0.016, 15.01);
        assert_eq!(net.active_category(), None);
        assert!(net.thread_draws().all(|d| d.opacity < 1.0 && d.glow_dot.is_none()));
    }

    #[test]
    fn test_activation_is_exclusive() {
        let mut net = net();
        connect(&mut net, "a1", "A");
        connect(&mut net, "a2", "A");
        connect(&mut net, "b1", "B");
        connect(&mut net, "b2", "B");

        net.activate_category("A", "a1", 0.0);
        net.activate_category("B", "b1", 1.0);
        assert_eq!(net.active_category(), Some("B"));

        net.tick(0.016, 1.1);
        let opacities: Vec<(f32, bool)> = net
            .thread_draws()
            .map(|d| (d.opacity, d.glow_dot.is_some()))
            .collect();
        // One thread per category: A idle again, B fully opaque
        assert!(opacities.iter().any(|&(o, dot)| o == 1.0 && dot));
        assert!(opacities.iter().any(|&(o, dot)| o < 1.0 && !dot));
    }

    #[test]
    fn test_reactivation_restarts_deadline() {
        let mut net = net();
        connect(&mut net, "a", "C");
        connect(&mut net, "b", "C");

        net.activate_category("C", "a", 0.0);
        net.activate_category("C", "a", 2.0);

        // 5s after the first call but only 3.5s after the second
        net.tick(0.016, 5.5);
        assert_eq!(net.active_category(), Some("C"));

        // 5s after the second call
        net.tick(0.016, 7.01);
        assert_eq!(net.active_category(), None);
    }

    #[test]
    fn test_highlight_flag_follows_activation() {
        let mut net = net();
        let flag = HighlightFlag::new();
        net.connect_candle(
            "a",
            Some("C"),
            geo(0.0, 0.0),
            at(0.0, 0.0),
            Some(flag.clone()),
        );
        connect(&mut net, "b", "C");

        net.activate_category("C", "a", 0.0);
        assert!(flag.is_on());

        // Replacing the activation clears the previous highlight
        net.activate_category("C", "b", 1.0);
        assert!(!flag.is_on());

        net.activate_category("C", "a", 2.0);
        net.tick(0.016, 7.1);
        assert!(!flag.is_on());
    }

    #[test]
    fn test_phase_frozen_while_active() {
        let mut net = net();
        connect(&mut net, "a", "A");
        connect(&mut net, "b", "A");
        connect(&mut net, "c", "B");
        connect(&mut net, "d", "B");

        net.activate_category("A", "a", 0.0);
        let before: Vec<f32> = net.thread_draws().map(|d| d.opacity).collect();
        net.tick(1.0, 0.5);
        let after: Vec<f32> = net.thread_draws().map(|d| d.opacity).collect();

        // A's single thread stays at 1.0; B's thread shimmer moved
        assert!(before.contains(&1.0) && after.contains(&1.0));
        let idle_before: Vec<f32> = before.iter().copied().filter(|&o| o < 1.0).collect();
        let idle_after: Vec<f32> = after.iter().copied().filter(|&o| o < 1.0).collect();
        assert_ne!(idle_before, idle_after);
    }

    #[test]
    fn test_refresh_positions_follows_projector() {
        let mut net = net();
        net.connect_candle("a", Some("C"), geo(10.0, 20.0), at(999.0, 999.0), None);
        net.connect_candle("b", Some("C"), geo(-5.0, 7.0), at(999.0, 999.0), None);

        net.refresh_positions(&FlatProjector);
        let draws: Vec<_> = net.thread_draws().collect();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].from, at(20.0, 10.0));
        assert_eq!(draws[0].to, at(7.0, -5.0));
    }

    #[test]
    fn test_failed_projection_keeps_stale_position() {
        let mut net = net();
        net.connect_candle("a", Some("C"), geo(10.0, 20.0), at(3.0, 4.0), None);
        net.refresh_positions(&DeadProjector);
        let (_, _, screen) = net.candles().next().unwrap();
        assert_eq!(screen, at(3.0, 4.0));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut net = net();
        connect(&mut net, "a", "C");
        connect(&mut net, "b", "C");
        net.activate_category("C", "a", 0.0);

        net.clear();
        assert_eq!(net.candle_count(), 0);
        assert_eq!(net.thread_count(), 0);
        assert_eq!(net.active_category(), None);
    }

    #[cfg(feature = "removal")]
    #[test]
    fn test_remove_candle_prunes_threads() {
        let mut net = net();
        connect(&mut net, "a", "C");
        connect(&mut net, "b", "C");
        connect(&mut net, "c", "C");
        assert_eq!(net.threads_in("C"), 3);

        assert!(net.remove_candle("b"));
        assert_eq!(net.candle_count(), 2);
        // Complete graph over the two survivors
        assert_eq!(net.threads_in("C"), 1);
        assert!(!net.remove_candle("b"));

        assert!(net.remove_candle("a"));
        assert!(net.remove_candle("c"));
        assert_eq!(net.category_count(), 0);
    }
}
