//! Platform-agnostic core module - shared between the WASM map and the CLI

pub mod candle;
pub mod feed;
pub mod network;
pub mod project;
pub mod thread;

pub use candle::{Candle, CandleStatus, GeoPoint, Visibility, DEFAULT_CATEGORY};
pub use feed::{parse_change, CandleChange};
pub use network::{HighlightFlag, IntentionNetwork, ThreadDraw, ACTIVATION_SECS};
pub use project::{MapView, Projector, ScreenPos};
#[allow(unused_imports)]
pub use thread::{thread_visual, Thread, ThreadVisual};
