//! Thread entity and its opacity model
//!
//! A thread is the persistent line between two candles of the same category.
//! Idle threads shimmer around a dim baseline; threads of the active category
//! snap to full opacity and grow a glow dot at their midpoint. All threads
//! share one color and width; only opacity and the dot vary.

use std::f32::consts::TAU;

/// Dim baseline for threads of inactive categories.
pub const IDLE_OPACITY: f32 = 0.15;
/// Full opacity while the thread's category is active.
pub const ACTIVE_OPACITY: f32 = 1.0;
/// The shimmer never drops below this floor.
pub const OPACITY_FLOOR: f32 = 0.1;
/// Shimmer amplitude around the idle baseline.
pub const PULSE_AMPLITUDE: f32 = 0.05;
/// Phase advance in radians per nominal 60fps frame.
pub const PULSE_VELOCITY: f32 = 0.02;

/// Warm gold, same for every thread.
pub const THREAD_COLOR: (u8, u8, u8) = (0xF5, 0xE6, 0xA2);
pub const THREAD_WIDTH: f32 = 1.5;
pub const GLOW_DOT_RADIUS: f32 = 3.0;
pub const GLOW_DOT_ALPHA: f32 = 0.3;

/// A thread between two candles of one category bucket.
///
/// `a` and `b` index into the bucket's node list; `a` is always the older
/// candle (threads are created the moment their second endpoint arrives).
#[derive(Debug, Clone)]
pub struct Thread {
    pub a: usize,
    pub b: usize,
    /// Per-thread animation clock, random at creation so threads do not
    /// pulse in lock-step.
    pub pulse_phase: f32,
    /// True only while this thread's category is the active one.
    pub highlighted: bool,
}

impl Thread {
    pub fn new(a: usize, b: usize, pulse_phase: f32) -> Self {
        Self {
            a,
            b,
            pulse_phase,
            highlighted: false,
        }
    }

    /// Advance the shimmer clock by `frames` nominal frame units.
    /// Frozen while highlighted; the caller skips highlighted threads.
    pub fn advance_phase(&mut self, frames: f32) {
        self.pulse_phase = (self.pulse_phase + PULSE_VELOCITY * frames).rem_euclid(TAU);
    }
}

/// What a thread looks like this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreadVisual {
    pub opacity: f32,
    pub glow_dot: bool,
}

/// Pure opacity model: highlighted threads are fully opaque with a glow dot;
/// idle threads shimmer, clamped to the floor.
pub fn thread_visual(highlighted: bool, pulse_phase: f32) -> ThreadVisual {
    if highlighted {
        ThreadVisual {
            opacity: ACTIVE_OPACITY,
            glow_dot: true,
        }
    } else {
        ThreadVisual {
            opacity: (IDLE_OPACITY + pulse_phase.sin() * PULSE_AMPLITUDE).max(OPACITY_FLOOR),
            glow_dot: false,
        }
    }
}
