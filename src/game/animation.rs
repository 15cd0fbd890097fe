//! Animation timing metadata
//!
//! The simulation never touches pixels. It only needs to know how long each
//! state's sprite sheet plays, so attack windows and automatic returns to
//! idle line up with what the renderer draws.

use std::fmt;
use std::sync::Arc;

use super::fighter::FighterState;

/// Frames per sprite sheet (2 rows x 3 columns)
pub const SHEET_FRAME_COUNT: usize = 6;

/// Read-only animation metadata, injected into every fighter
pub trait AnimationLibrary: Send + Sync + fmt::Debug {
    /// Seconds each frame of `state`'s animation is shown
    fn frame_duration(&self, state: FighterState) -> f32;

    /// Number of frames in `state`'s animation
    fn frame_count(&self, state: FighterState) -> usize;

    /// Total play time of one pass through `state`'s animation
    fn animation_duration(&self, state: FighterState) -> f32 {
        self.frame_duration(state) * self.frame_count(state) as f32
    }

    /// Whether a one-shot play of `state`'s animation has run out
    fn is_animation_finished(&self, state: FighterState, elapsed: f32) -> bool {
        let frame = frame_number(self.frame_duration(state), elapsed);
        self.frame_count(state).saturating_sub(1) < frame
    }

    /// Sprite-sheet frame to draw for `state` at `elapsed`
    fn key_frame(&self, state: FighterState, elapsed: f32) -> usize {
        let count = self.frame_count(state).max(1);
        let frame = frame_number(self.frame_duration(state), elapsed);
        if state.loops() {
            frame % count
        } else {
            frame.min(count - 1)
        }
    }
}

fn frame_number(frame_duration: f32, elapsed: f32) -> usize {
    if frame_duration <= 0.0 || elapsed <= 0.0 {
        return 0;
    }
    (elapsed / frame_duration) as usize
}

/// Timings of the stock fighter sprite sheets
#[derive(Debug, Clone)]
pub struct SpriteSheetTimings {
    frame_count: usize,
}

impl SpriteSheetTimings {
    pub fn new() -> Self {
        Self {
            frame_count: SHEET_FRAME_COUNT,
        }
    }

    /// Shared handle suitable for passing to [`Fighter::new`](super::fighter::Fighter::new)
    pub fn shared() -> Arc<dyn AnimationLibrary> {
        Arc::new(Self::new())
    }
}

impl Default for SpriteSheetTimings {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationLibrary for SpriteSheetTimings {
    fn frame_duration(&self, state: FighterState) -> f32 {
        match state {
            FighterState::Block => 0.05,
            FighterState::Hurt => 0.03,
            FighterState::Idle => 0.1,
            FighterState::Kick => 0.05,
            FighterState::Lose => 0.05,
            FighterState::Punch => 0.05,
            FighterState::Walk => 0.08,
            FighterState::Win => 0.05,
        }
    }

    fn frame_count(&self, _state: FighterState) -> usize {
        self.frame_count
    }
}
