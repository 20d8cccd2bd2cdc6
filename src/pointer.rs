//! Pointer kinematics: raw move events in, frame-aligned speed out.
//!
//! Speed is derived from the position delta between *frames*, not between
//! input events, so repulsion strength reflects perceived on-screen motion
//! rather than input event density. The moving flag trails the last event
//! by a fixed debounce window.

use std::time::{Duration, Instant};

/// Idle window after which the pointer counts as stopped.
pub const POINTER_IDLE_DEBOUNCE: Duration = Duration::from_millis(50);

/// Parked position before the first real event, far outside any zone.
const PARKED: (f32, f32) = (-1000.0, -1000.0);

/// One frame's worth of pointer kinematics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: (f32, f32),
    /// Distance moved since the previous frame, in px.
    pub speed: f32,
    pub is_moving: bool,
}

/// Tracks raw pointer position and derives per-frame kinematics.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    position: (f32, f32),
    last_frame_position: (f32, f32),
    moving_until: Option<Instant>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            position: PARKED,
            last_frame_position: PARKED,
            moving_until: None,
        }
    }

    /// Records a raw pointer-move event. Resets the idle debounce.
    pub fn pointer_moved(&mut self, position: (f32, f32), now: Instant) {
        self.position = position;
        self.moving_until = Some(now + POINTER_IDLE_DEBOUNCE);
    }

    /// Samples kinematics for the current frame and advances the
    /// frame-aligned reference position.
    pub fn sample(&mut self, now: Instant) -> PointerSample {
        let dx = self.position.0 - self.last_frame_position.0;
        let dy = self.position.1 - self.last_frame_position.1;
        let speed = dx.hypot(dy);
        self.last_frame_position = self.position;

        PointerSample {
            position: self.position,
            speed,
            is_moving: self.moving_until.is_some_and(|deadline| now < deadline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_parked_and_idle() {
        let mut tracker = PointerTracker::new();
        let sample = tracker.sample(Instant::now());
        assert_eq!(sample.position, (-1000.0, -1000.0));
        assert_eq!(sample.speed, 0.0);
        assert!(!sample.is_moving);
    }

    #[test]
    fn speed_is_frame_aligned_not_event_aligned() {
        let mut tracker = PointerTracker::new();
        let t0 = Instant::now();
        tracker.pointer_moved((0.0, 0.0), t0);
        tracker.sample(t0);

        // Three events land between frames; only the net displacement from
        // the last frame counts.
        tracker.pointer_moved((10.0, 0.0), t0);
        tracker.pointer_moved((20.0, 0.0), t0);
        tracker.pointer_moved((3.0, 4.0), t0);
        let sample = tracker.sample(t0);
        assert!((sample.speed - 5.0).abs() < 1e-6);

        // No events since: the next frame sees zero speed.
        let sample = tracker.sample(t0);
        assert_eq!(sample.speed, 0.0);
    }

    #[test]
    fn moving_flag_clears_after_debounce() {
        let mut tracker = PointerTracker::new();
        let t0 = Instant::now();
        tracker.pointer_moved((5.0, 5.0), t0);

        assert!(tracker.sample(t0).is_moving);
        assert!(tracker.sample(t0 + Duration::from_millis(49)).is_moving);
        assert!(!tracker.sample(t0 + Duration::from_millis(50)).is_moving);
        assert!(!tracker.sample(t0 + Duration::from_millis(200)).is_moving);
    }

    #[test]
    fn new_event_resets_the_debounce() {
        let mut tracker = PointerTracker::new();
        let t0 = Instant::now();
        tracker.pointer_moved((5.0, 5.0), t0);
        tracker.pointer_moved((6.0, 5.0), t0 + Duration::from_millis(40));
        assert!(tracker
            .sample(t0 + Duration::from_millis(80))
            .is_moving);
        assert!(!tracker
            .sample(t0 + Duration::from_millis(91))
            .is_moving);
    }
}
