//! Frame timing utilities

use std::time::{Duration, Instant};

/// Tracks frame timing and calculates FPS
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    /// Start of the current one second window
    fps_timer: Instant,
    fps: f32,
    fps_frame_count: u32,
    /// Average frame time of the last complete window, in milliseconds
    frame_time_ms: f32,
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps_timer: now,
            fps: 0.0,
            fps_frame_count: 0,
            frame_time_ms: 0.0,
        }
    }

    /// Call once per frame to update timing
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        // Refresh FPS once per second
        let fps_elapsed = now.saturating_duration_since(self.fps_timer);
        if fps_elapsed >= Duration::from_secs(1) {
            let secs = fps_elapsed.as_secs_f32();
            self.fps = self.fps_frame_count as f32 / secs;
            self.frame_time_ms = secs * 1000.0 / self.fps_frame_count as f32;
            self.fps_frame_count = 0;
            self.fps_timer = now;
        }
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get delta time as Duration
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get current FPS (updated every second)
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Average milliseconds per frame over the last second
    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_between_ticks() {
        let mut timer = FrameTimer::new();
        let start = timer.last_frame;
        timer.tick_at(start + Duration::from_millis(16));
        assert_eq!(timer.delta(), Duration::from_millis(16));
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn test_fps_refreshes_after_one_second() {
        let mut timer = FrameTimer::new();
        let start = timer.last_frame;

        for i in 1..=49 {
            timer.tick_at(start + Duration::from_millis(20 * i));
        }
        // Window not complete yet
        assert_eq!(timer.fps(), 0.0);

        timer.tick_at(start + Duration::from_millis(1000));
        assert!((timer.fps() - 50.0).abs() < 0.01, "fps = {}", timer.fps());
        assert!((timer.frame_time_ms() - 20.0).abs() < 0.01);
    }
}
