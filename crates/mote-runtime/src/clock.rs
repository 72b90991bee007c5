//! Frame clock with an optional frames-per-second ceiling

/// Slack when comparing frame intervals, so hosts stepping in exact
/// `1 / fps` increments are not rejected by rounding.
const INTERVAL_EPSILON: f64 = 1e-6;

/// Tracks frame time, gates frames against an fps ceiling and owns the
/// frame counter shared by everything that animates per frame.
pub struct FrameClock {
    /// Total elapsed simulation time in seconds
    pub total_time: f64,
    /// Time since the last executed frame in seconds
    pub delta_time: f64,
    /// Frames-per-second ceiling (0 = unlimited)
    pub fps_limit: u32,
    /// Upper bound on a single frame's delta
    pub max_delta: f64,
    /// Number of frames executed so far
    pub frame_count: u64,
    /// Timestamp of the last executed frame
    last_frame: Option<f64>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fps_limit: 0,
            max_delta: 0.25,
            frame_count: 0,
            last_frame: None,
        }
    }
}

impl FrameClock {
    /// Create an unlimited frame clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame clock capped at `fps` frames per second
    pub fn with_fps_limit(fps: u32) -> Self {
        Self {
            fps_limit: fps,
            ..Self::default()
        }
    }

    /// Minimum interval between frames, if limited
    pub fn frame_interval(&self) -> Option<f64> {
        (self.fps_limit > 0).then(|| 1.0 / self.fps_limit as f64)
    }

    /// Advance to the host timestamp `now` (seconds). Returns false when the
    /// fps ceiling says this frame should be skipped; `delta_time` is then
    /// left untouched.
    pub fn tick_at(&mut self, now: f64) -> bool {
        let Some(last) = self.last_frame else {
            self.last_frame = Some(now);
            self.delta_time = 0.0;
            return true;
        };

        let elapsed = (now - last).max(0.0);
        if let Some(interval) = self.frame_interval() {
            if elapsed + INTERVAL_EPSILON < interval {
                return false;
            }
        }

        self.last_frame = Some(now);
        // Clamp to avoid a burst of aging after the host stalls
        self.delta_time = elapsed.min(self.max_delta);
        self.total_time += self.delta_time;
        true
    }

    /// Count one executed frame. Call exactly once per executed tick.
    pub fn advance_frame(&mut self) {
        self.frame_count += 1;
    }
}
