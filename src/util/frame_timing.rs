use std::time::{Duration, Instant};

/// How often [`FrameTiming::end_frame`] reports stats.
const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Frame timing with FPS calculation and optional frame limiting
pub struct FrameTiming {
    /// Target FPS (0 = unlimited)
    target_fps: u32,
    /// Minimum frame duration based on target FPS
    min_frame_duration: Duration,
    /// Last frame timestamp
    last_frame: Instant,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
    last_report: Instant,
    frames_since_report: u32,
}

/// Summary emitted once per stats interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Smoothed FPS at report time.
    pub fps: f32,
    /// Frames rendered since the previous report.
    pub frames: u32,
}

impl FrameTiming {
    /// Create a new frame timer with the given FPS target (0 = unlimited).
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let min_frame_duration = if target_fps > 0 {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        } else {
            Duration::ZERO
        };
        let now = Instant::now();

        Self {
            target_fps,
            min_frame_duration,
            last_frame: now,
            smoothed_fps: 60.0,
            smoothing: 0.05,
            last_report: now,
            frames_since_report: 0,
        }
    }

    /// Whether enough time has passed since the last frame to render again.
    #[must_use]
    pub fn should_render(&self) -> bool {
        if self.target_fps == 0 {
            return true;
        }
        self.last_frame.elapsed() >= self.min_frame_duration
    }

    /// Call after rendering to update timing. Returns stats once per
    /// interval (also logged at debug level).
    pub fn end_frame(&mut self) -> Option<FrameStats> {
        self.end_frame_at(Instant::now())
    }

    fn end_frame_at(&mut self, now: Instant) -> Option<FrameStats> {
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.frames_since_report += 1;

        let frame_time = elapsed.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }

        if now.duration_since(self.last_report) < STATS_INTERVAL {
            return None;
        }
        let stats = FrameStats {
            fps: self.smoothed_fps,
            frames: std::mem::take(&mut self.frames_since_report),
        };
        self.last_report = now;
        log::debug!("{:.1} fps ({} frames)", stats.fps, stats.frames);
        Some(stats)
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_target_always_renders() {
        assert!(FrameTiming::new(0).should_render());
    }

    #[test]
    fn smoothing_moves_toward_the_observed_rate() {
        let mut timing = FrameTiming::new(0);
        let mut now = timing.last_frame;
        for _ in 0..200 {
            now += Duration::from_millis(10);
            let _ = timing.end_frame_at(now);
        }
        assert!((timing.fps() - 100.0).abs() < 1.0, "fps = {}", timing.fps());
    }

    #[test]
    fn stats_are_reported_once_per_interval() {
        let mut timing = FrameTiming::new(0);
        let start = timing.last_frame;
        assert!(timing.end_frame_at(start + Duration::from_secs(1)).is_none());
        let stats = timing
            .end_frame_at(start + STATS_INTERVAL)
            .expect("interval elapsed");
        assert_eq!(stats.frames, 2);
        assert!(timing
            .end_frame_at(start + STATS_INTERVAL + Duration::from_secs(1))
            .is_none());
    }
}
