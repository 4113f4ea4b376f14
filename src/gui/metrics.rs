//! 帧率统计
//!
//! 每秒刷新一次 FPS，叠加层直接显示刷新后的值。

use std::time::{Duration, Instant};

/// 帧率统计
pub struct PerformanceMetrics {
    frame_count: u32,
    last_update: Instant,
    fps: f32,
    frame_time_ms: f32,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            frame_count: 0,
            last_update: now,
            fps: 0.0,
            frame_time_ms: 0.0,
        }
    }

    /// 记录一帧
    pub fn record_frame(&mut self) {
        self.record_frame_at(Instant::now());
    }

    fn record_frame_at(&mut self, now: Instant) {
        self.frame_count += 1;
        let elapsed = now.duration_since(self.last_update);

        if elapsed >= Duration::from_secs(1) {
            self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
            self.frame_time_ms = 1000.0 / self.fps;
            self.frame_count = 0;
            self.last_update = now;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_updates_once_per_second() {
        let start = Instant::now();
        let mut metrics = PerformanceMetrics::starting_at(start);
        for i in 1..=59 {
            metrics.record_frame_at(start + Duration::from_millis(i * 16));
        }
        assert_eq!(metrics.fps(), 0.0);

        metrics.record_frame_at(start + Duration::from_secs(1));
        assert!((metrics.fps() - 60.0).abs() < 1e-3);
        assert!((metrics.frame_time_ms() - 16.666).abs() < 0.01);
    }
}
