use std::time::{Duration, Instant};

use super::frame::FrameStage;

pub(crate) const PERF_WINDOW_LEN: usize = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RollingMsStats {
    pub last_ms: f32,
    pub avg_ms: f32,
    pub max_ms: f32,
}

/// Rolling last/avg/max timings of every frame stage.
#[derive(Debug, Default)]
pub(crate) struct StageTimings {
    windows: [RollingWindowMs; FrameStage::COUNT],
}

impl StageTimings {
    pub(crate) fn record(&mut self, stage: FrameStage, duration: Duration) {
        self.windows[stage.index()].push_ms(duration_to_ms(duration));
    }

    pub(crate) fn stats(&self, stage: FrameStage) -> RollingMsStats {
        self.windows[stage.index()].stats()
    }

    pub(crate) fn sample_count(&self, stage: FrameStage) -> usize {
        self.windows[stage.index()].count
    }
}

#[derive(Debug)]
struct RollingWindowMs {
    samples_ms: [f32; PERF_WINDOW_LEN],
    head: usize,
    count: usize,
    sum_ms: f32,
    last_ms: f32,
}

impl Default for RollingWindowMs {
    fn default() -> Self {
        Self {
            samples_ms: [0.0; PERF_WINDOW_LEN],
            head: 0,
            count: 0,
            sum_ms: 0.0,
            last_ms: 0.0,
        }
    }
}

impl RollingWindowMs {
    fn push_ms(&mut self, value_ms: f32) {
        self.last_ms = value_ms;
        let evicted = if self.count == PERF_WINDOW_LEN {
            self.samples_ms[self.head]
        } else {
            self.count += 1;
            0.0
        };
        self.samples_ms[self.head] = value_ms;
        self.head = (self.head + 1) % PERF_WINDOW_LEN;
        self.sum_ms += value_ms - evicted;
    }

    fn stats(&self) -> RollingMsStats {
        if self.count == 0 {
            return RollingMsStats::default();
        }
        let max_ms = self.samples_ms[..self.count]
            .iter()
            .copied()
            .fold(f32::MIN, f32::max);
        RollingMsStats {
            last_ms: self.last_ms,
            avg_ms: self.sum_ms / self.count as f32,
            max_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopRateSnapshot {
    pub tps: f32,
    pub frame_time_ms: f32,
}

/// Counts ticks over `interval` and reports the achieved rate once per interval.
#[derive(Debug)]
pub(crate) struct LoopRateAccumulator {
    interval_start: Instant,
    interval: Duration,
    ticks: u32,
    frame_time_sum: Duration,
}

impl LoopRateAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    pub(crate) fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            interval_start: start,
            interval,
            ticks: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_tick(&mut self, frame_time: Duration) {
        self.ticks = self.ticks.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_time);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopRateSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.ticks == 0 {
            0.0
        } else {
            duration_to_ms(self.frame_time_sum) / self.ticks as f32
        };
        let snapshot = LoopRateSnapshot {
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
        };

        self.interval_start = now;
        self.ticks = 0;
        self.frame_time_sum = Duration::ZERO;
        Some(snapshot)
    }
}

fn duration_to_ms(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}
