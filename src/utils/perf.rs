//! Turn timing utilities
//!
//! Provides a stopwatch for the stages of one conversational turn.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// A turn stage that gets timed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Stt,
    Llm,
    Tts,
}

/// A simple stopwatch for measuring elapsed time
#[derive(Debug)]
pub struct Stopwatch {
    start: Instant,
    lap_start: Instant,
    timings: TurnTimings,
}

impl Stopwatch {
    /// Start a new stopwatch
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            lap_start: now,
            timings: TurnTimings::default(),
        }
    }

    /// Restart the lap clock without recording anything
    pub fn reset_lap(&mut self) {
        self.lap_start = Instant::now();
    }

    /// Record the time since the previous lap against `stage`
    pub fn lap(&mut self, stage: Stage) -> Duration {
        let now = Instant::now();
        let elapsed = now - self.lap_start;
        self.lap_start = now;

        let ms = Some(elapsed.as_millis() as u64);
        match stage {
            Stage::Stt => self.timings.stt_ms = ms,
            Stage::Llm => self.timings.llm_ms = ms,
            Stage::Tts => self.timings.tts_ms = ms,
        }
        elapsed
    }

    /// Get the elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop and return the recorded timings
    pub fn finish(mut self) -> TurnTimings {
        self.timings.total_ms = self.start.elapsed().as_millis() as u64;
        self.timings
    }
}

/// Per-stage latency of one turn; stages that did not run stay `None`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnTimings {
    /// STT processing time (ms)
    pub stt_ms: Option<u64>,

    /// LLM generation time across all attempts (ms)
    pub llm_ms: Option<u64>,

    /// TTS synthesis time (ms)
    pub tts_ms: Option<u64>,

    /// Whole turn (ms)
    pub total_ms: u64,
}

impl TurnTimings {
    /// Generate a timing summary string
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if let Some(stt) = self.stt_ms {
            parts.push(format!("STT: {}ms", stt));
        }
        if let Some(llm) = self.llm_ms {
            parts.push(format!("LLM: {}ms", llm));
        }
        if let Some(tts) = self.tts_ms {
            parts.push(format!("TTS: {}ms", tts));
        }
        parts.push(format!("Total: {}ms", self.total_ms));

        parts.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwatch_laps() {
        let mut sw = Stopwatch::start();
        std::thread::sleep(Duration::from_millis(10));
        sw.lap(Stage::Stt);
        std::thread::sleep(Duration::from_millis(10));
        sw.lap(Stage::Llm);

        assert!(sw.elapsed() >= Duration::from_millis(20));
        let timings = sw.finish();
        assert!(timings.stt_ms.unwrap() >= 10);
        assert!(timings.llm_ms.unwrap() >= 10);
        assert_eq!(timings.tts_ms, None);
        assert!(timings.total_ms >= 20);
    }

    #[test]
    fn test_summary_skips_missing_stages() {
        let timings = TurnTimings {
            stt_ms: Some(200),
            llm_ms: None,
            tts_ms: Some(100),
            total_ms: 450,
        };

        assert_eq!(timings.summary(), "STT: 200ms | TTS: 100ms | Total: 450ms");
    }
}
