//! Run statistics.

use std::time::Duration;

use observability::RunningStats;

/// Counters accumulated over all sessions of one run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Connect + spawn attempts
    pub attempts: u64,
    pub sessions_started: u64,
    /// Sessions aborted by an error
    pub retries: u64,
    pub ticks: u64,
    pub commands_applied: u64,
    pub mode_switches: u64,
    pub frames_presented: u64,
    pub last_error: Option<String>,
    pub duration: Duration,
    /// Tick processing time in milliseconds
    pub tick_ms: RunningStats,
}

impl RunStats {
    /// Presented frames per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_presented as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Drive Session Statistics ===\n");
        println!("Overview");
        println!("   |- Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   |- Attempts: {}", self.attempts);
        println!("   |- Sessions started: {}", self.sessions_started);
        println!("   `- Retries: {}", self.retries);

        println!("\nControl loop");
        println!("   |- Ticks: {}", self.ticks);
        println!("   |- Commands applied: {}", self.commands_applied);
        println!("   |- Mode switches: {}", self.mode_switches);
        println!("   |- Frames presented: {} ({:.2} fps)", self.frames_presented, self.fps());
        println!("   `- Tick time (ms): {}", self.tick_ms.summary());

        if let Some(error) = &self.last_error {
            println!("\nLast error: {error}");
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps() {
        let stats = RunStats {
            frames_presented: 120,
            duration: Duration::from_secs(4),
            ..Default::default()
        };
        assert!((stats.fps() - 30.0).abs() < 1e-9);
        assert_eq!(RunStats::default().fps(), 0.0);
    }
}
