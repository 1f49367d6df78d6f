//! Session clock.
//!
//! Elapsed time excludes paused intervals and includes any bonus seconds.
//! Each session owns its own clock; a new session builds a fresh one.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::sync_list::lock;

#[derive(Debug, Default)]
struct ClockState {
    origin: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
    bonus: Duration,
}

/// Monotonic game clock with pause/resume support
#[derive(Debug, Default)]
pub struct GameClock {
    state: Mutex<ClockState>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&self, now: Instant) {
        let mut state = lock(&self.state);
        *state = ClockState {
            origin: Some(now),
            ..ClockState::default()
        };
    }

    /// Stop the clock; elapsed time reads 0 until the next start
    pub fn stop(&self) {
        *lock(&self.state) = ClockState::default();
    }

    pub fn pause(&self) {
        self.pause_at(Instant::now());
    }

    pub fn pause_at(&self, now: Instant) {
        let mut state = lock(&self.state);
        if state.origin.is_some() && state.paused_at.is_none() {
            state.paused_at = Some(now);
        }
    }

    pub fn resume(&self) {
        self.resume_at(Instant::now());
    }

    pub fn resume_at(&self, now: Instant) {
        let mut state = lock(&self.state);
        if let Some(paused_at) = state.paused_at.take() {
            state.paused_total += now.saturating_duration_since(paused_at);
        }
    }

    /// Credit bonus time, as if the session had started `seconds` earlier
    pub fn add_seconds(&self, seconds: u64) {
        lock(&self.state).bonus += Duration::from_secs(seconds);
    }

    pub fn is_running(&self) -> bool {
        let state = lock(&self.state);
        state.origin.is_some() && state.paused_at.is_none()
    }

    pub fn is_paused(&self) -> bool {
        lock(&self.state).paused_at.is_some()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds_at(Instant::now())
    }

    pub fn elapsed_seconds_at(&self, now: Instant) -> u64 {
        let state = lock(&self.state);
        let Some(origin) = state.origin else {
            return 0;
        };
        let end = state.paused_at.unwrap_or(now);
        let elapsed = end.saturating_duration_since(origin).saturating_sub(state.paused_total) + state.bonus;
        elapsed.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_not_started_reads_zero() {
        let clock = GameClock::new();
        clock.add_seconds(30);
        assert_eq!(clock.elapsed_seconds(), 0);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_elapsed_truncates_to_whole_seconds() {
        let clock = GameClock::new();
        let t0 = Instant::now();
        clock.start_at(t0);
        assert_eq!(clock.elapsed_seconds_at(t0 + Duration::from_millis(1999)), 1);
        assert_eq!(clock.elapsed_seconds_at(t0 + secs(2)), 2);
    }

    #[test]
    fn test_paused_time_not_counted() {
        let clock = GameClock::new();
        let t0 = Instant::now();
        clock.start_at(t0);
        clock.pause_at(t0 + secs(10));

        // Frozen while paused
        assert_eq!(clock.elapsed_seconds_at(t0 + secs(40)), 10);
        assert!(clock.is_paused());

        clock.resume_at(t0 + secs(40));
        assert_eq!(clock.elapsed_seconds_at(t0 + secs(45)), 15);
        assert!(clock.is_running());
    }

    #[test]
    fn test_double_pause_keeps_first_instant() {
        let clock = GameClock::new();
        let t0 = Instant::now();
        clock.start_at(t0);
        clock.pause_at(t0 + secs(5));
        clock.pause_at(t0 + secs(8));
        clock.resume_at(t0 + secs(10));
        assert_eq!(clock.elapsed_seconds_at(t0 + secs(10)), 5);
    }

    #[test]
    fn test_add_seconds() {
        let clock = GameClock::new();
        let t0 = Instant::now();
        clock.start_at(t0);
        clock.add_seconds(70);
        assert_eq!(clock.elapsed_seconds_at(t0 + secs(1)), 71);
    }

    #[test]
    fn test_restart_discards_previous_run() {
        let clock = GameClock::new();
        let t0 = Instant::now();
        clock.start_at(t0);
        clock.add_seconds(100);
        clock.pause_at(t0 + secs(3));

        clock.start_at(t0 + secs(50));
        assert_eq!(clock.elapsed_seconds_at(t0 + secs(52)), 2);
        assert!(!clock.is_paused());
    }
}
