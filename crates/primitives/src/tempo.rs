//! Pacing plans for human-cadence interaction.

use std::ops::Range;
use std::time::Duration;

use rand::Rng;

/// Delay plan applied around primitive operations. `human()` is the
/// production cadence; `none()` collapses every delay for tests.
#[derive(Clone, Debug)]
pub struct Pacing {
    settle_ms: u64,
    keystroke_ms: Range<u64>,
    pre_action_ms: Range<u64>,
}

impl Pacing {
    /// Production pacing: short settle before clicks, 50-150 ms per
    /// keystroke, and a 1-3 s "thinking" delay before controller-issued
    /// actions.
    pub fn human() -> Self {
        Self {
            settle_ms: 300,
            keystroke_ms: 50..150,
            pre_action_ms: 1000..3000,
        }
    }

    /// Zero delays everywhere.
    pub fn none() -> Self {
        Self {
            settle_ms: 0,
            keystroke_ms: 0..0,
            pre_action_ms: 0..0,
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn keystroke(&self) -> Duration {
        Duration::from_millis(sample(&self.keystroke_ms))
    }

    /// Natural pre-action delay, overridable by a controller-supplied
    /// value.
    pub fn pre_action(&self, override_ms: Option<u64>) -> Duration {
        match override_ms {
            Some(ms) => Duration::from_millis(ms),
            None => Duration::from_millis(sample(&self.pre_action_ms)),
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::human()
    }
}

fn sample(range: &Range<u64>) -> u64 {
    if range.is_empty() {
        range.start
    } else {
        rand::thread_rng().gen_range(range.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_keystrokes_stay_in_band() {
        let pacing = Pacing::human();
        for _ in 0..64 {
            let delay = pacing.keystroke().as_millis() as u64;
            assert!((50..150).contains(&delay), "delay {} out of band", delay);
        }
    }

    #[test]
    fn none_collapses_all_delays() {
        let pacing = Pacing::none();
        assert_eq!(pacing.settle(), Duration::ZERO);
        assert_eq!(pacing.keystroke(), Duration::ZERO);
        assert_eq!(pacing.pre_action(None), Duration::ZERO);
    }

    #[test]
    fn controller_delay_overrides_sampling() {
        let pacing = Pacing::human();
        assert_eq!(pacing.pre_action(Some(2000)), Duration::from_millis(2000));
    }
}
