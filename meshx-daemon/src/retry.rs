//! Bounded exponential backoff

use std::time::Duration;

use crate::config::RetryConfig;

#[derive(Debug, Clone)]
pub struct Backoff {
    max: Duration,
    current: Duration,
    attempts: u32,
}

impl Backoff {
    pub fn new(config: &RetryConfig) -> Self {
        let initial = Duration::from_millis(config.initial_delay_ms);
        Self {
            max: Duration::from_millis(config.max_delay_ms).max(initial),
            current: initial,
            attempts: 0,
        }
    }

    /// Delay before the next attempt; doubles up to the cap
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        self.attempts += 1;
        delay
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubles_until_cap() {
        let mut backoff = Backoff::new(&RetryConfig { initial_delay_ms: 100, max_delay_ms: 350 });
        let delays: Vec<u64> = (0..5).map(|_| backoff.next_delay().as_millis() as u64).collect();
        assert_eq!(delays, vec![100, 200, 350, 350, 350]);
        assert_eq!(backoff.attempts(), 5);
    }
}
