/// A one-shot delayed task advanced by frame time.
/// Owners keep it in an `Option` and drop it to cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedTask {
    /// Seconds left before the task fires.
    remaining: f32,
}

impl DelayedTask {
    pub fn new(delay: f32) -> Self {
        Self {
            remaining: delay.max(0.0),
        }
    }

    /// Advance by `dt` seconds. Returns true once the delay has elapsed.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= dt.max(0.0);
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_delay() {
        let mut task = DelayedTask::new(3.0);
        assert!(!task.advance(1.0));
        assert!(!task.advance(1.5));
        assert!(task.advance(0.5));
    }

    #[test]
    fn negative_dt_does_not_rewind() {
        let mut task = DelayedTask::new(1.0);
        assert!(!task.advance(-5.0));
        assert_eq!(task.remaining(), 1.0);
    }

    #[test]
    fn zero_delay_fires_on_first_tick() {
        let mut task = DelayedTask::new(0.0);
        assert!(task.advance(0.0));
    }
}
