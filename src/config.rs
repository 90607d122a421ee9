use std::time::{Duration};

pub const DEFAULT_TRIALS: u32 = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 4;
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

/// Settings for one probe session, take a look at the default implementation.
///
/// Trial count and timeout are clamped to at least one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    target: String,
    trials: u32,
    timeout_secs: u64,
    pause: Duration,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {

            target: String::from("127.0.0.1"),
            trials: DEFAULT_TRIALS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,

            pause: DEFAULT_PAUSE,
        }
    }
}

impl SessionConfig {

    pub fn new<S: Into<String>>(target: S) -> SessionConfig {
        SessionConfig {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_trials(mut self, trials: u32) -> SessionConfig {
        self.trials = trials.max(1);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> SessionConfig {
        self.timeout_secs = timeout_secs.max(1);
        self
    }

    /// Pause between consecutive trials, not counted in any delay.
    pub fn with_pause(mut self, pause: Duration) -> SessionConfig {
        self.pause = pause;
        self
    }

    pub fn target(&self) -> &str {
        &(self.target)
    }

    pub fn trials(&self) -> u32 {
        self.trials
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }
}
