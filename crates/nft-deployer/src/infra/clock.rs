use {
    crate::traits::Clock,
    chrono::{DateTime, Utc},
};

/// Reads the wall clock of the machine running the deployment.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
