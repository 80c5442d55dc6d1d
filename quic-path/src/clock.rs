use std::{fmt::Debug, time::Instant};

/// Source of monotonic timestamps for challenge send times and retry deadlines
pub trait Clock: Send + Sync + Debug + 'static {
    /// The current time
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`]
#[derive(Debug, Default, Copy, Clone)]
pub struct StdClock;

impl Clock for StdClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
