use std::time::Instant;

/// Owned handle for the retry alarm of a path validation attempt
///
/// The embedding event loop learns the deadline through [`RetryTimer::deadline`] and hands
/// control back once it passes. Stopping the timer takes effect immediately: an expiry that is
/// reported after [`RetryTimer::stop`] finds nothing to fire.
#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct RetryTimer {
    deadline: Option<Instant>,
}

impl RetryTimer {
    /// Sets the timer unconditionally
    pub(crate) fn set(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    pub(crate) fn stop(&mut self) {
        self.deadline = None;
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[cfg(test)]
    pub(crate) fn is_set(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm the timer and return its deadline if it is due at `now`
    pub(crate) fn expire_before(&mut self, now: Instant) -> Option<Instant> {
        match self.deadline {
            Some(deadline) if deadline <= now => self.deadline.take(),
            _ => None,
        }
    }
}
