/// Statistics about path validation attempts made by a [`PathValidator`](crate::PathValidator)
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct PathValidationStats {
    /// Validation attempts started
    pub started: u64,
    /// Attempts that ended with a matching PATH_RESPONSE
    pub succeeded: u64,
    /// Attempts that ended through retry exhaustion or cancellation
    pub failed: u64,
    /// Attempts discarded without a callback because another one was started over them
    pub superseded: u64,
    /// PATH_CHALLENGE payloads handed to the send delegate
    pub challenges_sent: u64,
    /// Challenges retransmitted after the retry timer expired
    pub retries: u64,
    /// PATH_RESPONSE frames ignored because they arrived on the wrong local address
    pub responses_wrong_address: u64,
    /// PATH_RESPONSE frames ignored because they matched no pending challenge
    pub responses_unmatched: u64,
}
