use std::{
    fmt,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use rand::{rngs::StdRng, RngCore, SeedableRng};
use tracing::{debug, error, trace};

use crate::{
    challenge::{PathFrameBuffer, ProbingData},
    clock::Clock,
    config::PathValidatorConfig,
    context::{PathValidationContext, PathValidationReason},
    stats::PathValidationStats,
    timer::RetryTimer,
    MAX_RETRY_TIMEOUT, TIMER_GRANULARITY,
};

/// Transmits path challenges on behalf of a [`PathValidator`]
///
/// Usually implemented by the connection that owns the validator, which is why it is passed to
/// each operation that may transmit rather than stored.
pub trait SendDelegate<W> {
    /// Send a PATH_CHALLENGE frame carrying `data` on the described path
    ///
    /// Returns `false` if validation should be abandoned, e.g. because the anti-amplification
    /// limit has been reached or the path is gone. The attempt then fails immediately.
    fn send_path_challenge(
        &mut self,
        data: &PathFrameBuffer,
        self_address: SocketAddr,
        peer_address: SocketAddr,
        effective_peer_address: SocketAddr,
        writer: &W,
    ) -> bool;

    /// How long to wait for a PATH_RESPONSE before sending another challenge
    fn retry_timeout(&self, peer_address: SocketAddr, writer: &W) -> Duration;
}

/// Learns the outcome of a single validation attempt
///
/// Exactly one of the two methods is called, once, for every attempt that is not superseded by a
/// later [`PathValidator::start_path_validation`]. Both consume the delegate.
pub trait ResultDelegate<W> {
    /// A PATH_RESPONSE matched one of the challenges sent on the path
    ///
    /// `start_time` is when the matched challenge was generated, allowing the caller to take an
    /// RTT sample for the path.
    fn on_path_validation_success(
        self: Box<Self>,
        context: PathValidationContext<W>,
        start_time: Instant,
    );

    /// The attempt was cancelled, declined by the send delegate, or ran out of retries
    fn on_path_validation_failure(self: Box<Self>, context: PathValidationContext<W>);
}

/// An attempt in progress
struct Validation<W> {
    context: PathValidationContext<W>,
    result_delegate: Box<dyn ResultDelegate<W>>,
    reason: PathValidationReason,
}

/// Drives PATH_CHALLENGE/PATH_RESPONSE exchanges for one connection
///
/// Holds at most one validation attempt at a time. An attempt ends exactly once: when a response
/// matches, when the retry budget is exhausted, or when it is cancelled. All timing is driven
/// externally through [`PathValidator::poll_timeout`] and [`PathValidator::handle_timeout`].
pub struct PathValidator<W> {
    config: Arc<PathValidatorConfig>,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
    validation: Option<Validation<W>>,
    /// Challenges issued during the current attempt, in the order they were generated
    probing_data: Vec<ProbingData>,
    retry_timer: RetryTimer,
    retry_count: u32,
    stats: PathValidationStats,
}

impl<W> PathValidator<W> {
    /// Create a validator drawing challenge payloads from an entropy-seeded RNG
    pub fn new(config: Arc<PathValidatorConfig>, clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(config, clock, Box::new(StdRng::from_entropy()))
    }

    /// Create a validator drawing challenge payloads from `rng`
    ///
    /// Challenge payloads must be unpredictable to off-path attackers; a seeded RNG is only
    /// appropriate for tests and simulations.
    pub fn with_rng(
        config: Arc<PathValidatorConfig>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            probing_data: Vec::with_capacity(config.max_challenges()),
            config,
            clock,
            rng,
            validation: None,
            retry_timer: RetryTimer::default(),
            retry_count: 0,
            stats: PathValidationStats::default(),
        }
    }

    /// Begin validating the path described by `context`
    ///
    /// Sends the first challenge through `send_delegate` and arms the retry timer. If a validation
    /// is already in progress it is discarded without notifying its delegate; doing so is a bug in
    /// the caller and is logged as such.
    pub fn start_path_validation<S: SendDelegate<W> + ?Sized>(
        &mut self,
        context: PathValidationContext<W>,
        result_delegate: Box<dyn ResultDelegate<W>>,
        reason: PathValidationReason,
        send_delegate: &mut S,
    ) {
        debug!(path = %context, %reason, "start validating path");
        if let Some(ongoing) = &self.validation {
            error!(path = %ongoing.context, "there is an on-going validation on path");
            self.stats.superseded += 1;
        }
        self.reset_path_validation();

        self.validation = Some(Validation {
            context,
            result_delegate,
            reason,
        });
        self.stats.started += 1;
        self.send_path_challenge_and_set_alarm(send_delegate);
    }

    /// Abandon the current validation, reporting failure to its delegate
    ///
    /// Does nothing if no validation is in progress.
    pub fn cancel_path_validation(&mut self) {
        let Some(Validation {
            context,
            result_delegate,
            reason,
        }) = self.validation.take()
        else {
            return;
        };
        debug!(path = %context, %reason, "cancel validation on path");
        self.stats.failed += 1;
        result_delegate.on_path_validation_failure(context);
        self.reset_path_validation();
    }

    /// Process the payload of a PATH_RESPONSE frame received on `self_address`
    ///
    /// Completes the validation if `data` matches any challenge sent during the current attempt.
    /// Responses arriving on a different local address, or matching nothing, are ignored.
    pub fn on_path_response(&mut self, data: &PathFrameBuffer, self_address: SocketAddr) {
        let Some(validation) = &self.validation else {
            return;
        };

        trace!(%self_address, "match PATH_RESPONSE");
        if self_address != validation.context.self_address() {
            debug!(
                expected = %validation.context.self_address(),
                %self_address,
                "PATH_RESPONSE received on unexpected address"
            );
            self.stats.responses_wrong_address += 1;
            return;
        }

        // At most `max_retries + 1` entries
        let Some(send_time) = self
            .probing_data
            .iter()
            .find(|probe| probe.frame_buffer() == data)
            .map(ProbingData::send_time)
        else {
            trace!(%data, "PATH_RESPONSE doesn't match the probing data");
            self.stats.responses_unmatched += 1;
            return;
        };

        if let Some(Validation {
            context,
            result_delegate,
            reason,
        }) = self.validation.take()
        {
            debug!(path = %context, %reason, "path validated");
            self.stats.succeeded += 1;
            result_delegate.on_path_validation_success(context, send_time);
        }
        self.reset_path_validation();
    }

    /// Generate a fresh challenge payload and record it as pending
    ///
    /// The caller is responsible for embedding the payload into an outgoing PATH_CHALLENGE frame.
    /// Payloads generated while no validation is pending are not recorded, since no response can
    /// complete an attempt that does not exist.
    pub fn generate_path_challenge_payload(&mut self) -> PathFrameBuffer {
        let frame_buffer = PathFrameBuffer::random(&mut *self.rng);
        if self.validation.is_some() {
            self.probing_data
                .push(ProbingData::new(frame_buffer, self.clock.now()));
        } else {
            trace!(%frame_buffer, "challenge payload generated without pending path validation");
        }
        frame_buffer
    }

    /// The time at which [`handle_timeout`](Self::handle_timeout) should next be called
    pub fn poll_timeout(&self) -> Option<Instant> {
        self.retry_timer.deadline()
    }

    /// Process the retry timer if it is due at `now`
    pub fn handle_timeout<S: SendDelegate<W> + ?Sized>(
        &mut self,
        now: Instant,
        send_delegate: &mut S,
    ) {
        if self.retry_timer.expire_before(now).is_some() {
            self.on_retry_timeout(send_delegate);
        }
    }

    /// React to expiry of the retry timer
    ///
    /// Sends another challenge, or fails the validation once the retry budget is spent. For event
    /// loops that run their own alarm instead of [`poll_timeout`](Self::poll_timeout); a call
    /// while no validation is pending is ignored.
    pub fn on_retry_timeout<S: SendDelegate<W> + ?Sized>(&mut self, send_delegate: &mut S) {
        let Some(validation) = &self.validation else {
            trace!("retry timer fired without pending path validation");
            return;
        };
        self.retry_timer.stop();

        self.retry_count += 1;
        if self.retry_count > self.config.max_retries {
            debug!(
                path = %validation.context,
                retries = self.config.max_retries,
                "path validation retries exhausted"
            );
            self.cancel_path_validation();
            return;
        }

        debug!(
            path = %validation.context,
            retry = self.retry_count,
            "send another PATH_CHALLENGE on path"
        );
        self.stats.retries += 1;
        self.send_path_challenge_and_set_alarm(send_delegate);
    }

    /// Whether a validation attempt is in progress
    pub fn has_pending_path_validation(&self) -> bool {
        self.validation.is_some()
    }

    /// The path currently being validated
    pub fn context(&self) -> Option<&PathValidationContext<W>> {
        self.validation.as_ref().map(|v| &v.context)
    }

    /// Why the current validation was started
    pub fn reason(&self) -> Option<PathValidationReason> {
        self.validation.as_ref().map(|v| v.reason)
    }

    /// Whether the path currently being validated routes to `effective_peer_address`
    pub fn is_validating_peer_address(&self, effective_peer_address: SocketAddr) -> bool {
        self.validation
            .as_ref()
            .is_some_and(|v| v.context.effective_peer_address() == effective_peer_address)
    }

    /// Challenges issued during the current attempt, oldest first
    pub fn pending_challenges(&self) -> &[ProbingData] {
        &self.probing_data
    }

    /// Number of retransmitted challenges in the current attempt
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Statistics accumulated over the lifetime of this validator
    pub fn stats(&self) -> PathValidationStats {
        self.stats
    }

    fn send_path_challenge_and_set_alarm<S: SendDelegate<W> + ?Sized>(
        &mut self,
        send_delegate: &mut S,
    ) {
        let data = self.generate_path_challenge_payload();
        let Some(validation) = &self.validation else {
            return;
        };
        let context = &validation.context;

        self.stats.challenges_sent += 1;
        let should_continue = send_delegate.send_path_challenge(
            &data,
            context.self_address(),
            context.peer_address(),
            context.effective_peer_address(),
            context.writer(),
        );
        if !should_continue {
            // The delegate doesn't want to continue the path validation.
            debug!(path = %context, "send delegate declined PATH_CHALLENGE");
            self.cancel_path_validation();
            return;
        }

        let timeout = send_delegate
            .retry_timeout(context.peer_address(), context.writer())
            .clamp(TIMER_GRANULARITY, MAX_RETRY_TIMEOUT);
        let Some(deadline) = self.clock.now().checked_add(timeout) else {
            debug!(path = %context, ?timeout, "retry deadline out of range");
            self.cancel_path_validation();
            return;
        };
        trace!(?timeout, "arming path validation retry timer");
        self.retry_timer.set(deadline);
    }

    /// Return to idle, dropping all per-attempt state
    fn reset_path_validation(&mut self) {
        self.validation = None;
        self.retry_timer.stop();
        self.retry_count = 0;
        self.probing_data.clear();
    }
}

impl<W: fmt::Debug> fmt::Debug for PathValidator<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathValidator")
            .field("context", &self.context())
            .field("reason", &self.reason())
            .field("pending_challenges", &self.probing_data.len())
            .field("retry_count", &self.retry_count)
            .field("retry_deadline", &self.retry_timer.deadline())
            .finish_non_exhaustive()
    }
}
