use std::{
    cell::RefCell,
    io::{self, Write},
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    rc::Rc,
    str,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

use crate::{
    Clock, PathFrameBuffer, PathValidationContext, PathValidator, PathValidatorConfig,
    ResultDelegate, SendDelegate,
};

/// Identifies the socket a test path is bound to
pub(super) type WriterId = u32;

pub(super) const RETRY_TIMEOUT: Duration = Duration::from_millis(300);

pub(super) fn self_addr() -> SocketAddr {
    SocketAddr::new(Ipv6Addr::LOCALHOST.into(), 44433)
}

pub(super) fn other_self_addr() -> SocketAddr {
    SocketAddr::new(Ipv6Addr::LOCALHOST.into(), 44434)
}

pub(super) fn peer_addr() -> SocketAddr {
    SocketAddr::new(Ipv4Addr::new(192, 0, 2, 1).into(), 4433)
}

pub(super) fn effective_peer_addr() -> SocketAddr {
    SocketAddr::new(Ipv4Addr::new(198, 51, 100, 9).into(), 9443)
}

pub(super) fn context(writer: WriterId) -> PathValidationContext<WriterId> {
    PathValidationContext::with_effective_peer_address(
        self_addr(),
        peer_addr(),
        effective_peer_addr(),
        writer,
    )
}

/// Clock that only moves when told to
#[derive(Debug)]
pub(super) struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Instant::now()),
        })
    }

    pub(super) fn advance(&self, by: Duration) -> Instant {
        let mut now = self.now.lock().unwrap();
        *now += by;
        *now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

pub(super) fn validator(clock: &Arc<ManualClock>) -> PathValidator<WriterId> {
    validator_with_config(clock, PathValidatorConfig::default(), 0)
}

pub(super) fn validator_with_config(
    clock: &Arc<ManualClock>,
    config: PathValidatorConfig,
    seed: u64,
) -> PathValidator<WriterId> {
    PathValidator::with_rng(
        Arc::new(config),
        clock.clone(),
        Box::new(StdRng::seed_from_u64(seed)),
    )
}

/// A challenge as handed to the send delegate
#[derive(Debug, Clone, Copy)]
pub(super) struct SentChallenge {
    pub(super) data: PathFrameBuffer,
    pub(super) self_address: SocketAddr,
    pub(super) peer_address: SocketAddr,
    pub(super) effective_peer_address: SocketAddr,
    pub(super) writer: WriterId,
}

/// Send delegate that records every challenge
pub(super) struct TestSender {
    pub(super) sent: Vec<SentChallenge>,
    pub(super) retry_timeout: Duration,
    /// Whether to let validation continue after the next send
    pub(super) allow: bool,
}

impl TestSender {
    pub(super) fn new() -> Self {
        Self {
            sent: Vec::new(),
            retry_timeout: RETRY_TIMEOUT,
            allow: true,
        }
    }

    pub(super) fn payloads(&self) -> Vec<PathFrameBuffer> {
        self.sent.iter().map(|c| c.data).collect()
    }
}

impl SendDelegate<WriterId> for TestSender {
    fn send_path_challenge(
        &mut self,
        data: &PathFrameBuffer,
        self_address: SocketAddr,
        peer_address: SocketAddr,
        effective_peer_address: SocketAddr,
        writer: &WriterId,
    ) -> bool {
        self.sent.push(SentChallenge {
            data: *data,
            self_address,
            peer_address,
            effective_peer_address,
            writer: *writer,
        });
        self.allow
    }

    fn retry_timeout(&self, _peer_address: SocketAddr, _writer: &WriterId) -> Duration {
        self.retry_timeout
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Outcome {
    Success {
        id: usize,
        context: PathValidationContext<WriterId>,
        start_time: Instant,
    },
    Failure {
        id: usize,
        context: PathValidationContext<WriterId>,
    },
}

impl Outcome {
    pub(super) fn id(&self) -> usize {
        match *self {
            Self::Success { id, .. } | Self::Failure { id, .. } => id,
        }
    }
}

pub(super) type Outcomes = Rc<RefCell<Vec<Outcome>>>;

/// Result delegate that appends its outcome to a shared log
pub(super) struct Recorder {
    id: usize,
    outcomes: Outcomes,
}

impl Recorder {
    pub(super) fn boxed(id: usize, outcomes: &Outcomes) -> Box<Self> {
        Box::new(Self {
            id,
            outcomes: outcomes.clone(),
        })
    }
}

impl ResultDelegate<WriterId> for Recorder {
    fn on_path_validation_success(
        self: Box<Self>,
        context: PathValidationContext<WriterId>,
        start_time: Instant,
    ) {
        self.outcomes.borrow_mut().push(Outcome::Success {
            id: self.id,
            context,
            start_time,
        });
    }

    fn on_path_validation_failure(self: Box<Self>, context: PathValidationContext<WriterId>) {
        self.outcomes.borrow_mut().push(Outcome::Failure {
            id: self.id,
            context,
        });
    }
}

pub(super) fn subscribe() -> tracing::subscriber::DefaultGuard {
    let sub = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(|| TestWriter)
        .finish();
    tracing::subscriber::set_default(sub)
}

struct TestWriter;

impl Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        print!(
            "{}",
            str::from_utf8(buf).expect("tried to log invalid UTF-8")
        );
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
