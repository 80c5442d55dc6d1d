//! Path validation logic for QUIC-like transports
//!
//! quic-path contains a fully deterministic implementation of the PATH_CHALLENGE/PATH_RESPONSE
//! handshake used to prove that a candidate network path is live before a connection moves
//! traffic onto it. It contains no networking code and does not read timestamps from the
//! operating system unless given a [`StdClock`]. Transmission, timer wakeups and frame encoding
//! are left to the embedding connection.
//!
//! The most important type is [`PathValidator`], which owns at most one in-flight validation
//! attempt. Callers hand it a [`PathValidationContext`] describing the path under test and a
//! [`ResultDelegate`] that is consumed by exactly one success or failure callback. Challenges are
//! sent through a [`SendDelegate`], usually implemented by the connection itself.
//!
//! ```
//! use std::{
//!     net::SocketAddr,
//!     sync::Arc,
//!     time::{Duration, Instant},
//! };
//!
//! use quic_path::{
//!     PathFrameBuffer, PathValidationContext, PathValidationReason, PathValidator,
//!     PathValidatorConfig, ResultDelegate, SendDelegate, StdClock,
//! };
//!
//! struct Connection {
//!     challenges: Vec<PathFrameBuffer>,
//! }
//!
//! impl SendDelegate<u32> for Connection {
//!     fn send_path_challenge(
//!         &mut self,
//!         data: &PathFrameBuffer,
//!         _self_address: SocketAddr,
//!         _peer_address: SocketAddr,
//!         _effective_peer_address: SocketAddr,
//!         _writer: &u32,
//!     ) -> bool {
//!         self.challenges.push(*data);
//!         true
//!     }
//!
//!     fn retry_timeout(&self, _peer_address: SocketAddr, _writer: &u32) -> Duration {
//!         Duration::from_millis(300)
//!     }
//! }
//!
//! struct Migrate;
//!
//! impl ResultDelegate<u32> for Migrate {
//!     fn on_path_validation_success(
//!         self: Box<Self>,
//!         context: PathValidationContext<u32>,
//!         start_time: Instant,
//!     ) {
//!         println!("validated{context} after {:?}", start_time.elapsed());
//!     }
//!
//!     fn on_path_validation_failure(self: Box<Self>, context: PathValidationContext<u32>) {
//!         println!("failed to validate{context}");
//!     }
//! }
//!
//! let mut conn = Connection { challenges: Vec::new() };
//! let mut validator: PathValidator<u32> =
//!     PathValidator::new(Arc::new(PathValidatorConfig::default()), Arc::new(StdClock));
//! let local: SocketAddr = "[::1]:4433".parse().unwrap();
//! let peer: SocketAddr = "[::1]:5544".parse().unwrap();
//! validator.start_path_validation(
//!     PathValidationContext::new(local, peer, 0u32),
//!     Box::new(Migrate),
//!     PathValidationReason::ConnectionMigration,
//!     &mut conn,
//! );
//!
//! // The peer echoes the challenge back in a PATH_RESPONSE
//! validator.on_path_response(&conn.challenges[0], local);
//! assert!(!validator.has_pending_path_validation());
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(dead_code))]

use std::time::Duration;

mod challenge;
pub use crate::challenge::{PathFrameBuffer, PayloadLengthError, ProbingData};

mod clock;
pub use crate::clock::{Clock, StdClock};

mod config;
pub use crate::config::{ConfigError, PathValidatorConfig};

mod constant_time;

mod context;
pub use crate::context::{PathValidationContext, PathValidationReason};

mod stats;
pub use crate::stats::PathValidationStats;

mod timer;

mod validator;
pub use crate::validator::{PathValidator, ResultDelegate, SendDelegate};


//
// Useful constants
//

/// Size of the opaque payload carried by PATH_CHALLENGE and PATH_RESPONSE frames
pub const PATH_CHALLENGE_DATA_LEN: usize = 8;
/// Number of retransmitted challenges allowed by default before a validation is abandoned
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Upper bound accepted by [`PathValidatorConfig::max_retries`]
const MAX_RETRIES_LIMIT: u32 = 16;
/// Smallest retry interval the validator will schedule
const TIMER_GRANULARITY: Duration = Duration::from_millis(1);
/// Largest retry interval the validator will schedule
const MAX_RETRY_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
