use std::{fmt, net::SocketAddr};

/// Description of the path under validation
///
/// `W` identifies the writer (socket, route, or plain handle) that challenges on this path must be
/// sent through. The context is owned by the [`PathValidator`](crate::PathValidator) while an
/// attempt is outstanding and returned to the [`ResultDelegate`](crate::ResultDelegate) once it
/// concludes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathValidationContext<W> {
    self_address: SocketAddr,
    peer_address: SocketAddr,
    effective_peer_address: SocketAddr,
    writer: W,
}

impl<W> PathValidationContext<W> {
    /// Describe a path whose packets are routed to `peer_address` unmodified
    pub fn new(self_address: SocketAddr, peer_address: SocketAddr, writer: W) -> Self {
        Self::with_effective_peer_address(self_address, peer_address, peer_address, writer)
    }

    /// Describe a path whose packets actually reach the peer at `effective_peer_address`
    ///
    /// The two peer addresses differ when a NAT or proxy rewrites the destination.
    pub fn with_effective_peer_address(
        self_address: SocketAddr,
        peer_address: SocketAddr,
        effective_peer_address: SocketAddr,
        writer: W,
    ) -> Self {
        Self {
            self_address,
            peer_address,
            effective_peer_address,
            writer,
        }
    }

    /// Local address challenges are sent from and responses must arrive on
    pub fn self_address(&self) -> SocketAddr {
        self.self_address
    }

    /// Nominal address of the peer
    pub fn peer_address(&self) -> SocketAddr {
        self.peer_address
    }

    /// Address traffic on this path is actually routed to
    pub fn effective_peer_address(&self) -> SocketAddr {
        self.effective_peer_address
    }

    /// Writer to send challenges through
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Mutable access to the writer
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Take back ownership of the writer
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W> fmt::Display for PathValidationContext<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " from {} to {}", self.self_address, self.peer_address)
    }
}

/// Why a path is being validated
///
/// Purely informational; the state machine treats every reason alike.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum PathValidationReason {
    /// No particular reason was given
    #[default]
    Unknown,
    /// Probing an additional path kept warm for fast failover
    MultiPort,
    /// Validating the peer's new address after it migrated
    ReversePathValidation,
    /// Migrating to the server's preferred address
    ServerPreferredAddressMigration,
    /// The local port changed, e.g. after a rebind
    PortMigration,
    /// Connection migration to a new network
    ConnectionMigration,
}

impl fmt::Display for PathValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::PathValidationReason::*;
        f.pad(match *self {
            Unknown => "unknown",
            MultiPort => "multi-port",
            ReversePathValidation => "reverse path validation",
            ServerPreferredAddressMigration => "server preferred address migration",
            PortMigration => "port migration",
            ConnectionMigration => "connection migration",
        })
    }
}
