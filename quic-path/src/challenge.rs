use std::{fmt, time::Instant};

use rand::RngCore;
use thiserror::Error;

use crate::{constant_time, PATH_CHALLENGE_DATA_LEN};

/// Opaque payload of a PATH_CHALLENGE frame, echoed back verbatim in PATH_RESPONSE
///
/// Equality is evaluated without short-circuiting so that matching a response does not leak how
/// many leading bytes of a pending challenge an attacker guessed correctly.
#[derive(Copy, Clone, Default)]
pub struct PathFrameBuffer([u8; PATH_CHALLENGE_DATA_LEN]);

impl PathFrameBuffer {
    /// Draw a fresh payload from `rng`
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut data = [0; PATH_CHALLENGE_DATA_LEN];
        rng.fill_bytes(&mut data);
        Self(data)
    }

    /// The raw payload bytes
    pub fn as_bytes(&self) -> &[u8; PATH_CHALLENGE_DATA_LEN] {
        &self.0
    }
}

impl PartialEq for PathFrameBuffer {
    fn eq(&self, other: &Self) -> bool {
        constant_time::eq(&self.0, &other.0)
    }
}

impl Eq for PathFrameBuffer {}

impl From<[u8; PATH_CHALLENGE_DATA_LEN]> for PathFrameBuffer {
    fn from(data: [u8; PATH_CHALLENGE_DATA_LEN]) -> Self {
        Self(data)
    }
}

impl TryFrom<&[u8]> for PathFrameBuffer {
    type Error = PayloadLengthError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        let data = <[u8; PATH_CHALLENGE_DATA_LEN]>::try_from(data)
            .map_err(|_| PayloadLengthError { actual: data.len() })?;
        Ok(Self(data))
    }
}

impl AsRef<[u8]> for PathFrameBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PathFrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for PathFrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A received payload did not have the width of a PATH_CHALLENGE payload
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("expected {} byte path challenge payload, got {actual}", PATH_CHALLENGE_DATA_LEN)]
pub struct PayloadLengthError {
    /// Length of the rejected payload
    pub actual: usize,
}

/// A challenge issued during the current validation attempt
#[derive(Debug, Copy, Clone)]
pub struct ProbingData {
    frame_buffer: PathFrameBuffer,
    send_time: Instant,
}

impl ProbingData {
    pub(crate) fn new(frame_buffer: PathFrameBuffer, send_time: Instant) -> Self {
        Self {
            frame_buffer,
            send_time,
        }
    }

    /// Payload carried by the challenge
    pub fn frame_buffer(&self) -> &PathFrameBuffer {
        &self.frame_buffer
    }

    /// When the challenge payload was generated
    pub fn send_time(&self) -> Instant {
        self.send_time
    }
}
