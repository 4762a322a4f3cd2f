//! Error taxonomy for sequencing, remote optimization and sessions.

use std::fmt;
use std::io;

/// Failure modes of an optimize request.
///
/// `RemoteUnavailable` and `RemoteResponseInvalid` are recovered by the local
/// heuristic and only ever reach the caller as a [`FallbackReason`].
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeError {
    /// Network failure, timeout or non-2xx status.
    RemoteUnavailable(String),
    /// Malformed body, missing fields, or a waypoint mapping that does not cover every stop.
    RemoteResponseInvalid(String),
    /// Fewer than two stops were handed to the optimizer.
    InsufficientStops { count: usize },
    /// The routing oracle reported that no feasible route exists.
    NoRouteFound(String),
}

impl OptimizeError {
    /// Whether the local heuristic may stand in for the remote result.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OptimizeError::RemoteUnavailable(_) | OptimizeError::RemoteResponseInvalid(_)
        )
    }
}

impl fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizeError::RemoteUnavailable(msg) => write!(f, "remote optimizer unavailable: {}", msg),
            OptimizeError::RemoteResponseInvalid(msg) => {
                write!(f, "remote optimizer response invalid: {}", msg)
            }
            OptimizeError::InsufficientStops { count } => {
                write!(f, "at least 2 stops are needed to optimize, got {}", count)
            }
            OptimizeError::NoRouteFound(msg) => write!(f, "no route found: {}", msg),
        }
    }
}

impl std::error::Error for OptimizeError {}

impl From<reqwest::Error> for OptimizeError {
    fn from(err: reqwest::Error) -> Self {
        OptimizeError::RemoteUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for OptimizeError {
    fn from(err: serde_json::Error) -> Self {
        OptimizeError::RemoteResponseInvalid(err.to_string())
    }
}

/// Why an optimization result came from the local heuristic instead of the remote oracle.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// No remote optimizer was configured.
    NoOptimizer,
    /// After deduplication fewer than two distinct coordinates remained.
    TooFewDistinctPoints,
    /// The remote attempt failed in a recoverable way.
    Remote(OptimizeError),
    /// The remote order was identical to the input order.
    Unchanged,
    /// The remote optimizer only plans round trips and the route is one-way.
    OneWayUnsupported,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoOptimizer => write!(f, "no remote optimizer configured"),
            FallbackReason::TooFewDistinctPoints => write!(f, "fewer than 2 distinct coordinates"),
            FallbackReason::Remote(err) => write!(f, "{}", err),
            FallbackReason::Unchanged => write!(f, "remote optimizer returned the input order"),
            FallbackReason::OneWayUnsupported => {
                write!(f, "remote optimizer cannot plan a one-way trip without a fixed destination")
            }
        }
    }
}

/// Coordinate outside lat [-90, 90] / lng [-180, 180], or not finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid coordinate ({}, {})", self.lat, self.lng)
    }
}

impl std::error::Error for InvalidCoordinate {}

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "route store I/O error: {}", err),
            StoreError::Serde(err) => write!(f, "route store encoding error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err)
    }
}

#[derive(Debug)]
pub enum SessionError {
    /// The geocoder returned nothing for this address.
    AddressNotFound(String),
    UnknownStop(String),
    Optimize(OptimizeError),
    Store(StoreError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AddressNotFound(address) => write!(f, "address not found: {}", address),
            SessionError::UnknownStop(id) => write!(f, "unknown stop: {}", id),
            SessionError::Optimize(err) => write!(f, "{}", err),
            SessionError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<OptimizeError> for SessionError {
    fn from(err: OptimizeError) -> Self {
        SessionError::Optimize(err)
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        SessionError::Store(err)
    }
}
