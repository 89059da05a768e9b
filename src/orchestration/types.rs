//! # Orchestration Types
//!
//! Core types shared across the AI-request orchestration components: request
//! identity, request kinds, lifecycle states, status records, and dispatch
//! options.
//!
//! Wire-facing types serialize as camelCase JSON to match the payloads the
//! browser client and the generation backend exchange over the bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::constants;

/// Opaque unique token identifying a single dispatch attempt.
///
/// A fresh id is generated per dispatch; retries are brand-new dispatches and
/// therefore carry brand-new ids. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a fresh request id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its string form (as carried in bus payloads)
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The generation capability a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestKind {
    /// AI route planning
    Route,
    /// AI opponent ("ghost runner") generation
    GhostRunner,
    /// Territory claim analysis
    TerritoryAnalysis,
}

impl RequestKind {
    /// Wire string used in event names and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::GhostRunner => "ghostRunner",
            Self::TerritoryAnalysis => "territoryAnalysis",
        }
    }

    /// Default completion timeout for this kind of request
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::Route => constants::DEFAULT_ROUTE_TIMEOUT,
            Self::GhostRunner => constants::DEFAULT_GHOST_RUNNER_TIMEOUT,
            Self::TerritoryAnalysis => constants::DEFAULT_TERRITORY_ANALYSIS_TIMEOUT,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "route" => Ok(Self::Route),
            "ghostRunner" => Ok(Self::GhostRunner),
            "territoryAnalysis" => Ok(Self::TerritoryAnalysis),
            _ => Err(format!("Invalid request kind: {s}")),
        }
    }
}

/// Lifecycle state of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestState {
    /// Dispatched to the bus, no backend signal yet
    Pending,
    /// Backend acknowledged and is reporting progress
    Processing,
    /// Terminal: backend delivered a result
    Success,
    /// Terminal: backend failure or timeout
    Error,
    /// Terminal: user-initiated cancellation
    Cancelled,
}

impl RequestState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Cancelled)
    }

    /// Check if this is an active state (request still racing for completion)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for RequestState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid request state: {s}")),
        }
    }
}

/// Full status record for an in-flight or recently-terminal request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatus {
    pub id: RequestId,
    pub kind: RequestKind,
    pub state: RequestState,
    /// Informational progress, 0-100, clamped but not verified monotonic
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    /// Human-readable failure message, set only in the error state
    pub error: Option<String>,
}

impl RequestStatus {
    /// Create a fresh pending status record
    pub fn pending(id: RequestId, kind: RequestKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            state: RequestState::Pending,
            progress: 0,
            created_at: now,
            last_updated_at: now,
            error: None,
        }
    }

    /// Create an already-successful status record (cache short-circuit path)
    pub fn cached_success(id: RequestId, kind: RequestKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            state: RequestState::Success,
            progress: constants::MAX_PROGRESS,
            created_at: now,
            last_updated_at: now,
            error: None,
        }
    }
}

/// Partial update applied to a status record through the registry
#[derive(Debug, Clone, Default)]
pub struct StatusPatch {
    pub state: Option<RequestState>,
    pub progress: Option<u8>,
    pub error: Option<String>,
}

impl StatusPatch {
    /// Patch moving a record into a terminal state
    pub fn terminal(state: RequestState, error: Option<String>) -> Self {
        debug_assert!(state.is_terminal());
        Self {
            state: Some(state),
            progress: None,
            error,
        }
    }

    /// Patch recording a backend progress ping
    pub fn progress(value: u8) -> Self {
        Self {
            state: Some(RequestState::Processing),
            progress: Some(value),
            error: None,
        }
    }
}

/// Per-dispatch options controlling timeout and caching behavior
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// How long the completion race may run before the timer wins
    pub timeout: Duration,
    /// Informational only; the orchestrator never retries on its own
    pub retries: u32,
    /// Whether to consult and populate the response cache
    pub cache_enabled: bool,
    /// Read-time freshness window for cached results
    pub cache_ttl: Duration,
}

impl RequestOptions {
    /// Default options for the given request kind
    pub fn for_kind(kind: RequestKind) -> Self {
        Self {
            timeout: kind.default_timeout(),
            retries: 0,
            cache_enabled: true,
            cache_ttl: constants::DEFAULT_CACHE_TTL,
        }
    }

    /// Builder-style timeout override
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style cache toggle
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Builder-style cache TTL override
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}
