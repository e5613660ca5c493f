//! Error taxonomy shared by the ticket codec, the slot table and the list engine.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Ticket field that ran out of representable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustedField {
    /// The slot index plus offset no longer fits the locator field.
    Locator,
    /// The generation counter has walked past the stamp field.
    Generation,
}

impl fmt::Display for ExhaustedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locator => f.write_str("locator"),
            Self::Generation => f.write_str("generation"),
        }
    }
}

/// Reason a presented ticket was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidTicket {
    #[error("ticket locator {locator:#06x} is outside the slot table")]
    OutOfRange { locator: u32 },

    #[error("there is no list at slot {index}")]
    EmptySlot { index: usize },

    #[error("ticket refers to an old list at slot {index} (current stamp {current:#06x}, presented {presented:#06x})")]
    Stale {
        index: usize,
        current: u16,
        presented: u16,
    },
}

/// End of the chain a removal was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalEnd {
    Head,
    Tail,
}

impl fmt::Display for RemovalEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => f.write_str("head"),
            Self::Tail => f.write_str("tail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("too many lists (maximum of {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("{field} space exhausted, no ticket can be minted")]
    AllocationExhausted { field: ExhaustedField },

    #[error("error allocating memory for {0}")]
    AllocationFailure(String),

    #[error("bad ticket: {0}")]
    InvalidHandle(InvalidTicket),

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("no {end} to remove, the list is empty")]
    EmptyListOperation { end: RemovalEnd },
}

impl ListError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::AllocationExhausted { .. } => ErrorKind::AllocationExhausted,
            Self::AllocationFailure(_) => ErrorKind::AllocationFailure,
            Self::InvalidHandle(_) => ErrorKind::InvalidHandle,
            Self::InternalInconsistency(_) => ErrorKind::InternalInconsistency,
            Self::EmptyListOperation { .. } => ErrorKind::EmptyListOperation,
        }
    }
}

impl From<InvalidTicket> for ListError {
    fn from(reason: InvalidTicket) -> Self {
        Self::InvalidHandle(reason)
    }
}

/// Field-less discriminant of [`ListError`], for callers that branch on the
/// category or need a stable numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CapacityExceeded,
    AllocationExhausted,
    AllocationFailure,
    InvalidHandle,
    InternalInconsistency,
    EmptyListOperation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CapacityExceeded => "capacity_exceeded",
            Self::AllocationExhausted => "allocation_exhausted",
            Self::AllocationFailure => "allocation_failure",
            Self::InvalidHandle => "invalid_handle",
            Self::InternalInconsistency => "internal_inconsistency",
            Self::EmptyListOperation => "empty_list_operation",
        }
    }

    /// Negative return code, numbered as the C-style `LE_*` constants.
    pub fn code(&self) -> i32 {
        match self {
            Self::CapacityExceeded => -1,
            Self::AllocationFailure => -2,
            Self::InternalInconsistency => -3,
            Self::InvalidHandle => -4,
            Self::EmptyListOperation => -5,
            Self::AllocationExhausted => -6,
        }
    }

    /// The table itself is corrupt; callers should stop using the store.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InternalInconsistency)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, ListError>;
