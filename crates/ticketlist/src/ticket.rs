//! Ticket encoding and validation.
//!
//! A ticket is a 32-bit value made of two fields:
//!
//! ```text
//! [ 0 ][ locator (15 bits) ][ generation stamp (16 bits) ]
//!  31   30              16   15                        0
//! ```
//!
//! The locator is the slot index shifted up by [`LOCATOR_OFFSET`] so that a
//! zeroed or uninitialised value never names slot 0. The stamp comes from a
//! monotonically increasing counter seeded at [`GENERATION_SEED`]; zero is
//! never a valid stamp. A ticket only resolves while it is bit-for-bit equal
//! to the ticket its slot currently authorises, so copies kept after a delete
//! (or after the slot is reused) are rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ExhaustedField, InvalidTicket, ListError, Result};

/// Added to the slot index to form the locator field.
pub const LOCATOR_OFFSET: u32 = 0x1221;

/// First generation stamp handed out by a fresh counter.
pub const GENERATION_SEED: u32 = 0x0502;

const STAMP_BITS: u32 = 16;
const STAMP_MASK: u32 = 0xffff;
/// Width of the locator field as read back from a ticket.
const LOCATOR_FIELD_MASK: u32 = 0xffff;
/// Largest locator a minted ticket may carry (keeps bit 31 clear).
const LOCATOR_LIMIT: u32 = 0x7fff;

/// Number of slots whose locator fits the ticket format.
pub const MAX_CAPACITY: usize = (LOCATOR_LIMIT - LOCATOR_OFFSET + 1) as usize;

/// Opaque reference to one list in a [`ListStore`](crate::ListStore).
///
/// Tickets are plain values: copying one grants nothing beyond what the store
/// can verify when it is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(u32);

impl Ticket {
    /// Rebuild a ticket from a value previously obtained with [`Ticket::as_raw`].
    ///
    /// The value is not checked here; every store operation validates it.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Locator field, masked before any offset arithmetic.
    pub fn locator(self) -> u32 {
        (self.0 >> STAMP_BITS) & LOCATOR_FIELD_MASK
    }

    pub fn stamp(self) -> u16 {
        (self.0 & STAMP_MASK) as u16
    }

    /// Candidate slot index, or `None` when the locator sits below the offset.
    fn slot_index(self) -> Option<usize> {
        self.locator()
            .checked_sub(LOCATOR_OFFSET)
            .map(|index| index as usize)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Source of truth for which ticket each slot currently accepts.
pub(crate) trait TicketAuthority {
    fn capacity(&self) -> usize;

    /// Ticket authorised for `index`, or `None` when the slot is empty.
    fn authorized(&self, index: usize) -> Option<Ticket>;
}

/// Monotonic generation counter. Never wraps: once the stamp field is used up
/// every further mint fails.
#[derive(Debug)]
pub(crate) struct GenerationCounter {
    next: u32,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self {
            next: GENERATION_SEED,
        }
    }

    #[cfg(test)]
    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }

    /// Stamps left before exhaustion.
    pub fn remaining(&self) -> u32 {
        (STAMP_MASK + 1).saturating_sub(self.next)
    }

    fn take(&mut self) -> Result<u16> {
        if self.next == 0 || self.next > STAMP_MASK {
            return Err(ListError::AllocationExhausted {
                field: ExhaustedField::Generation,
            });
        }
        let stamp = self.next as u16;
        self.next += 1;
        Ok(stamp)
    }
}

/// Mints tickets for a table of fixed capacity.
#[derive(Debug)]
pub(crate) struct TicketCodec {
    capacity: usize,
    counter: GenerationCounter,
}

impl TicketCodec {
    pub fn new(capacity: usize) -> Self {
        Self::with_counter(capacity, GenerationCounter::new())
    }

    pub fn with_counter(capacity: usize, counter: GenerationCounter) -> Self {
        Self { capacity, counter }
    }

    pub fn remaining_stamps(&self) -> u32 {
        self.counter.remaining()
    }

    /// Build the ticket for `index`, consuming one generation stamp.
    ///
    /// The locator is checked before the counter is touched, so a failed mint
    /// leaves the counter where it was.
    pub fn mint(&mut self, index: usize) -> Result<Ticket> {
        if index >= self.capacity {
            return Err(ListError::InternalInconsistency(format!(
                "slot index {index} exceeds capacity {}",
                self.capacity
            )));
        }

        let locator = u32::try_from(index)
            .ok()
            .and_then(|index| index.checked_add(LOCATOR_OFFSET))
            .filter(|locator| *locator <= LOCATOR_LIMIT)
            .ok_or(ListError::AllocationExhausted {
                field: ExhaustedField::Locator,
            })?;

        let stamp = self.counter.take()?;
        Ok(Ticket((locator << STAMP_BITS) | u32::from(stamp)))
    }
}

/// Resolve `ticket` to the slot index it authorises.
pub(crate) fn resolve(ticket: Ticket, authority: &impl TicketAuthority) -> Result<usize> {
    let index = ticket
        .slot_index()
        .filter(|index| *index < authority.capacity())
        .ok_or(InvalidTicket::OutOfRange {
            locator: ticket.locator(),
        })?;

    let current = authority
        .authorized(index)
        .ok_or(InvalidTicket::EmptySlot { index })?;

    if current != ticket {
        return Err(InvalidTicket::Stale {
            index,
            current: current.stamp(),
            presented: ticket.stamp(),
        }
        .into());
    }

    if current.stamp() == 0 {
        return Err(ListError::InternalInconsistency(format!(
            "slot {index} authorises a ticket with generation stamp 0"
        )));
    }

    Ok(index)
}
