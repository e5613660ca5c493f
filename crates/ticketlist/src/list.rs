//! List engine: the public operations over ticket-addressed chains.
//!
//! Every operation resolves its ticket against the slot table first. Errors
//! from resolution come back unchanged, and once a ticket has resolved a
//! mutation either completes or leaves the chain exactly as it was.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::StoreConfig;
use crate::errbuf::ErrorBuffer;
use crate::error::{ListError, RemovalEnd, Result};
use crate::table::{Link, Node, Slot, SlotTable};
use crate::ticket::{self, Ticket, TicketCodec};

/// Registry of independent singly-linked lists, each reachable only through
/// the [`Ticket`] minted when it was created.
///
/// The store does not interpret payloads; it only moves them in and out.
///
/// Read-only calls take `&self` and may run from several threads at once when
/// `P: Sync`; their failures still land in the last-error buffer, which sits
/// behind its own lock. Mutating calls need `&mut self`, so callers that mutate
/// from several threads should go through [`SharedListStore`].
///
/// [`SharedListStore`]: crate::SharedListStore
pub struct ListStore<P> {
    table: SlotTable<P>,
    codec: TicketCodec,
    errors: Mutex<ErrorBuffer>,
}

impl<P> ListStore<P> {
    /// Create a store with room for `capacity` simultaneous lists.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            table: SlotTable::with_capacity(capacity)?,
            codec: TicketCodec::new(capacity),
            errors: Mutex::new(ErrorBuffer::new()),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::new(config.capacity)
    }

    #[cfg(test)]
    pub(crate) fn with_codec(capacity: usize, codec: TicketCodec) -> Result<Self> {
        Ok(Self {
            codec,
            ..Self::new(capacity)?
        })
    }

    /// Install a caller-owned error buffer, returning the store.
    pub fn with_error_buffer(mut self, buffer: ErrorBuffer) -> Self {
        self.errors = Mutex::new(buffer);
        self
    }

    /// Hand the error buffer back to the caller, leaving an empty one behind.
    pub fn take_error_buffer(&mut self) -> ErrorBuffer {
        let errors = self.errors.get_mut().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(errors)
    }

    /// Copy of the most recent failure description.
    pub fn last_error(&self) -> ErrorBuffer {
        self.errors().clone()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Number of lists currently alive.
    pub fn live_lists(&self) -> usize {
        self.table.len()
    }

    pub fn is_full(&self) -> bool {
        self.table.is_full()
    }

    /// Generation stamps left before `create` starts failing with
    /// `AllocationExhausted`.
    pub fn remaining_generations(&self) -> u32 {
        self.codec.remaining_stamps()
    }

    /// Whether `ticket` currently resolves. Never touches the error buffer.
    pub fn contains(&self, ticket: Ticket) -> bool {
        ticket::resolve(ticket, &self.table).is_ok()
    }

    /// Start a new list whose only node holds `payload`.
    pub fn create(&mut self, payload: P) -> Result<Ticket> {
        let result = self.try_create(payload);
        self.record("create", result)
    }

    fn try_create(&mut self, payload: P) -> Result<Ticket> {
        let index = self.table.allocate()?;
        let ticket = self.codec.mint(index)?;
        self.table
            .occupy(index, ticket, Some(Node::boxed(payload, None)))?;
        tracing::debug!(slot = index, %ticket, "List created");
        Ok(ticket)
    }

    /// Destroy the list and every node it owns. The ticket never resolves again.
    pub fn delete(&mut self, ticket: Ticket) -> Result<()> {
        let result = self.try_delete(ticket);
        self.record("delete", result)
    }

    fn try_delete(&mut self, ticket: Ticket) -> Result<()> {
        let index = self.resolve(ticket)?;
        let released = self.table.release(index).ok_or_else(|| {
            ListError::InternalInconsistency(format!("slot {index} emptied during delete"))
        })?;
        tracing::debug!(slot = index, %ticket, released, "List deleted");
        Ok(())
    }

    /// Add `payload` after the current tail. Walks the whole chain.
    pub fn append(&mut self, ticket: Ticket, payload: P) -> Result<()> {
        let result = self
            .resolve_slot_mut(ticket)
            .map(|slot| *tail_link(&mut slot.head) = Some(Node::boxed(payload, None)));
        self.record("append", result)
    }

    /// Make `payload` the new head.
    pub fn insert_head(&mut self, ticket: Ticket, payload: P) -> Result<()> {
        let result = self.resolve_slot_mut(ticket).map(|slot| {
            let next = slot.head.take();
            slot.head = Some(Node::boxed(payload, next));
        });
        self.record("insert_head", result)
    }

    /// Detach the head node and return its payload.
    pub fn remove_head(&mut self, ticket: Ticket) -> Result<P> {
        let result = self.resolve_slot_mut(ticket).and_then(|slot| {
            let head = slot.head.take().ok_or(ListError::EmptyListOperation {
                end: RemovalEnd::Head,
            })?;
            let Node { payload, next } = *head;
            slot.head = next;
            Ok(payload)
        });
        self.record("remove_head", result)
    }

    /// Detach the tail node and return its payload. Walks the whole chain.
    pub fn remove_tail(&mut self, ticket: Ticket) -> Result<P> {
        let result = self.resolve_slot_mut(ticket).and_then(|slot| {
            let len = chain_len(&slot.head);
            let last = link_at(&mut slot.head, len.saturating_sub(1));
            let tail = last.take().ok_or(ListError::EmptyListOperation {
                end: RemovalEnd::Tail,
            })?;
            Ok(tail.payload)
        });
        self.record("remove_tail", result)
    }

    /// Iterate the payloads from head to tail without modifying the chain.
    ///
    /// The iterator is `Clone`, so a traversal can be restarted from the head.
    pub fn traverse(&self, ticket: Ticket) -> Result<Traverse<'_, P>> {
        let result = self.resolve_slot(ticket).map(|slot| Traverse {
            next: slot.head.as_deref(),
        });
        self.record("traverse", result)
    }

    /// Number of nodes in the list.
    pub fn len(&self, ticket: Ticket) -> Result<usize> {
        let result = self.resolve_slot(ticket).map(|slot| chain_len(&slot.head));
        self.record("len", result)
    }

    pub fn is_empty(&self, ticket: Ticket) -> Result<bool> {
        let result = self.resolve_slot(ticket).map(|slot| slot.head.is_none());
        self.record("is_empty", result)
    }

    fn resolve(&self, ticket: Ticket) -> Result<usize> {
        ticket::resolve(ticket, &self.table).inspect_err(|e| {
            if e.kind().is_fatal() {
                tracing::error!(%ticket, error = %e, "Slot table inconsistent");
            } else {
                tracing::warn!(%ticket, error = %e, "Rejected ticket");
            }
        })
    }

    fn resolve_slot(&self, ticket: Ticket) -> Result<&Slot<P>> {
        let index = self.resolve(ticket)?;
        self.table.slot(index).ok_or_else(|| vanished(index))
    }

    fn resolve_slot_mut(&mut self, ticket: Ticket) -> Result<&mut Slot<P>> {
        let index = self.resolve(ticket)?;
        self.table.slot_mut(index).ok_or_else(|| vanished(index))
    }

    fn errors(&self) -> MutexGuard<'_, ErrorBuffer> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(ref e) = result {
            self.errors().record(operation, e);
        }
        result
    }
}

fn vanished(index: usize) -> ListError {
    ListError::InternalInconsistency(format!("slot {index} resolved but holds no list"))
}

fn chain_len<P>(head: &Link<P>) -> usize {
    let mut len = 0;
    let mut cursor = head.as_deref();
    while let Some(node) = cursor {
        len += 1;
        cursor = node.next.as_deref();
    }
    len
}

/// The empty link after the last node (the head link for an empty chain).
fn tail_link<P>(mut link: &mut Link<P>) -> &mut Link<P> {
    while let Some(node) = link {
        link = &mut node.next;
    }
    link
}

/// The link reached after following `steps` nodes, stopping early at the end.
fn link_at<P>(mut link: &mut Link<P>, steps: usize) -> &mut Link<P> {
    for _ in 0..steps {
        match link {
            Some(node) => link = &mut node.next,
            None => break,
        }
    }
    link
}

/// Borrowing iterator over a list's payloads, head first.
pub struct Traverse<'a, P> {
    next: Option<&'a Node<P>>,
}

impl<'a, P> Iterator for Traverse<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.payload
        })
    }
}

impl<P> Clone for Traverse<'_, P> {
    fn clone(&self) -> Self {
        Self { next: self.next }
    }
}

impl<P> std::iter::FusedIterator for Traverse<'_, P> {}
