//! Fixed-capacity slot table.
//!
//! Each slot is either empty or owns exactly one node chain together with the
//! ticket currently authorised to reach it. The table never grows after
//! construction.

use crate::error::{ListError, Result};
use crate::ticket::{Ticket, TicketAuthority};

pub(crate) type Link<P> = Option<Box<Node<P>>>;

/// One link of a chain. Owned by its predecessor, or by the slot for the head.
pub(crate) struct Node<P> {
    pub payload: P,
    pub next: Link<P>,
}

impl<P> Node<P> {
    pub fn boxed(payload: P, next: Link<P>) -> Box<Self> {
        Box::new(Self { payload, next })
    }
}

/// An occupied slot: the chain head plus the one ticket allowed to reach it.
pub(crate) struct Slot<P> {
    pub head: Link<P>,
    ticket: Ticket,
}

impl<P> Slot<P> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Drop every node iteratively and return how many were released.
    fn clear_chain(&mut self) -> usize {
        let mut released = 0;
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
            released += 1;
        }
        released
    }
}

impl<P> Drop for Slot<P> {
    fn drop(&mut self) {
        // Box's own drop would recurse once per node.
        self.clear_chain();
    }
}

pub(crate) struct SlotTable<P> {
    slots: Vec<Option<Slot<P>>>,
    occupied: usize,
}

impl<P> SlotTable<P> {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity).map_err(|e| {
            ListError::AllocationFailure(format!("slot table of {capacity} entries ({e})"))
        })?;
        slots.resize_with(capacity, || None);
        Ok(Self { slots, occupied: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_full(&self) -> bool {
        self.occupied == self.slots.len()
    }

    /// First empty slot, scanning from index 0.
    pub fn allocate(&self) -> Result<usize> {
        self.slots
            .iter()
            .position(Option::is_none)
            .ok_or(ListError::CapacityExceeded {
                capacity: self.capacity(),
            })
    }

    /// Mark `index` occupied by a freshly minted `ticket`. An occupied or
    /// missing slot is left untouched.
    pub fn occupy(&mut self, index: usize, ticket: Ticket, head: Link<P>) -> Result<()> {
        let entry = self.slots.get_mut(index).ok_or_else(|| {
            ListError::InternalInconsistency(format!("slot {index} is outside the table"))
        })?;
        if entry.is_some() {
            return Err(ListError::InternalInconsistency(format!(
                "slot {index} already occupied"
            )));
        }
        *entry = Some(Slot { head, ticket });
        self.occupied += 1;
        Ok(())
    }

    /// Empty `index`, releasing its whole chain. Returns the number of nodes
    /// released, or `None` if the slot was already empty.
    pub fn release(&mut self, index: usize) -> Option<usize> {
        let mut slot = self.slots.get_mut(index)?.take()?;
        self.occupied -= 1;
        Some(slot.clear_chain())
    }

    pub fn slot(&self, index: usize) -> Option<&Slot<P>> {
        self.slots.get(index)?.as_ref()
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Slot<P>> {
        self.slots.get_mut(index)?.as_mut()
    }
}

impl<P> TicketAuthority for SlotTable<P> {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn authorized(&self, index: usize) -> Option<Ticket> {
        self.slot(index).map(Slot::ticket)
    }
}
