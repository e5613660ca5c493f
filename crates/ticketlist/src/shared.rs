//! Mutex-guarded store for callers on several threads.
//!
//! Slot allocation and the generation counter are read-modify-write state;
//! serialising every operation behind one lock keeps tickets from aliasing
//! across concurrent creates.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::StoreConfig;
use crate::errbuf::ErrorBuffer;
use crate::error::Result;
use crate::list::ListStore;
use crate::ticket::Ticket;

pub struct SharedListStore<P> {
    inner: Mutex<ListStore<P>>,
}

impl<P> SharedListStore<P> {
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self::from_store(ListStore::new(capacity)?))
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self::from_store(ListStore::from_config(config)?))
    }

    pub fn from_store(store: ListStore<P>) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    pub fn into_inner(self) -> ListStore<P> {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // A panicking payload drop can poison the lock, but every mutation
    // finishes its chain surgery before payloads are dropped, so the store
    // behind a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, ListStore<P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, payload: P) -> Result<Ticket> {
        self.lock().create(payload)
    }

    pub fn delete(&self, ticket: Ticket) -> Result<()> {
        self.lock().delete(ticket)
    }

    pub fn append(&self, ticket: Ticket, payload: P) -> Result<()> {
        self.lock().append(ticket, payload)
    }

    pub fn insert_head(&self, ticket: Ticket, payload: P) -> Result<()> {
        self.lock().insert_head(ticket, payload)
    }

    pub fn remove_head(&self, ticket: Ticket) -> Result<P> {
        self.lock().remove_head(ticket)
    }

    pub fn remove_tail(&self, ticket: Ticket) -> Result<P> {
        self.lock().remove_tail(ticket)
    }

    pub fn contains(&self, ticket: Ticket) -> bool {
        self.lock().contains(ticket)
    }

    pub fn live_lists(&self) -> usize {
        self.lock().live_lists()
    }

    pub fn last_error(&self) -> ErrorBuffer {
        self.lock().last_error()
    }
}

impl<P: Clone> SharedListStore<P> {
    /// Snapshot of the list's payloads, head first.
    pub fn traverse(&self, ticket: Ticket) -> Result<Vec<P>> {
        let store = self.lock();
        let payloads = store.traverse(ticket)?.cloned().collect();
        Ok(payloads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn concurrent_creates_mint_distinct_tickets() {
        let store = SharedListStore::new(64).unwrap();

        let tickets: Vec<Ticket> = thread::scope(|s| {
            let workers: Vec<_> = (0..8)
                .map(|worker| {
                    let store = &store;
                    s.spawn(move || {
                        (0..8)
                            .map(|n| store.create(worker * 100 + n).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|w| w.join().unwrap())
                .collect()
        });

        let unique: HashSet<Ticket> = tickets.iter().copied().collect();
        assert_eq!(unique.len(), 64);
        let stamps: HashSet<u16> = tickets.iter().map(|t| t.stamp()).collect();
        assert_eq!(stamps.len(), 64);
        assert_eq!(store.live_lists(), 64);

        let err = store.create(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert!(store.last_error().as_str().starts_with("create: too many lists"));
    }

    #[test]
    fn concurrent_appends_to_one_list() {
        let store = SharedListStore::new(1).unwrap();
        let ticket = store.create(0usize).unwrap();

        thread::scope(|s| {
            for worker in 1..=4 {
                let store = &store;
                s.spawn(move || {
                    for _ in 0..25 {
                        store.append(ticket, worker).unwrap();
                    }
                });
            }
        });

        let payloads = store.traverse(ticket).unwrap();
        assert_eq!(payloads.len(), 101);
        assert_eq!(payloads[0], 0);
        for worker in 1..=4 {
            assert_eq!(payloads.iter().filter(|&&p| p == worker).count(), 25);
        }
    }

    #[test]
    fn into_inner_keeps_lists() {
        let store = SharedListStore::new(2).unwrap();
        let ticket = store.create("kept".to_string()).unwrap();
        store.insert_head(ticket, "first".to_string()).unwrap();

        let inner = store.into_inner();
        let payloads: Vec<&String> = inner.traverse(ticket).unwrap().collect();
        assert_eq!(payloads, vec!["first", "kept"]);
    }
}
