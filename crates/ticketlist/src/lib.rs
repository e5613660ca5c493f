//! ticketlist: a fixed-capacity registry of singly-linked lists.
//!
//! Lists are reached only through [`Ticket`]s. A ticket packs a slot locator
//! and a generation stamp; the store rejects any ticket that does not match
//! what its slot currently authorises, so tickets for deleted or reused slots
//! (and forged values) fail with [`ErrorKind::InvalidHandle`].
//!
//! ```
//! use ticketlist::{ErrorKind, ListStore};
//!
//! let mut store = ListStore::new(4)?;
//! let ticket = store.create("A")?;
//! store.append(ticket, "B")?;
//! store.insert_head(ticket, "Z")?;
//! let items: Vec<_> = store.traverse(ticket)?.copied().collect();
//! assert_eq!(items, ["Z", "A", "B"]);
//!
//! store.delete(ticket)?;
//! assert_eq!(store.append(ticket, "C").unwrap_err().kind(), ErrorKind::InvalidHandle);
//! # Ok::<(), ticketlist::ListError>(())
//! ```

pub mod config;
pub mod errbuf;
pub mod error;
pub mod render;
pub mod shared;

mod list;
mod table;
mod ticket;

pub use config::{ConfigError, StoreConfig};
pub use errbuf::{ERROR_BUFFER_LEN, ErrorBuffer};
pub use error::{ErrorKind, ExhaustedField, InvalidTicket, ListError, RemovalEnd, Result};
pub use list::{ListStore, Traverse};
pub use shared::SharedListStore;
pub use ticket::{GENERATION_SEED, LOCATOR_OFFSET, MAX_CAPACITY, Ticket};
