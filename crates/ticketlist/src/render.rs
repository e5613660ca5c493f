//! Plain-text rendering of a list's payloads.

use std::fmt::Display;
use std::io::{self, Write};

use crate::error::ListError;
use crate::list::ListStore;
use crate::ticket::Ticket;

pub const DEFAULT_SEPARATOR: &str = " -> ";

/// Heading printed above each rendered list.
pub const BANNER: &str = "PRINTING NODE DATA";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    List(#[from] ListError),

    #[error("failed to write list output: {0}")]
    Io(#[from] io::Error),
}

/// Join payloads with `separator`, head first.
pub fn render_chain<'a, P, I>(payloads: I, separator: &str) -> String
where
    P: Display + 'a,
    I: IntoIterator<Item = &'a P>,
{
    let mut out = String::new();
    for (i, payload) in payloads.into_iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(&payload.to_string());
    }
    out
}

/// Write the banner and the rendered chain for `ticket` to `out`.
pub fn print_list<P, W>(
    out: &mut W,
    store: &ListStore<P>,
    ticket: Ticket,
    separator: &str,
) -> Result<(), RenderError>
where
    P: Display,
    W: Write,
{
    let line = render_chain(store.traverse(ticket)?, separator);
    write!(out, "\n{BANNER}\n\n{line}\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn render_joins_with_separator() {
        let names = ["Adewale", "Olufemi", "Nneka"];
        assert_eq!(
            render_chain(&names, DEFAULT_SEPARATOR),
            "Adewale -> Olufemi -> Nneka"
        );
        assert_eq!(render_chain(&[1, 2, 3], ", "), "1, 2, 3");
    }

    #[test]
    fn render_empty_is_blank() {
        let empty: [u8; 0] = [];
        assert_eq!(render_chain(&empty, DEFAULT_SEPARATOR), "");
    }

    #[test]
    fn print_list_writes_banner_and_chain() {
        let mut store = ListStore::new(1).unwrap();
        let ticket = store.create("Jacob").unwrap();
        store.append(ticket, "Kemi").unwrap();

        let mut out = Vec::new();
        print_list(&mut out, &store, ticket, DEFAULT_SEPARATOR).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nPRINTING NODE DATA\n\nJacob -> Kemi\n"
        );
    }

    #[test]
    fn print_list_propagates_bad_ticket() {
        let store: ListStore<&str> = ListStore::new(1).unwrap();
        let mut out = Vec::new();
        let err = print_list(&mut out, &store, Ticket::from_raw(0x1221_0502), " ").unwrap_err();
        match err {
            RenderError::List(e) => assert_eq!(e.kind(), ErrorKind::InvalidHandle),
            other => panic!("unexpected error: {other}"),
        }
        assert!(out.is_empty());
    }
}
