//! Repository methods on `ForumService`, one module per record family.
//!
//! Row readers are free functions over `&libsql::Connection` so the same code
//! runs on the shared connection and inside a [`WriteTx`](crate::WriteTx).

pub mod question;
pub mod reply;
pub mod session;
pub mod user;
pub mod vote;
