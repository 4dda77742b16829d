//! Entity structs for all stored forum records.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize` and `Deserialize`; the JSON shape is what the HTTP layer returns.

mod answer;
mod comment;
mod question;
mod user;
mod vote;

pub use answer::Answer;
pub use comment::Comment;
pub use question::Question;
pub use user::User;
pub use vote::Vote;
