//! Persistence for the `person` table, split into schema bootstrap and the
//! CRUD helpers. Every helper takes a borrowed connection and runs a single
//! statement; prepared statements and rows are dropped on every return path.

mod connection;
mod error;
mod persons;

pub use connection::{ensure_schema, open_store};
pub use error::StoreError;
pub use persons::{add_person, delete_person, get_person, list_persons, update_person};
