//! Core library surface for the contact manager. The binary only wires these
//! pieces together; tests and other tooling can reuse the store directly.
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod ui;

pub use config::Config;
pub use db::{
    add_person, delete_person, ensure_schema, get_person, list_persons, open_store,
    update_person, StoreError,
};
pub use models::Person;
pub use ui::{run_app, App, Shell, Template, ViewError};
