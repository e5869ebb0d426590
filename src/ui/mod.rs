//! Ratatui front-end. `Shell` tracks which named view fills the window, `App`
//! owns the store connection plus the state behind that view, and `run_app`
//! drives the terminal.

mod app;
mod forms;
mod helpers;
mod screens;
mod shell;
mod terminal;

pub use app::App;
pub use shell::{Shell, Template, ViewError, WINDOW_TITLE};
pub use terminal::run_app;
