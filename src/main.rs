//! Binary entry point: resolve configuration, start logging, open the person
//! store, then hand the window to the TUI until the user quits.
use contact_app::{logging, open_store, run_app, App, Config, Template};
use log::info;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config.log_path)?;
    info!("starting with database {}", config.db_path.display());

    let conn = open_store(&config.db_path)?;

    let mut app = App::new(conn);
    app.show_initial(Template::MainLayout.name())?;
    app.show_view(Template::HomeScreen.name());

    let result = run_app(&mut app);
    info!("shutting down");
    result
}
