use anyhow::Context as _;
use fort_flora::app::{self, Shell};
use fort_flora::config::Config;
use fort_flora::logging;
use fort_flora::services::AppServices;
use fort_nexus::Application;

fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    let log_path = logging::init(&config)?;
    tracing::info!(log = %log_path.display(), "fort-flora starting");

    let initial = app::initial_location(std::env::args().skip(1));
    let services = AppServices::from_config(&config);

    Application::new().run(move |cx| {
        cx.set_root(Shell::new(services, initial, cx)?)?;
        Ok(())
    })
}
