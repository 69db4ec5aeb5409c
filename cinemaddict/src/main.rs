use anyhow::Result;

use cinemaddict::settings::Settings;
use cinemaddict::App;

fn main() -> Result<()> {
    let settings = Settings::load()?;

    // Logging is initialized in App::run()
    App::new(settings).run()?;

    Ok(())
}
