use anyhow::{Context, Result};
use nullcursor::Config;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env();
    nullcursor::run(&config).context("nullcursor")?;

    Ok(())
}
