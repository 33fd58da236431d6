pub mod config;
pub mod cursor;
pub mod error;
pub mod server;
pub mod x;

pub use config::Config;
pub use cursor::NullCursor;
pub use error::{Error, ProtocolError, Request, Result};
pub use server::XServer;
pub use x::Display;

/// Hides the cursor of the root window of the default screen of `server`.
/// Returns the id of the cursor installed on the root window.
pub fn hide_root_cursor<S: XServer>(server: &mut S) -> Result<u64> {
    NullCursor::create(server)?.attach_to_root(server)
}

/// Connects to the configured display, hides its root cursor and disconnects.
pub fn run(config: &Config) -> Result<u64> {
    let mut display = Display::open(config)?;

    hide_root_cursor(&mut display)
}
