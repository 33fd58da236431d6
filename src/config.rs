use std::env;

/// Display used when `DISPLAY` is unset or empty.
pub const DEFAULT_DISPLAY: &str = ":0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub display_name: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::resolve(env::var("DISPLAY").ok())
    }

    pub fn with_display(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }

    fn resolve(display: Option<String>) -> Self {
        match display {
            Some(name) if !name.is_empty() => Self::with_display(name),
            _ => Self::with_display(DEFAULT_DISPLAY),
        }
    }
}
