use std::env;

use crate::client::ToplevelGeometry;

/// Window settings. There are no command-line flags; a couple of environment
/// variables may override the defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    pub app_id: String,
    pub title: String,
    /// Colour of the readiness probe frame and of every resize frame.
    pub clear_color: [f32; 4],
    /// Size of the platform window binding when no toplevel geometry was seen.
    pub minimum_size: ToplevelGeometry,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            app_id: "example".into(),
            title: "example window".into(),
            clear_color: [1.0, 1.0, 0.0, 1.0],
            minimum_size: ToplevelGeometry {
                width: 1,
                height: 1,
            },
        }
    }
}

impl WindowConfig {
    pub const APP_ID_VAR: &'static str = "EGLWIN_APP_ID";
    pub const TITLE_VAR: &'static str = "EGLWIN_TITLE";

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(app_id) = lookup(Self::APP_ID_VAR).filter(|v| !v.is_empty()) {
            config.app_id = app_id;
        }
        if let Some(title) = lookup(Self::TITLE_VAR).filter(|v| !v.is_empty()) {
            config.title = title;
        }
        config
    }
}
