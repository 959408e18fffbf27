use std::sync::Arc;

use crate::config::Config;
use crate::layout::FontRegistry;
use crate::settings::SettingsStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything a render request needs travels through here; nothing is global.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Fonts loaded from `config.fonts_dir` at startup. Read-only afterwards.
    pub fonts: Arc<FontRegistry>,
    pub settings: Arc<SettingsStore>,
}
