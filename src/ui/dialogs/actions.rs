//! Dialog action types - dialogs return actions instead of mutating state directly.

use crate::config::Settings;

/// Actions that dialogs can return to the main application.
/// The app processes these in its update loop.
#[derive(Debug, Clone)]
pub enum DialogAction {
    /// Apply and persist settings. The key goes to the keyring only when
    /// the user edited it.
    SaveSettings {
        settings: Settings,
        api_key_changed: bool,
    },
}
