use crate::session::{clear_user, load_user, save_user};
use crate::types::{Identity, KeyValueStore, Result};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeMode::Light => f.write_str("light"),
            ThemeMode::Dark => f.write_str("dark"),
        }
    }
}

/// Session-wide state handed to the dashboard: theme, signed-in user and
/// the durable store both live here rather than in globals.
pub struct AppContext {
    theme: ThemeMode,
    user: Option<Identity>,
    store: Box<dyn KeyValueStore>,
}

impl AppContext {
    /// Start a session, restoring any user persisted by an earlier one.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        let user = load_user(store.as_ref());
        debug!("Session started (signed in: {})", user.is_some());
        Self {
            theme: ThemeMode::default(),
            user,
            store,
        }
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.theme = match self.theme {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        };
        self.theme
    }

    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Record a successful sign-in and persist it for later sessions.
    pub fn sign_in(&mut self, identity: Identity) -> Result<()> {
        save_user(self.store.as_mut(), &identity)?;
        self.user = Some(identity);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        clear_user(self.store.as_mut())?;
        self.user = None;
        Ok(())
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }
}
