//! App Core for Linkbook.
//!
//! Owns the settings, the engine over the on-disk store and the relocation
//! gesture of the single UI client, and runs startup housekeeping.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::database::Database;
use crate::managers::linkbook_manager::LinkbookManager;
use crate::managers::relocation::RelocationSession;
use crate::services::quick_nav::QuickNav;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::store::SqliteStore;
use crate::types::errors::{LinkbookResult, SettingsError};
use crate::types::link::GroupId;
use crate::types::settings::LinkbookSettings;

/// Central application struct.
pub struct App {
    pub settings_engine: SettingsEngine,
    pub linkbook: LinkbookManager<SqliteStore>,
    pub relocation: RelocationSession,
}

impl App {
    /// Creates a new App, opening the database named by the settings.
    ///
    /// A settings file that fails to load is logged and defaults are used.
    pub fn new(mut settings_engine: SettingsEngine) -> Result<Self, Box<dyn std::error::Error>> {
        let settings = load_or_default(&mut settings_engine);

        let db_path = Path::new(&settings.database_path);
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create data directory: {}", e))?;
        }
        let db = Database::open(db_path)?;
        tracing::info!(path = %settings.database_path, "opened linkbook database");

        Ok(Self::with_store(settings_engine, SqliteStore::new(db)))
    }

    /// Creates an App over an in-memory database. Nothing is written to disk
    /// except the settings file, and only when a setting is changed.
    pub fn in_memory(mut settings_engine: SettingsEngine) -> LinkbookResult<Self> {
        load_or_default(&mut settings_engine);
        Ok(Self::with_store(settings_engine, SqliteStore::open_in_memory()?))
    }

    fn with_store(settings_engine: SettingsEngine, store: SqliteStore) -> Self {
        let pinned_root_name = settings_engine
            .get_settings()
            .display
            .pinned_root_name
            .clone();
        Self {
            settings_engine,
            linkbook: LinkbookManager::new(store).with_pinned_root_name(pinned_root_name),
            relocation: RelocationSession::new(),
        }
    }

    /// Startup sequence: drop group placeholders abandoned by a previous run.
    pub async fn startup(&self) -> LinkbookResult<Vec<GroupId>> {
        let purged = self.linkbook.purge_unnamed_groups().await?;
        tracing::info!(purged = purged.len(), "linkbook ready");
        Ok(purged)
    }

    pub fn settings(&self) -> &LinkbookSettings {
        self.settings_engine.get_settings()
    }

    /// Updates one setting and applies it to the running engine.
    pub fn set_setting(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        self.settings_engine.set_value(key, value)?;
        self.apply_settings();
        Ok(())
    }

    /// Restores default settings and applies them to the running engine.
    pub fn reset_settings(&mut self) -> Result<(), SettingsError> {
        self.settings_engine.reset()?;
        self.apply_settings();
        Ok(())
    }

    fn apply_settings(&self) {
        let name = self.settings().display.pinned_root_name.clone();
        self.linkbook.set_pinned_root_name(name);
    }

    /// Current digit shortcuts over the pinned links.
    pub async fn quick_nav(&self) -> LinkbookResult<QuickNav> {
        let tree = self.linkbook.compile_linkbook_data().await?;
        Ok(QuickNav::from_pinned(
            &tree.pinned,
            self.settings().display.quick_nav_limit,
        ))
    }
}

fn load_or_default(settings_engine: &mut SettingsEngine) -> LinkbookSettings {
    match settings_engine.load() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = settings_engine.get_config_path(),
                "settings unreadable, using defaults"
            );
            settings_engine.get_settings().clone()
        }
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` takes precedence over `fallback_filter`. Calling this twice is
/// harmless; the second install is ignored.
pub fn init_logging(fallback_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
