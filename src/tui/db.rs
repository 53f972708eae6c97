use crate::tui::state::UserPreferences;
use crate::tui::theme::Theme;
use rusqlite::{Connection, OptionalExtension, Result};
use std::path::{Path, PathBuf};

pub fn get_db_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .map(|p| p.join("agribot"))
        .unwrap_or_else(|| PathBuf::from("."));

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join("preferences.db")
}

/// Key/value preferences kept between runs (theme, last page).
pub struct PreferenceStore {
    conn: Connection,
}

impl PreferenceStore {
    pub fn open_default() -> Result<Self> {
        Self::open(&get_db_path())
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self { conn })
    }

    pub fn save_preference(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }

    pub fn load_preference(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn load_user_preferences(&self) -> UserPreferences {
        let mut prefs = UserPreferences::default_prefs();

        if let Ok(Some(page)) = self.load_preference("last_page") {
            prefs.last_page = page;
        }

        if let Ok(Some(theme)) = self.load_preference("theme") {
            prefs.theme = Theme::from_str(&theme);
        }

        prefs
    }

    pub fn save_user_preferences(&self, prefs: &UserPreferences) -> Result<()> {
        self.save_preference("last_page", &prefs.last_page)?;
        if let Some(theme) = prefs.theme {
            self.save_preference("theme", theme.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(&dir.path().join("prefs.db")).unwrap();
        let prefs = store.load_user_preferences();
        assert_eq!(prefs.last_page, "dashboard");
        assert_eq!(prefs.theme, None);
    }

    #[test]
    fn theme_and_page_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");
        {
            let store = PreferenceStore::open(&path).unwrap();
            store
                .save_user_preferences(&UserPreferences {
                    last_page: "bot-location".to_string(),
                    theme: Some(Theme::Light),
                })
                .unwrap();
            store.save_preference("theme", "dark").unwrap();
        }
        let store = PreferenceStore::open(&path).unwrap();
        let prefs = store.load_user_preferences();
        assert_eq!(prefs.last_page, "bot-location");
        assert_eq!(prefs.theme, Some(Theme::Dark));
    }

    #[test]
    fn unknown_theme_value_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(&dir.path().join("prefs.db")).unwrap();
        store.save_preference("theme", "sepia").unwrap();
        assert_eq!(store.load_user_preferences().theme, None);
    }
}
