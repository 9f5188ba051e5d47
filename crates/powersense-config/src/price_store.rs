// Durable storage for the user's price per kWh.
//
// One key in a TOML state table, value kept as a decimal string so the
// file reads the same way the value was typed.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::ConfigError;

/// Key under which the price is stored.
pub const PRICE_KEY: &str = "powerSensePricePerKWH";

/// Reads and writes the saved price.
#[derive(Debug, Clone)]
pub struct PriceStore {
    path: PathBuf,
}

impl PriceStore {
    /// Store backed by the platform state file.
    pub fn open_default() -> Self {
        Self::new(crate::state_path())
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved price, if there is one and it is a non-negative number.
    ///
    /// Missing files, unreadable TOML and unparsable values all yield
    /// `None`; the caller keeps its default.
    pub fn load(&self) -> Option<f64> {
        let price: f64 = self.read()?.get(PRICE_KEY)?.as_str()?.trim().parse().ok()?;
        (price.is_finite() && price >= 0.0).then_some(price)
    }

    /// Persist `price`, creating the state directory if needed. Other keys
    /// in a readable state file are kept.
    pub fn save(&self, price: f64) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut state = self.read().unwrap_or_default();
        state.insert(PRICE_KEY.to_owned(), Value::String(price.to_string()));
        std::fs::write(&self.path, toml::to_string_pretty(&state)?)?;
        Ok(())
    }

    fn read(&self) -> Option<Table> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        raw.parse().ok()
    }
}
