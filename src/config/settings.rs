use crate::core::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::error::{LedgerError, Result};
use log::LevelFilter;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE_ENV: &str = "LEDGER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "ledger.toml";

const DB_PATH_ENV: &str = "LEDGER_DB_PATH";
const WALLET_FILE_ENV: &str = "LEDGER_WALLET_FILE";
const DIFFICULTY_ENV: &str = "LEDGER_DIFFICULTY";
const LOG_LEVEL_ENV: &str = "LEDGER_LOG";

const DEFAULT_DB_PATH: &str = "./data";
const DEFAULT_WALLET_FILE: &str = "./wallet.dat";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime settings. Built once in `main` and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub db_path: PathBuf,
    pub wallet_file: PathBuf,
    pub difficulty: u32,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            wallet_file: PathBuf::from(DEFAULT_WALLET_FILE),
            difficulty: DEFAULT_DIFFICULTY,
            log_level: String::from(DEFAULT_LOG_LEVEL),
        }
    }
}

impl Config {
    /// Defaults, then the config file (`LEDGER_CONFIG` or `./ledger.toml` when
    /// present), then `LEDGER_*` environment overrides.
    pub fn load() -> Result<Config> {
        let file = match env::var(CONFIG_FILE_ENV) {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                path.exists().then_some(path)
            }
        };

        let mut config = match file {
            Some(path) => Config::from_file(&path)?,
            None => Config::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("Cannot read {}: {e}", path.display()))
        })?;
        Config::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Config> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `LEDGER_*` overrides, looked up through `lookup` so tests need
    /// not touch the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = lookup(DB_PATH_ENV) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(wallet_file) = lookup(WALLET_FILE_ENV) {
            self.wallet_file = PathBuf::from(wallet_file);
        }
        if let Some(difficulty) = lookup(DIFFICULTY_ENV) {
            self.difficulty = difficulty.trim().parse().map_err(|_| {
                LedgerError::Config(format!("{DIFFICULTY_ENV} is not a number: {difficulty}"))
            })?;
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.difficulty == 0 || self.difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::Config(format!(
                "difficulty must be between 1 and {MAX_DIFFICULTY}, got {}",
                self.difficulty
            )));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| LedgerError::Config(format!("Unknown log level: {}", self.log_level)))
    }
}
