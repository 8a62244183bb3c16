//! Alias wallet.
//!
//! A wallet is a plain text file of `<alias> <uri>` lines mapping short names
//! to template locations. Lines that do not have this shape are ignored.

use crate::constants::WALLET_FILE;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ALIAS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_-]+$").expect("valid alias name regex"));

static ALIAS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<name>[A-Za-z_-]+)\s+(?P<uri>\S+)\s*$").expect("valid alias line regex")
});

/// Default wallet location, `<config dir>/replica/wallet`.
pub fn default_wallet_path() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("replica")
        .join(WALLET_FILE)
}

pub fn is_valid_alias(name: &str) -> bool {
    ALIAS_NAME.is_match(name)
}

/// Aliases of a wallet file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasWallet {
    aliases: IndexMap<String, String>,
}

impl AliasWallet {
    /// Parses wallet content. Later lines win over earlier ones with the same alias.
    pub fn parse(content: &str) -> Self {
        let aliases = content
            .lines()
            .filter_map(|line| ALIAS_LINE.captures(line))
            .map(|caps| (caps["name"].to_string(), caps["uri"].to_string()))
            .collect();
        Self { aliases }
    }

    /// Reads the wallet at `path`.
    ///
    /// # Errors
    /// * `Error::AliasError` if the wallet does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::AliasError(format!("cannot find wallet '{}'", path.display())));
        }
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Writes the wallet to `path`, creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content: String = self.aliases.iter().map(|(name, uri)| format!("{name} {uri}\n")).collect();
        fs::write(path, content)?;
        debug!("Saved {} alias(es) to '{}'.", self.aliases.len(), path.display());
        Ok(())
    }

    /// Registers `name`. Refuses invalid names and names already in use.
    pub fn add(&mut self, name: &str, uri: &str) -> Result<()> {
        if !is_valid_alias(name) {
            return Err(Error::AliasError(format!(
                "'{name}' is an invalid alias, aliases can only contain letters, underscores and hyphens"
            )));
        }
        if uri.is_empty() || uri.chars().any(char::is_whitespace) {
            return Err(Error::AliasError(format!("'{uri}' is not a valid template location")));
        }
        if let Some(existing) = self.aliases.get(name) {
            return Err(Error::AliasError(format!("alias '{name}' already exists ({existing})")));
        }
        self.aliases.insert(name.to_string(), uri.to_string());
        Ok(())
    }

    /// Removes `name` and returns the location it pointed to.
    pub fn remove(&mut self, name: &str) -> Result<String> {
        self.aliases
            .shift_remove(name)
            .ok_or_else(|| Error::AliasError(format!("wallet does not contain alias '{name}'")))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(name, uri)| (name.as_str(), uri.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Creates an empty wallet at `path`.
///
/// # Errors
/// * `Error::AliasError` if a wallet already exists there
pub fn init_wallet<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Err(Error::AliasError(format!("wallet '{}' already exists", path.display())));
    }
    AliasWallet::default().save(path)
}

/// Location registered for `name`, or `name` itself when the wallet does
/// not exist or has no such alias.
pub fn resolve<P: AsRef<Path>>(wallet_path: P, name: &str) -> Result<String> {
    if !wallet_path.as_ref().is_file() {
        return Ok(name.to_string());
    }
    let wallet = AliasWallet::load(wallet_path)?;
    Ok(wallet.get(name).unwrap_or(name).to_string())
}
