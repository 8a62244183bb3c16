//! `replica alias`: manage the alias wallet.

use crate::alias::{init_wallet, AliasWallet};
use crate::cli::AliasCommand;
use crate::error::Result;
use crate::loader::TemplateSource;
use crate::logger::success;
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Local paths are stored absolute so the alias works from any directory.
fn normalize_uri(uri: &str) -> String {
    match TemplateSource::from_string(uri) {
        TemplateSource::FileSystem(path) => fs::canonicalize(&path)
            .map(|path| path.display().to_string())
            .unwrap_or_else(|_| uri.to_string()),
        TemplateSource::Git(_) => uri.to_string(),
    }
}

fn add(wallet_path: &Path, name: &str, uri: &str) -> Result<()> {
    if !wallet_path.exists() {
        init_wallet(wallet_path)?;
        info!("Created alias wallet '{}'", wallet_path.display());
    }
    let mut wallet = AliasWallet::load(wallet_path)?;
    wallet.add(name.trim(), &normalize_uri(uri.trim()))?;
    wallet.save(wallet_path)?;

    success(format!("Saved alias {} in wallet '{}'", name.trim(), wallet_path.display()));
    warn!("Alias wallets are not encrypted, credentials or tokens in a template location are stored in plain text");
    Ok(())
}

fn remove(wallet_path: &Path, name: &str) -> Result<()> {
    let mut wallet = AliasWallet::load(wallet_path)?;
    let uri = wallet.remove(name.trim())?;
    wallet.save(wallet_path)?;
    success(format!("Removed alias {} ({}) from wallet '{}'", name.trim(), uri, wallet_path.display()));
    Ok(())
}

fn list(wallet_path: &Path) -> Result<()> {
    let wallet = AliasWallet::load(wallet_path)?;
    info!("Wallet '{}' ({} entr{})", wallet_path.display(), wallet.len(), if wallet.len() == 1 { "y" } else { "ies" });
    for (name, uri) in wallet.iter() {
        println!("{name} -> {uri}");
    }
    Ok(())
}

pub fn run(action: AliasCommand, wallet_path: &Path) -> Result<()> {
    match action {
        AliasCommand::Add { name, uri } => add(wallet_path, &name, &uri),
        AliasCommand::Rm { name } => remove(wallet_path, &name),
        AliasCommand::List => list(wallet_path),
        AliasCommand::Init => {
            init_wallet(wallet_path)?;
            success(format!("Created alias wallet '{}'", wallet_path.display()));
            Ok(())
        }
    }
}
