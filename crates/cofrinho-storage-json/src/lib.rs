//! cofrinho-storage-json
//!
//! One pretty-printed JSON file per owner wallet, written atomically, with timestamped backups.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

use cofrinho_core::{wallet_ops, CardRepository, CoreError, PlanFields, PlanRepository};
use cofrinho_domain::{
    CardId, CreditCard, InstallmentPlan, OwnerId, PlanId, Wallet, CURRENT_SCHEMA_VERSION,
};

const WALLET_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// A backup file of one owner's wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletBackupInfo {
    pub owner: String,
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// Filesystem-backed JSON persistence for wallets and their backups.
#[derive(Debug, Clone)]
pub struct JsonWalletStorage {
    wallets_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonWalletStorage {
    pub fn new(wallets_dir: PathBuf, backups_dir: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(wallets_dir, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        wallets_dir: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self, CoreError> {
        fs::create_dir_all(&wallets_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            wallets_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn wallet_path(&self, owner: &OwnerId) -> PathBuf {
        self.wallets_dir
            .join(format!("{}.{}", canonical_name(owner.as_str()), WALLET_EXTENSION))
    }

    /// Loads the owner's wallet, or an empty one when nothing has been saved yet.
    pub fn load_wallet(&self, owner: &OwnerId) -> Result<Wallet, CoreError> {
        let path = self.wallet_path(owner);
        if !path.exists() {
            debug!(owner = %owner, "no stored wallet, starting empty");
            return Ok(Wallet::new(owner.clone()));
        }
        let wallet = load_wallet_from_path(&path)?;
        if wallet.owner != *owner {
            return Err(CoreError::Persistence(format!(
                "wallet file `{}` belongs to `{}`",
                path.display(),
                wallet.owner
            )));
        }
        Ok(wallet)
    }

    /// Writes the wallet atomically, backing up the previous file first.
    pub fn save_wallet(&self, wallet: &Wallet) -> Result<(), CoreError> {
        let path = self.wallet_path(&wallet.owner);
        if path.exists() {
            self.backup_existing_file(&wallet.owner, &path)?;
        }
        save_wallet_to_path(wallet, &path)?;
        debug!(owner = %wallet.owner, path = %path.display(), "wallet saved");
        Ok(())
    }

    pub fn backup_wallet(
        &self,
        wallet: &Wallet,
        note: Option<&str>,
    ) -> Result<WalletBackupInfo, CoreError> {
        let dir = self.backup_dir(&wallet.owner);
        fs::create_dir_all(&dir)?;
        let slug = canonical_name(wallet.owner.as_str());
        let now = Utc::now();
        let mut stem = format!("{}_{}", slug, now.format(BACKUP_TIMESTAMP_FORMAT));
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let file_name = format!("{}.{}", stem, WALLET_EXTENSION);
        let path = dir.join(&file_name);
        write_atomic(&path, &serialize_wallet(wallet)?)?;
        self.prune_backups(&wallet.owner)?;
        Ok(WalletBackupInfo {
            owner: slug,
            created_at: parse_backup_timestamp(&file_name),
            id: file_name,
            path,
        })
    }

    /// Backups of the owner's wallet, newest first.
    pub fn list_backups(&self, owner: &OwnerId) -> Result<Vec<WalletBackupInfo>, CoreError> {
        let dir = self.backup_dir(owner);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let slug = canonical_name(owner.as_str());
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(WALLET_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(WalletBackupInfo {
                    owner: slug.clone(),
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse(info.created_at));
        Ok(entries)
    }

    /// Copies the backup over the owner's wallet file and returns the restored wallet.
    pub fn restore_backup(
        &self,
        owner: &OwnerId,
        backup: &WalletBackupInfo,
    ) -> Result<Wallet, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Persistence(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let target = self.wallet_path(owner);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&backup.path, &target)?;
        self.load_wallet(owner)
    }

    fn backup_dir(&self, owner: &OwnerId) -> PathBuf {
        self.backups_dir.join(canonical_name(owner.as_str()))
    }

    fn backup_existing_file(&self, owner: &OwnerId, path: &Path) -> Result<(), CoreError> {
        let dir = self.backup_dir(owner);
        fs::create_dir_all(&dir)?;
        let file_name = format!(
            "{}_{}.{}",
            canonical_name(owner.as_str()),
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT),
            WALLET_EXTENSION
        );
        fs::copy(path, dir.join(file_name))?;
        self.prune_backups(owner)
    }

    fn prune_backups(&self, owner: &OwnerId) -> Result<(), CoreError> {
        let entries = self.list_backups(owner)?;
        for entry in entries.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.id, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }

    fn modify<T>(
        &self,
        owner: &OwnerId,
        change: impl FnOnce(&mut Wallet) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut wallet = self.load_wallet(owner).map_err(as_persistence)?;
        let value = change(&mut wallet)?;
        self.save_wallet(&wallet).map_err(as_persistence)?;
        Ok(value)
    }
}

impl PlanRepository for JsonWalletStorage {
    fn list(&self, owner: &OwnerId) -> Result<Vec<InstallmentPlan>, CoreError> {
        Ok(self.load_wallet(owner).map_err(as_persistence)?.plans)
    }

    fn create(&self, owner: &OwnerId, plan: &InstallmentPlan) -> Result<PlanId, CoreError> {
        self.modify(owner, |wallet| Ok(wallet_ops::create_plan(wallet, plan)))
    }

    fn update(&self, owner: &OwnerId, id: PlanId, fields: &PlanFields) -> Result<(), CoreError> {
        self.modify(owner, |wallet| wallet_ops::update_plan(wallet, id, fields))
    }

    fn delete(&self, owner: &OwnerId, id: PlanId) -> Result<(), CoreError> {
        self.modify(owner, |wallet| {
            wallet_ops::delete_plan(wallet, id);
            Ok(())
        })
    }
}

impl CardRepository for JsonWalletStorage {
    fn list_cards(&self, owner: &OwnerId) -> Result<Vec<CreditCard>, CoreError> {
        Ok(self.load_wallet(owner).map_err(as_persistence)?.cards)
    }

    fn create_card(&self, owner: &OwnerId, card: &CreditCard) -> Result<CardId, CoreError> {
        self.modify(owner, |wallet| Ok(wallet_ops::create_card(wallet, card)))
    }

    fn update_card(&self, owner: &OwnerId, card: &CreditCard) -> Result<(), CoreError> {
        self.modify(owner, |wallet| wallet_ops::update_card(wallet, card))
    }

    fn delete_card(&self, owner: &OwnerId, id: CardId) -> Result<(), CoreError> {
        self.modify(owner, |wallet| {
            wallet_ops::delete_card(wallet, id);
            Ok(())
        })
    }
}

/// Saves a wallet to an arbitrary path on disk via a temp file and rename.
pub fn save_wallet_to_path(wallet: &Wallet, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_wallet(wallet)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a wallet and repairs parcel sets that fall outside their plan.
pub fn load_wallet_from_path(path: &Path) -> Result<Wallet, CoreError> {
    let data = fs::read_to_string(path)?;
    let mut wallet: Wallet =
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
    if wallet.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(CoreError::UnsupportedSchema(wallet.schema_version));
    }
    for message in wallet.normalize() {
        warn!(path = %path.display(), "{message}");
    }
    Ok(wallet)
}

fn as_persistence(err: CoreError) -> CoreError {
    match err {
        CoreError::Io(err) => CoreError::Persistence(err.to_string()),
        CoreError::Serde(message) => CoreError::Persistence(message),
        other => other,
    }
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "wallet".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads the `YYYYMMDD_HHMMSS` stamp that follows the owner slug in a backup file name.
fn parse_backup_timestamp(file_name: &str) -> Option<DateTime<Utc>> {
    let stem = file_name.strip_suffix(&format!(".{}", WALLET_EXTENSION))?;
    let segments: Vec<&str> = stem.split('_').collect();
    segments.windows(2).rev().find_map(|pair| {
        let (date, time) = (pair[0], pair[1]);
        if !is_digits(date, 8) || !is_digits(time, 6) {
            return None;
        }
        NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S")
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn serialize_wallet(wallet: &Wallet) -> Result<String, CoreError> {
    serde_json::to_string_pretty(wallet).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_replaces_unsafe_characters() {
        assert_eq!(canonical_name("Ana Souza"), "ana_souza");
        assert_eq!(canonical_name("../.."), "wallet");
        assert_eq!(canonical_name("user-42"), "user-42");
    }

    #[test]
    fn backup_notes_are_slugged() {
        assert_eq!(
            sanitize_backup_note(Some("Antes da Mudança!")),
            Some("antes-da-mudana".into())
        );
        assert_eq!(sanitize_backup_note(Some("  ")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }

    #[test]
    fn parses_timestamp_with_or_without_note() {
        let plain = parse_backup_timestamp("ana_20260203_101500.json").unwrap();
        assert_eq!(plain.format("%Y-%m-%d %H:%M:%S").to_string(), "2026-02-03 10:15:00");
        let noted = parse_backup_timestamp("ana_souza_20260203_101500_manual.json").unwrap();
        assert_eq!(noted, plain);
        assert!(parse_backup_timestamp("ana.json").is_none());
    }

    #[test]
    fn tmp_path_appends_suffix() {
        let tmp = tmp_path(Path::new("/data/ana.json"));
        assert_eq!(tmp, PathBuf::from("/data/ana.json.tmp"));
    }
}
