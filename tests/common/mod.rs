use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use cofrinho::PlanSession;
use cofrinho_config::ConfigManager;
use cofrinho_domain::{ContractPolicy, OwnerId};
use cofrinho_storage_json::JsonWalletStorage;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique data directory that outlives the calling test.
pub fn test_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn open_session(base: &Path, policy: ContractPolicy) -> PlanSession {
    let storage = JsonWalletStorage::new(base.join("wallets"), base.join("backups"))
        .expect("create json storage backend");
    PlanSession::open(OwnerId::new("ana").unwrap(), Box::new(storage), policy)
        .expect("open session")
}

/// Creates an isolated session and config manager backed by a unique directory.
#[allow(dead_code)]
pub fn setup_test_env() -> (PlanSession, ConfigManager, PathBuf) {
    let base = test_home();
    let session = open_session(&base, ContractPolicy::Strict);
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (session, config_manager, base)
}
