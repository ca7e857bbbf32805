use std::fs;

use chrono::NaiveDate;
use cofrinho_core::{
    CardRepository, CoreError, InstallmentEngine, PlanFields, PlanRepository, WalletRepository,
};
use cofrinho_domain::{Category, CreditCard, InstallmentPlan, OwnerId, Wallet};
use cofrinho_storage_json::JsonWalletStorage;
use rust_decimal_macros::dec;
use tempfile::{tempdir, TempDir};

fn storage() -> (JsonWalletStorage, TempDir) {
    let dir = tempdir().expect("tempdir");
    let storage = JsonWalletStorage::new(dir.path().join("wallets"), dir.path().join("backups"))
        .expect("create storage");
    (storage, dir)
}

fn owner() -> OwnerId {
    OwnerId::new("ana").unwrap()
}

fn sofa() -> InstallmentPlan {
    InstallmentEngine::create_plan(
        "Sofá Novo",
        dec!(1000),
        4,
        NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
        Category::Compras,
    )
    .unwrap()
}

#[test]
fn missing_wallet_loads_empty() {
    let (storage, _dir) = storage();
    let wallet = storage.load_wallet(&owner()).expect("load");
    assert!(wallet.plans.is_empty());
    assert!(!storage.wallet_path(&owner()).exists());
}

#[test]
fn json_storage_round_trips_plans() {
    let (storage, _dir) = storage();
    let mut plan = sofa();
    let id = storage.create(&owner(), &plan).expect("create");

    InstallmentEngine::toggle_parcel_paid(&mut plan, 2).unwrap();
    storage
        .update(&owner(), id, &PlanFields::from(&plan))
        .expect("update");

    let listed = storage.list(&owner()).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].description, "Sofá Novo");
    assert_eq!(listed[0].installment_value, dec!(250));
    assert!(listed[0].is_paid(2));

    let raw = fs::read_to_string(storage.wallet_path(&owner())).unwrap();
    assert!(raw.contains("\"paid_parcels\": [\n"));
    assert!(raw.contains("\"category\": \"Compras\""));
}

#[test]
fn deleted_plan_is_gone_after_reload() {
    let (storage, _dir) = storage();
    let id = storage.create(&owner(), &sofa()).unwrap();
    storage.create(&owner(), &sofa()).unwrap();
    storage.delete(&owner(), id).expect("delete");

    let listed = storage.list(&owner()).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed.iter().all(|plan| plan.id != id));
}

#[test]
fn update_of_unknown_plan_is_not_found() {
    let (storage, _dir) = storage();
    let plan = sofa();
    let err = storage
        .update(&owner(), plan.id, &PlanFields::from(&plan))
        .unwrap_err();
    assert!(matches!(err, CoreError::PlanNotFound(_)));
}

#[test]
fn cards_share_the_wallet_file() {
    let (storage, _dir) = storage();
    storage.create(&owner(), &sofa()).unwrap();
    let card = CreditCard::new("Nubank", 10);
    storage.create_card(&owner(), &card).unwrap();

    let wallet = storage.load_wallet(&owner()).unwrap();
    assert_eq!(wallet.plans.len(), 1);
    assert_eq!(wallet.cards.len(), 1);

    storage.delete_card(&owner(), card.id).unwrap();
    assert!(storage.list_cards(&owner()).unwrap().is_empty());
    assert_eq!(WalletRepository::load_wallet(&storage, &owner()).unwrap().plans.len(), 1);
}

#[test]
fn out_of_range_paid_parcels_are_pruned_on_load() {
    let (storage, _dir) = storage();
    let plan = sofa();
    let mut wallet = Wallet::new(owner());
    wallet.add_plan(plan);
    storage.save_wallet(&wallet).unwrap();

    let path = storage.wallet_path(&owner());
    let raw = fs::read_to_string(&path).unwrap();
    let tampered = raw.replace("\"paid_parcels\": []", "\"paid_parcels\": [1, 1, 4, 9]");
    assert_ne!(raw, tampered);
    fs::write(&path, tampered).unwrap();

    let loaded = storage.load_wallet(&owner()).unwrap();
    let paid: Vec<u32> = loaded.plans[0].paid_parcels.iter().collect();
    assert_eq!(paid, vec![1, 4]);
}

#[test]
fn newer_schema_is_rejected() {
    let (storage, _dir) = storage();
    let mut wallet = Wallet::new(owner());
    wallet.schema_version = 99;
    storage.save_wallet(&wallet).unwrap();

    let err = storage.load_wallet(&owner()).unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedSchema(99)));
    let err = storage.list(&owner()).unwrap_err();
    assert!(err.is_persistence());
}

#[test]
fn backups_are_listed_restored_and_pruned() {
    let dir = tempdir().expect("tempdir");
    let storage =
        JsonWalletStorage::with_retention(dir.path().join("wallets"), dir.path().join("backups"), 3)
            .unwrap();
    let mut wallet = Wallet::new(owner());
    wallet.add_plan(sofa());
    storage.save_wallet(&wallet).unwrap();

    let backup_dir = dir.path().join("backups").join("ana");
    fs::create_dir_all(&backup_dir).unwrap();
    for stamp in ["20200101_000000", "20200102_000000", "20200103_000000"] {
        fs::write(backup_dir.join(format!("ana_{stamp}.json")), "{}").unwrap();
    }

    let info = storage.backup_wallet(&wallet, Some("antes de editar")).unwrap();
    assert!(info.id.ends_with("_antes-de-editar.json"));

    let backups = storage.list_backups(&owner()).unwrap();
    assert_eq!(backups.len(), 3);
    assert_eq!(backups[0].id, info.id);
    assert!(backups.iter().all(|entry| entry.id != "ana_20200101_000000.json"));

    wallet.plans.clear();
    storage.save_wallet(&wallet).unwrap();
    let restored = storage.restore_backup(&owner(), &info).unwrap();
    assert_eq!(restored.plans.len(), 1);
}
