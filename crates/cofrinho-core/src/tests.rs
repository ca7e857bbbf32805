use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use cofrinho_domain::{Category, ContractPolicy, OwnerId, PlanDraft, PlanStatus, Wallet};

use crate::{
    format::{BrlFormatter, CurrencyFormatter},
    CoreError, InMemoryRepository, InstallmentEngine, PlanFields, PlanRepository, PlanService,
    SummaryService, ToggleOutcome, WalletRepository,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn sofa_scenario_end_to_end() {
    let mut wallet = Wallet::new(OwnerId::new("ana").unwrap());
    let id = PlanService::create(
        &mut wallet,
        &PlanDraft::new("Sofá Novo", dec!(1000.00), 4, date(2026, 2, 3), Category::Compras),
    )
    .unwrap();
    for parcel in [1, 2] {
        PlanService::toggle_parcel(&mut wallet, id, parcel, ContractPolicy::Strict).unwrap();
    }

    let plan = PlanService::get(&wallet, id).unwrap();
    let summary = InstallmentEngine::summarize(plan);
    assert_eq!(plan.installment_value, dec!(250.00));
    assert_eq!(summary.paid_count, 2);
    assert_eq!(summary.paid_amount, dec!(500.00));
    assert_eq!(summary.remaining_balance, dec!(500.00));
    assert_eq!(summary.progress_percent, dec!(50));
    assert_eq!(summary.status, PlanStatus::InProgress);
}

#[test]
fn fully_paid_car_reports_rounding_drift() {
    let mut wallet = Wallet::new(OwnerId::new("ana").unwrap());
    let id = PlanService::create(
        &mut wallet,
        &PlanDraft::new("Carro", dec!(20000.00), 36, date(2026, 1, 10), Category::Transporte),
    )
    .unwrap();
    for parcel in 1..=36 {
        PlanService::toggle_parcel(&mut wallet, id, parcel, ContractPolicy::Strict).unwrap();
    }

    let summary = InstallmentEngine::summarize(PlanService::get(&wallet, id).unwrap());
    assert_eq!(summary.paid_amount, dec!(20000.16));
    assert_eq!(summary.remaining_balance, dec!(-0.16));
    assert_eq!(summary.status, PlanStatus::FullyPaid);
    assert_eq!(BrlFormatter.format_amount(summary.remaining_balance), "-R$ 0,16");

    let totals = SummaryService::wallet_summary(&wallet);
    assert_eq!(totals.fully_paid_count, 1);
    assert_eq!(totals.monthly_commitment, Decimal::ZERO);
}

#[test]
fn shrinking_terms_persists_pruned_paid_set() {
    let repo = InMemoryRepository::new();
    let owner = OwnerId::new("ana").unwrap();
    let mut plan = InstallmentEngine::create_plan(
        "Notebook",
        dec!(3000),
        10,
        date(2026, 4, 30),
        Category::Compras,
    )
    .unwrap();
    let id = repo.create(&owner, &plan).unwrap();
    for parcel in [1, 2, 8, 9] {
        InstallmentEngine::toggle_parcel_paid(&mut plan, parcel).unwrap();
    }

    let update = InstallmentEngine::update_plan_terms(&mut plan, dec!(3000), 6).unwrap();
    assert_eq!(update.dropped_parcels, vec![8, 9]);
    repo.update(&owner, id, &PlanFields::from(&plan)).unwrap();

    let wallet = repo.load_wallet(&owner).unwrap();
    let stored = wallet.plan(id).unwrap();
    assert_eq!(stored.installment_value, dec!(500));
    assert_eq!(stored.paid_parcels.iter().collect::<Vec<_>>(), vec![1, 2]);
    assert!(InstallmentEngine::summarize(stored).paid_count <= stored.installments_count as usize);
}

#[test]
fn deleted_plan_disappears_from_list() {
    let repo = InMemoryRepository::new();
    let owner = OwnerId::new("ana").unwrap();
    let start = date(2026, 5, 1);
    let table = InstallmentEngine::create_plan("Mesa", dec!(400), 2, start, Category::Casa).unwrap();
    let chair =
        InstallmentEngine::create_plan("Cadeira", dec!(200), 2, start, Category::Casa).unwrap();
    repo.create(&owner, &table).unwrap();
    let chair_id = repo.create(&owner, &chair).unwrap();

    repo.delete(&owner, chair_id).unwrap();
    let listed = repo.list(&owner).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed.iter().all(|plan| plan.id != chair_id));
}

#[test]
fn paid_count_never_exceeds_parcel_count() {
    for policy in [ContractPolicy::Strict, ContractPolicy::Lenient] {
        let mut wallet = Wallet::new(OwnerId::new("ana").unwrap());
        let count = 6;
        let id = PlanService::create(
            &mut wallet,
            &PlanDraft::new("Celular", dec!(2400), count, date(2026, 3, 15), Category::Compras),
        )
        .unwrap();

        // Two passes pay everything, then unpay everything.
        for pass in 0..2 {
            for parcel in 0..=count + 1 {
                let outcome = PlanService::toggle_parcel(&mut wallet, id, parcel, policy);
                let in_range = (1..=count).contains(&parcel);
                match (in_range, policy, outcome) {
                    (true, _, Ok(ToggleOutcome::Paid)) => assert_eq!(pass, 0),
                    (true, _, Ok(ToggleOutcome::Unpaid)) => assert_eq!(pass, 1),
                    (false, ContractPolicy::Lenient, Ok(ToggleOutcome::Ignored)) => {}
                    (false, ContractPolicy::Strict, Err(CoreError::IndexOutOfRange { .. })) => {}
                    other => panic!("unexpected toggle result for parcel {parcel}: {other:?}"),
                }

                let plan = PlanService::get(&wallet, id).unwrap();
                let summary = InstallmentEngine::summarize(plan);
                assert!(summary.paid_count <= plan.installments_count as usize);
                assert!(plan.paid_parcels.iter().all(|paid| plan.has_parcel(paid)));
            }
        }

        let plan = PlanService::get(&wallet, id).unwrap();
        assert!(plan.paid_parcels.is_empty());
    }
}
