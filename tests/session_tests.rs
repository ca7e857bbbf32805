mod common;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::NaiveDate;
use cofrinho::PlanSession;
use cofrinho_core::{
    CardRepository, CoreError, InMemoryRepository, PlanFields, PlanRepository, ToggleOutcome,
};
use cofrinho_domain::{
    CardDraft, CardId, CardStatus, CardStatusFilter, Category, ContractPolicy, CreditCard,
    InstallmentPlan, OwnerId, PlanDraft, PlanId, PlanStatus,
};
use common::{open_session, setup_test_env, test_home};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sofa() -> PlanDraft {
    PlanDraft::new("Sofá Novo", dec!(1000.00), 4, date(2026, 2, 3), Category::Compras)
}

/// Repository whose writes can be switched to fail, mimicking an unreachable store.
#[derive(Clone, Default)]
struct FlakyRepository {
    inner: Arc<InMemoryRepository>,
    offline: Arc<AtomicBool>,
}

impl FlakyRepository {
    fn check(&self) -> Result<(), CoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CoreError::Persistence("store offline".into()))
        } else {
            Ok(())
        }
    }
}

impl PlanRepository for FlakyRepository {
    fn list(&self, owner: &OwnerId) -> Result<Vec<InstallmentPlan>, CoreError> {
        self.inner.list(owner)
    }

    fn create(&self, owner: &OwnerId, plan: &InstallmentPlan) -> Result<PlanId, CoreError> {
        self.check()?;
        self.inner.create(owner, plan)
    }

    fn update(&self, owner: &OwnerId, id: PlanId, fields: &PlanFields) -> Result<(), CoreError> {
        self.check()?;
        self.inner.update(owner, id, fields)
    }

    fn delete(&self, owner: &OwnerId, id: PlanId) -> Result<(), CoreError> {
        self.check()?;
        self.inner.delete(owner, id)
    }
}

impl CardRepository for FlakyRepository {
    fn list_cards(&self, owner: &OwnerId) -> Result<Vec<CreditCard>, CoreError> {
        self.inner.list_cards(owner)
    }

    fn create_card(&self, owner: &OwnerId, card: &CreditCard) -> Result<CardId, CoreError> {
        self.check()?;
        self.inner.create_card(owner, card)
    }

    fn update_card(&self, owner: &OwnerId, card: &CreditCard) -> Result<(), CoreError> {
        self.check()?;
        self.inner.update_card(owner, card)
    }

    fn delete_card(&self, owner: &OwnerId, id: CardId) -> Result<(), CoreError> {
        self.check()?;
        self.inner.delete_card(owner, id)
    }
}

#[test]
fn failed_save_is_reported_and_memory_is_kept() {
    let repo = FlakyRepository::default();
    let owner = OwnerId::new("ana").unwrap();
    let mut session =
        PlanSession::open(owner.clone(), Box::new(repo.clone()), ContractPolicy::Strict).unwrap();
    let id = session.create_plan(&sofa()).unwrap();

    repo.offline.store(true, Ordering::SeqCst);
    let err = session.toggle_parcel(id, 1).unwrap_err();
    assert!(matches!(err, CoreError::Persistence(_)));
    assert!(session.plan(id).unwrap().is_paid(1));

    let stored = repo.inner.list(&owner).unwrap();
    assert!(!stored[0].is_paid(1));

    repo.offline.store(false, Ordering::SeqCst);
    session.reload().unwrap();
    assert!(!session.plan(id).unwrap().is_paid(1));
}

#[test]
fn failed_create_keeps_plan_in_memory() {
    let repo = FlakyRepository::default();
    repo.offline.store(true, Ordering::SeqCst);
    let mut session = PlanSession::open(
        OwnerId::new("ana").unwrap(),
        Box::new(repo.clone()),
        ContractPolicy::Strict,
    )
    .unwrap();

    assert!(session.create_plan(&sofa()).unwrap_err().is_persistence());
    assert_eq!(session.plans().len(), 1);
}

#[test]
fn json_session_survives_reopen() {
    let (mut session, _config, base) = setup_test_env();
    let id = session.create_plan(&sofa()).unwrap();
    assert_eq!(session.toggle_parcel(id, 1).unwrap(), ToggleOutcome::Paid);
    assert_eq!(session.toggle_parcel(id, 2).unwrap(), ToggleOutcome::Paid);

    let reopened = open_session(&base, ContractPolicy::Strict);
    let summary = reopened.summary(id).unwrap();
    assert_eq!(summary.paid_count, 2);
    assert_eq!(summary.paid_amount, dec!(500.00));
    assert_eq!(summary.remaining_balance, dec!(500.00));
    assert_eq!(summary.progress_percent, dec!(50));
    assert_eq!(summary.status, PlanStatus::InProgress);
}

#[test]
fn deleted_plan_stays_deleted() {
    let base = test_home();
    let mut session = open_session(&base, ContractPolicy::Strict);
    let keep = session.create_plan(&sofa()).unwrap();
    let gone = session
        .create_plan(&PlanDraft::new("TV", dec!(2400), 12, date(2026, 3, 1), Category::Lazer))
        .unwrap();
    session.delete_plan(gone).unwrap();

    let reopened = open_session(&base, ContractPolicy::Strict);
    let ids: Vec<_> = reopened.plans().iter().map(|plan| plan.id).collect();
    assert_eq!(ids, vec![keep]);
}

#[test]
fn lenient_session_ignores_unknown_parcels() {
    let base = test_home();
    let mut session = open_session(&base, ContractPolicy::Lenient);
    let id = session.create_plan(&sofa()).unwrap();

    assert_eq!(session.toggle_parcel(id, 5).unwrap(), ToggleOutcome::Ignored);
    assert_eq!(session.toggle_parcel(id, 0).unwrap(), ToggleOutcome::Ignored);
    assert!(session.plan(id).unwrap().paid_parcels.is_empty());

    let mut strict = open_session(&base, ContractPolicy::Strict);
    assert!(matches!(
        strict.toggle_parcel(id, 5),
        Err(CoreError::IndexOutOfRange { parcel: 5, count: 4 })
    ));
}

#[test]
fn shrinking_plan_reports_dropped_parcels() {
    let base = test_home();
    let mut session = open_session(&base, ContractPolicy::Strict);
    let id = session.create_plan(&sofa()).unwrap();
    for parcel in [1, 3, 4] {
        session.toggle_parcel(id, parcel).unwrap();
    }

    let mut draft = PlanDraft::from_plan(session.plan(id).unwrap());
    draft.installments_count = 2;
    let update = session.edit_plan(id, &draft).unwrap();
    assert_eq!(update.dropped_parcels, vec![3, 4]);
    assert_eq!(update.installment_value, dec!(500.00));

    let reopened = open_session(&base, ContractPolicy::Strict);
    let plan = reopened.plan(id).unwrap();
    assert_eq!(plan.installments_count, 2);
    assert_eq!(plan.paid_parcels.iter().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn invalid_edit_leaves_plan_untouched() {
    let base = test_home();
    let mut session = open_session(&base, ContractPolicy::Strict);
    let id = session.create_plan(&sofa()).unwrap();

    let mut draft = PlanDraft::from_plan(session.plan(id).unwrap());
    draft.description = "   ".into();
    draft.installments_count = 10;
    assert!(matches!(
        session.edit_plan(id, &draft),
        Err(CoreError::Validation(_))
    ));
    let plan = session.plan(id).unwrap();
    assert_eq!(plan.description, "Sofá Novo");
    assert_eq!(plan.installments_count, 4);
}

#[test]
fn cards_are_persisted_with_status() {
    let base = test_home();
    let mut session = open_session(&base, ContractPolicy::Strict);
    let id = session
        .add_card(CardDraft {
            name: "Nubank".into(),
            last_digits: Some("4455".into()),
            due_day: 10,
            ..CardDraft::default()
        })
        .unwrap();
    session.set_card_status(id, CardStatus::Inactive).unwrap();

    let reopened = open_session(&base, ContractPolicy::Strict);
    assert!(reopened
        .search_cards("", CardStatusFilter::Only(CardStatus::Active))
        .is_empty());
    let found = reopened.search_cards("4455", CardStatusFilter::All);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].status, CardStatus::Inactive);
}
