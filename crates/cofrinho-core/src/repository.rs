//! Owner-scoped persistence seams and an in-memory implementation.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use cofrinho_domain::{
    CardId, Category, CreditCard, InstallmentPlan, OwnerId, PaidParcels, PlanId, Wallet,
};

use crate::CoreError;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Mutable fields of a plan record sent on update.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanFields {
    pub description: String,
    pub total_value: Decimal,
    pub installments_count: u32,
    pub installment_value: Decimal,
    pub start_date: NaiveDate,
    pub category: Category,
    pub paid_parcels: PaidParcels,
}

impl From<&InstallmentPlan> for PlanFields {
    fn from(plan: &InstallmentPlan) -> Self {
        Self {
            description: plan.description.clone(),
            total_value: plan.total_value,
            installments_count: plan.installments_count,
            installment_value: plan.installment_value,
            start_date: plan.start_date,
            category: plan.category,
            paid_parcels: plan.paid_parcels.clone(),
        }
    }
}

impl PlanFields {
    pub fn apply_to(&self, plan: &mut InstallmentPlan) {
        plan.description = self.description.clone();
        plan.total_value = self.total_value;
        plan.installments_count = self.installments_count;
        plan.installment_value = self.installment_value;
        plan.start_date = self.start_date;
        plan.category = self.category;
        plan.paid_parcels = self.paid_parcels.clone();
        plan.touch();
    }
}

/// Durable store of plan records, scoped to an authenticated owner.
pub trait PlanRepository: Send + Sync {
    fn list(&self, owner: &OwnerId) -> Result<Vec<InstallmentPlan>>;
    fn create(&self, owner: &OwnerId, plan: &InstallmentPlan) -> Result<PlanId>;
    fn update(&self, owner: &OwnerId, id: PlanId, fields: &PlanFields) -> Result<()>;
    /// Deleting an id that is already gone succeeds.
    fn delete(&self, owner: &OwnerId, id: PlanId) -> Result<()>;
}

pub trait CardRepository: Send + Sync {
    fn list_cards(&self, owner: &OwnerId) -> Result<Vec<CreditCard>>;
    fn create_card(&self, owner: &OwnerId, card: &CreditCard) -> Result<CardId>;
    fn update_card(&self, owner: &OwnerId, card: &CreditCard) -> Result<()>;
    fn delete_card(&self, owner: &OwnerId, id: CardId) -> Result<()>;
}

/// A store able to hold both plans and cards of a wallet.
pub trait WalletRepository: PlanRepository + CardRepository {
    /// Rebuilds the owner's wallet from the stored plans and cards.
    fn load_wallet(&self, owner: &OwnerId) -> Result<Wallet> {
        let mut wallet = Wallet::new(owner.clone());
        wallet.plans = self.list(owner)?;
        wallet.cards = self.list_cards(owner)?;
        Ok(wallet)
    }
}

impl<T: PlanRepository + CardRepository> WalletRepository for T {}

/// Shared read-modify-write steps used by wallet-backed repositories.
pub mod wallet_ops {
    use super::*;

    pub fn create_plan(wallet: &mut Wallet, plan: &InstallmentPlan) -> PlanId {
        wallet.add_plan(plan.clone())
    }

    pub fn update_plan(wallet: &mut Wallet, id: PlanId, fields: &PlanFields) -> Result<()> {
        let plan = wallet.plan_mut(id).ok_or(CoreError::PlanNotFound(id))?;
        fields.apply_to(plan);
        wallet.touch();
        Ok(())
    }

    pub fn delete_plan(wallet: &mut Wallet, id: PlanId) {
        wallet.remove_plan(id);
    }

    pub fn create_card(wallet: &mut Wallet, card: &CreditCard) -> CardId {
        wallet.add_card(card.clone())
    }

    pub fn update_card(wallet: &mut Wallet, card: &CreditCard) -> Result<()> {
        let stored = wallet.card_mut(card.id).ok_or(CoreError::CardNotFound(card.id))?;
        *stored = card.clone();
        wallet.touch();
        Ok(())
    }

    pub fn delete_card(wallet: &mut Wallet, id: CardId) {
        wallet.remove_card(id);
    }
}

/// Process-local repository keyed by owner.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    wallets: Mutex<HashMap<OwnerId, Wallet>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<OwnerId, Wallet>>> {
        self.wallets
            .lock()
            .map_err(|_| CoreError::Persistence("in-memory store lock poisoned".into()))
    }

    fn with_wallet<T>(
        &self,
        owner: &OwnerId,
        f: impl FnOnce(&mut Wallet) -> Result<T>,
    ) -> Result<T> {
        let mut wallets = self.lock()?;
        let wallet = wallets
            .entry(owner.clone())
            .or_insert_with(|| Wallet::new(owner.clone()));
        f(wallet)
    }
}

impl PlanRepository for InMemoryRepository {
    fn list(&self, owner: &OwnerId) -> Result<Vec<InstallmentPlan>> {
        let wallets = self.lock()?;
        Ok(wallets
            .get(owner)
            .map(|wallet| wallet.plans.clone())
            .unwrap_or_default())
    }

    fn create(&self, owner: &OwnerId, plan: &InstallmentPlan) -> Result<PlanId> {
        self.with_wallet(owner, |wallet| Ok(wallet_ops::create_plan(wallet, plan)))
    }

    fn update(&self, owner: &OwnerId, id: PlanId, fields: &PlanFields) -> Result<()> {
        self.with_wallet(owner, |wallet| wallet_ops::update_plan(wallet, id, fields))
    }

    fn delete(&self, owner: &OwnerId, id: PlanId) -> Result<()> {
        self.with_wallet(owner, |wallet| {
            wallet_ops::delete_plan(wallet, id);
            Ok(())
        })
    }
}

impl CardRepository for InMemoryRepository {
    fn list_cards(&self, owner: &OwnerId) -> Result<Vec<CreditCard>> {
        let wallets = self.lock()?;
        Ok(wallets
            .get(owner)
            .map(|wallet| wallet.cards.clone())
            .unwrap_or_default())
    }

    fn create_card(&self, owner: &OwnerId, card: &CreditCard) -> Result<CardId> {
        self.with_wallet(owner, |wallet| Ok(wallet_ops::create_card(wallet, card)))
    }

    fn update_card(&self, owner: &OwnerId, card: &CreditCard) -> Result<()> {
        self.with_wallet(owner, |wallet| wallet_ops::update_card(wallet, card))
    }

    fn delete_card(&self, owner: &OwnerId, id: CardId) -> Result<()> {
        self.with_wallet(owner, |wallet| {
            wallet_ops::delete_card(wallet, id);
            Ok(())
        })
    }
}
