//! Owner-scoped aggregate holding every plan and card of one account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{card::CreditCard, common::*, plan::InstallmentPlan};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub owner: OwnerId,
    #[serde(default)]
    pub plans: Vec<InstallmentPlan>,
    #[serde(default)]
    pub cards: Vec<CreditCard>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Wallet::schema_version_default")]
    pub schema_version: u8,
}

impl Wallet {
    pub fn new(owner: OwnerId) -> Self {
        let now = Utc::now();
        Self {
            owner,
            plans: Vec::new(),
            cards: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Inserts the plan at the front so the newest purchase is listed first.
    pub fn add_plan(&mut self, plan: InstallmentPlan) -> PlanId {
        let id = plan.id;
        self.plans.insert(0, plan);
        self.touch();
        id
    }

    pub fn plan(&self, id: PlanId) -> Option<&InstallmentPlan> {
        self.plans.iter().find(|plan| plan.id == id)
    }

    pub fn plan_mut(&mut self, id: PlanId) -> Option<&mut InstallmentPlan> {
        self.plans.iter_mut().find(|plan| plan.id == id)
    }

    pub fn remove_plan(&mut self, id: PlanId) -> Option<InstallmentPlan> {
        let index = self.plans.iter().position(|plan| plan.id == id)?;
        let removed = self.plans.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn add_card(&mut self, card: CreditCard) -> CardId {
        let id = card.id;
        self.cards.insert(0, card);
        self.touch();
        id
    }

    pub fn card(&self, id: CardId) -> Option<&CreditCard> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut CreditCard> {
        self.cards.iter_mut().find(|card| card.id == id)
    }

    pub fn remove_card(&mut self, id: CardId) -> Option<CreditCard> {
        let index = self.cards.iter().position(|card| card.id == id)?;
        let removed = self.cards.remove(index);
        self.touch();
        Some(removed)
    }

    /// Repairs stored data that breaks plan invariants and describes each repair.
    pub fn normalize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        for plan in &mut self.plans {
            let dropped = plan.prune_paid_parcels();
            if !dropped.is_empty() {
                warnings.push(format!(
                    "plan {} had paid parcels {:?} outside 1..={}",
                    plan.id, dropped, plan.installments_count
                ));
            }
        }
        warnings
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn plan(description: &str) -> InstallmentPlan {
        InstallmentPlan::new(
            description,
            dec!(300),
            3,
            dec!(100),
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            Category::Casa,
        )
    }

    #[test]
    fn newest_plan_is_listed_first() {
        let mut wallet = Wallet::new(OwnerId::new("ana").unwrap());
        wallet.add_plan(plan("Geladeira"));
        let newest = wallet.add_plan(plan("Fogão"));
        assert_eq!(wallet.plans[0].id, newest);
    }

    #[test]
    fn remove_plan_returns_removed_record() {
        let mut wallet = Wallet::new(OwnerId::new("ana").unwrap());
        let id = wallet.add_plan(plan("Geladeira"));
        let removed = wallet.remove_plan(id).unwrap();
        assert_eq!(removed.description, "Geladeira");
        assert!(wallet.plan(id).is_none());
        assert!(wallet.remove_plan(id).is_none());
    }

    #[test]
    fn normalize_reports_pruned_parcels() {
        let mut wallet = Wallet::new(OwnerId::new("ana").unwrap());
        let mut broken = plan("Geladeira");
        broken.paid_parcels = [1, 8].into_iter().collect();
        wallet.add_plan(broken);
        let warnings = wallet.normalize();
        assert_eq!(warnings.len(), 1);
        assert_eq!(wallet.plans[0].paid_parcels.len(), 1);
    }
}
