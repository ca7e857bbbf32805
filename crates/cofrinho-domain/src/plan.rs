//! Domain models for purchases financed over monthly parcels.

use std::{collections::BTreeSet, fmt, ops::RangeInclusive};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{category::Category, common::*};

/// A purchase paid over `installments_count` monthly parcels.
///
/// `installment_value` is stored rather than derived so that a plan keeps the value it was
/// created (or last edited) with even if rounding rules change later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstallmentPlan {
    pub id: PlanId,
    pub description: String,
    pub total_value: Decimal,
    pub installments_count: u32,
    pub installment_value: Decimal,
    pub start_date: NaiveDate,
    pub category: Category,
    #[serde(default)]
    pub paid_parcels: PaidParcels,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl InstallmentPlan {
    /// Builds a plan from already-validated parts with no parcels paid.
    pub fn new(
        description: impl Into<String>,
        total_value: Decimal,
        installments_count: u32,
        installment_value: Decimal,
        start_date: NaiveDate,
        category: Category,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            total_value,
            installments_count,
            installment_value,
            start_date,
            category,
            paid_parcels: PaidParcels::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Valid 1-based parcel numbers for this plan.
    pub fn parcel_numbers(&self) -> RangeInclusive<u32> {
        1..=self.installments_count
    }

    pub fn has_parcel(&self, parcel: u32) -> bool {
        self.parcel_numbers().contains(&parcel)
    }

    pub fn is_paid(&self, parcel: u32) -> bool {
        self.paid_parcels.contains(parcel)
    }

    /// Drops paid parcel numbers outside the plan's range, returning what was removed.
    pub fn prune_paid_parcels(&mut self) -> Vec<u32> {
        self.paid_parcels.retain_within(self.installments_count)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for InstallmentPlan {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for InstallmentPlan {
    fn name(&self) -> &str {
        &self.description
    }
}

impl Displayable for InstallmentPlan {
    fn display_label(&self) -> String {
        format!(
            "{} ({}/{} pagas)",
            self.description,
            self.paid_parcels.len(),
            self.installments_count
        )
    }
}

/// Set of parcel numbers marked as paid. Serialized as a sorted array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PaidParcels(BTreeSet<u32>);

impl PaidParcels {
    pub fn contains(&self, parcel: u32) -> bool {
        self.0.contains(&parcel)
    }

    /// Flips the paid state of `parcel`, returning `true` when it is now paid.
    pub fn toggle(&mut self, parcel: u32) -> bool {
        if self.0.remove(&parcel) {
            false
        } else {
            self.0.insert(parcel);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn highest(&self) -> Option<u32> {
        self.0.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Keeps only parcels in `[1, count]`, returning the removed numbers in ascending order.
    pub fn retain_within(&mut self, count: u32) -> Vec<u32> {
        let dropped: Vec<u32> = self
            .0
            .iter()
            .copied()
            .filter(|parcel| *parcel == 0 || *parcel > count)
            .collect();
        for parcel in &dropped {
            self.0.remove(parcel);
        }
        dropped
    }
}

impl FromIterator<u32> for PaidParcels {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Payment status derived from a plan's progress. Never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanStatus {
    NotStarted,
    InProgress,
    FullyPaid,
}

impl PlanStatus {
    pub fn from_counts(paid: usize, total: u32) -> Self {
        if paid == 0 {
            PlanStatus::NotStarted
        } else if paid as u64 >= total as u64 {
            PlanStatus::FullyPaid
        } else {
            PlanStatus::InProgress
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlanStatus::NotStarted => "Não iniciado",
            PlanStatus::InProgress => "Em andamento",
            PlanStatus::FullyPaid => "Quitado",
        };
        f.write_str(label)
    }
}

/// User-supplied fields for creating or editing a plan, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
    pub description: String,
    pub total_value: Decimal,
    pub installments_count: u32,
    pub start_date: NaiveDate,
    pub category: Category,
}

impl PlanDraft {
    pub fn new(
        description: impl Into<String>,
        total_value: Decimal,
        installments_count: u32,
        start_date: NaiveDate,
        category: Category,
    ) -> Self {
        Self {
            description: description.into(),
            total_value,
            installments_count,
            start_date,
            category,
        }
    }

    /// Captures the editable fields of an existing plan.
    pub fn from_plan(plan: &InstallmentPlan) -> Self {
        Self {
            description: plan.description.clone(),
            total_value: plan.total_value,
            installments_count: plan.installments_count,
            start_date: plan.start_date,
            category: plan.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_plan() -> InstallmentPlan {
        InstallmentPlan::new(
            "Sofá Novo",
            dec!(1000.00),
            4,
            dec!(250.00),
            NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
            Category::Compras,
        )
    }

    #[test]
    fn paid_parcels_toggle_is_self_inverse() {
        let mut parcels = PaidParcels::default();
        assert!(parcels.toggle(3));
        assert!(parcels.contains(3));
        assert!(!parcels.toggle(3));
        assert!(parcels.is_empty());
    }

    #[test]
    fn retain_within_reports_dropped_parcels() {
        let mut parcels: PaidParcels = [1, 2, 5, 7].into_iter().collect();
        assert_eq!(parcels.retain_within(4), vec![5, 7]);
        assert_eq!(parcels.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(parcels.highest(), Some(2));
    }

    #[test]
    fn paid_parcels_serialize_sorted_and_deduplicate_on_load() {
        let parcels: PaidParcels = [4, 1, 2].into_iter().collect();
        assert_eq!(serde_json::to_string(&parcels).unwrap(), "[1,2,4]");

        let loaded: PaidParcels = serde_json::from_str("[2,2,1]").unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn plan_prunes_out_of_range_parcels() {
        let mut plan = sample_plan();
        plan.paid_parcels = [0, 1, 4, 9].into_iter().collect();
        assert_eq!(plan.prune_paid_parcels(), vec![0, 9]);
        assert!(plan.is_paid(1) && plan.is_paid(4));
        assert!(plan.has_parcel(4) && !plan.has_parcel(5));
    }

    #[test]
    fn plan_loads_without_timestamps() {
        let plan = sample_plan();
        let mut value = serde_json::to_value(&plan).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("created_at");
        object.remove("updated_at");
        object.remove("paid_parcels");
        let loaded: InstallmentPlan = serde_json::from_value(value).unwrap();
        assert_eq!(loaded.id, plan.id);
        assert!(loaded.paid_parcels.is_empty());
    }

    #[test]
    fn status_follows_paid_count() {
        assert_eq!(PlanStatus::from_counts(0, 4), PlanStatus::NotStarted);
        assert_eq!(PlanStatus::from_counts(2, 4), PlanStatus::InProgress);
        assert_eq!(PlanStatus::from_counts(4, 4), PlanStatus::FullyPaid);
    }
}
