//! Parcel scheduling, paid-state tracking, and derived figures for installment plans.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use cofrinho_domain::{
    calendar::add_months_clamped,
    money::{round_currency, MAX_TOTAL_VALUE},
    Category, InstallmentPlan, PlanDraft, PlanStatus,
};

use crate::CoreError;

/// Figures derived from a plan's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub paid_count: usize,
    pub remaining_count: u32,
    pub paid_amount: Decimal,
    pub remaining_balance: Decimal,
    pub progress_percent: Decimal,
    pub status: PlanStatus,
}

/// One row of a plan's payment schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelLine {
    pub number: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub paid: bool,
}

/// Outcome of changing a plan's total or parcel count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermsUpdate {
    pub previous_installment_value: Decimal,
    pub installment_value: Decimal,
    /// Paid parcel numbers that no longer exist under the new count.
    pub dropped_parcels: Vec<u32>,
}

/// Stateless operations over [`InstallmentPlan`] values.
pub struct InstallmentEngine;

impl InstallmentEngine {
    /// Validates the inputs and builds a plan with no parcels paid.
    pub fn create_plan(
        description: &str,
        total_value: Decimal,
        installments_count: u32,
        start_date: NaiveDate,
        category: Category,
    ) -> Result<InstallmentPlan, CoreError> {
        let description = validate_description(description)?;
        let installment_value = Self::installment_value(total_value, installments_count)?;
        let plan = InstallmentPlan::new(
            description,
            total_value,
            installments_count,
            installment_value,
            start_date,
            category,
        );
        debug!(plan = %plan.id, %installment_value, "installment plan created");
        Ok(plan)
    }

    pub fn create_from_draft(draft: &PlanDraft) -> Result<InstallmentPlan, CoreError> {
        Self::create_plan(
            &draft.description,
            draft.total_value,
            draft.installments_count,
            draft.start_date,
            draft.category,
        )
    }

    /// `total_value / installments_count` rounded half-up to cents, after validating both.
    pub fn installment_value(
        total_value: Decimal,
        installments_count: u32,
    ) -> Result<Decimal, CoreError> {
        if total_value <= Decimal::ZERO {
            return Err(CoreError::Validation(
                "total value must be greater than zero".into(),
            ));
        }
        if total_value > MAX_TOTAL_VALUE {
            return Err(CoreError::Validation(format!(
                "total value must not exceed {MAX_TOTAL_VALUE}"
            )));
        }
        if installments_count < 1 {
            return Err(CoreError::Validation(
                "installments count must be at least 1".into(),
            ));
        }
        let value = round_currency(total_value / Decimal::from(installments_count));
        if value <= Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "{total_value} over {installments_count} parcels rounds to zero per parcel"
            )));
        }
        Ok(value)
    }

    /// Due date of `parcel`: the start date advanced `parcel - 1` months, clamped to month end.
    pub fn parcel_due_date(plan: &InstallmentPlan, parcel: u32) -> Result<NaiveDate, CoreError> {
        ensure_in_range(plan, parcel)?;
        let offset = i32::try_from(parcel - 1).map_err(|_| out_of_range(plan, parcel))?;
        add_months_clamped(plan.start_date, offset).ok_or_else(|| out_of_range(plan, parcel))
    }

    /// Flips the paid state of `parcel`, returning `true` when it is now paid.
    pub fn toggle_parcel_paid(plan: &mut InstallmentPlan, parcel: u32) -> Result<bool, CoreError> {
        ensure_in_range(plan, parcel)?;
        let paid = plan.paid_parcels.toggle(parcel);
        plan.touch();
        debug!(plan = %plan.id, parcel, paid, "parcel toggled");
        Ok(paid)
    }

    pub fn summarize(plan: &InstallmentPlan) -> PlanSummary {
        let paid_count = plan.paid_parcels.len();
        let paid = Decimal::from(paid_count as u64);
        // Stored plans skip create-time validation, so saturate instead of panicking.
        let paid_amount = paid.saturating_mul(plan.installment_value);
        let progress_percent = if plan.installments_count == 0 {
            Decimal::ZERO
        } else {
            (paid * Decimal::ONE_HUNDRED / Decimal::from(plan.installments_count))
                .max(Decimal::ZERO)
        };
        PlanSummary {
            paid_count,
            remaining_count: plan
                .installments_count
                .saturating_sub(u32::try_from(paid_count).unwrap_or(u32::MAX)),
            paid_amount,
            remaining_balance: plan.total_value.saturating_sub(paid_amount),
            progress_percent,
            status: PlanStatus::from_counts(paid_count, plan.installments_count),
        }
    }

    /// Replaces the plan's total and parcel count, recomputing the stored installment value.
    ///
    /// Paid parcels above the new count are dropped and reported; the others stay paid.
    pub fn update_plan_terms(
        plan: &mut InstallmentPlan,
        total_value: Decimal,
        installments_count: u32,
    ) -> Result<TermsUpdate, CoreError> {
        let installment_value = Self::installment_value(total_value, installments_count)?;
        let previous_installment_value = plan.installment_value;

        plan.total_value = total_value;
        plan.installments_count = installments_count;
        plan.installment_value = installment_value;
        let dropped_parcels = plan.prune_paid_parcels();
        if !dropped_parcels.is_empty() {
            warn!(
                plan = %plan.id,
                count = installments_count,
                dropped = ?dropped_parcels,
                "paid parcels beyond the new count were dropped"
            );
        }
        plan.touch();

        Ok(TermsUpdate {
            previous_installment_value,
            installment_value,
            dropped_parcels,
        })
    }

    /// Applies every editable field of `draft`. On error the plan is left untouched.
    pub fn edit_plan(plan: &mut InstallmentPlan, draft: &PlanDraft) -> Result<TermsUpdate, CoreError> {
        let description = validate_description(&draft.description)?;
        Self::installment_value(draft.total_value, draft.installments_count)?;

        let update = Self::update_plan_terms(plan, draft.total_value, draft.installments_count)?;
        plan.description = description;
        plan.start_date = draft.start_date;
        plan.category = draft.category;
        Ok(update)
    }

    /// Every parcel of the plan in order, valued at the current installment value.
    pub fn schedule(plan: &InstallmentPlan) -> Vec<ParcelLine> {
        plan.parcel_numbers()
            .map_while(|number| {
                let due_date = Self::parcel_due_date(plan, number).ok()?;
                Some(ParcelLine {
                    number,
                    due_date,
                    amount: plan.installment_value,
                    paid: plan.is_paid(number),
                })
            })
            .collect()
    }
}

fn validate_description(description: &str) -> Result<String, CoreError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("description must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

fn ensure_in_range(plan: &InstallmentPlan, parcel: u32) -> Result<(), CoreError> {
    if plan.has_parcel(parcel) {
        Ok(())
    } else {
        Err(out_of_range(plan, parcel))
    }
}

fn out_of_range(plan: &InstallmentPlan, parcel: u32) -> CoreError {
    CoreError::IndexOutOfRange {
        parcel,
        count: plan.installments_count,
    }
}
