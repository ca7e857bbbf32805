//! Validated CRUD helpers for the plans held by a [`Wallet`].

use tracing::warn;

use cofrinho_domain::{ContractPolicy, InstallmentPlan, PlanDraft, PlanId, Wallet};

use crate::{engine::TermsUpdate, CoreError, InstallmentEngine};

/// Result of a toggle request once the contract policy has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Paid,
    Unpaid,
    /// The parcel was out of range and the lenient policy turned the request into a no-op.
    Ignored,
}

pub struct PlanService;

impl PlanService {
    /// Builds a plan from `draft` and stores it at the front of the wallet.
    pub fn create(wallet: &mut Wallet, draft: &PlanDraft) -> Result<PlanId, CoreError> {
        let plan = InstallmentEngine::create_from_draft(draft)?;
        Ok(Self::add(wallet, plan))
    }

    pub fn add(wallet: &mut Wallet, plan: InstallmentPlan) -> PlanId {
        wallet.add_plan(plan)
    }

    pub fn get(wallet: &Wallet, id: PlanId) -> Result<&InstallmentPlan, CoreError> {
        wallet.plan(id).ok_or(CoreError::PlanNotFound(id))
    }

    pub fn list(wallet: &Wallet) -> Vec<&InstallmentPlan> {
        wallet.plans.iter().collect()
    }

    pub fn edit(wallet: &mut Wallet, id: PlanId, draft: &PlanDraft) -> Result<TermsUpdate, CoreError> {
        let plan = wallet.plan_mut(id).ok_or(CoreError::PlanNotFound(id))?;
        let update = InstallmentEngine::edit_plan(plan, draft)?;
        wallet.touch();
        Ok(update)
    }

    /// Toggles a parcel, surfacing out-of-range parcels according to `policy`.
    pub fn toggle_parcel(
        wallet: &mut Wallet,
        id: PlanId,
        parcel: u32,
        policy: ContractPolicy,
    ) -> Result<ToggleOutcome, CoreError> {
        let plan = wallet.plan_mut(id).ok_or(CoreError::PlanNotFound(id))?;
        match InstallmentEngine::toggle_parcel_paid(plan, parcel) {
            Ok(true) => {
                wallet.touch();
                Ok(ToggleOutcome::Paid)
            }
            Ok(false) => {
                wallet.touch();
                Ok(ToggleOutcome::Unpaid)
            }
            Err(err @ CoreError::IndexOutOfRange { .. }) if policy == ContractPolicy::Lenient => {
                warn!(plan = %id, parcel, error = %err, "ignoring toggle for unknown parcel");
                Ok(ToggleOutcome::Ignored)
            }
            Err(err) => Err(err),
        }
    }

    /// Removes the plan and returns it.
    pub fn remove(wallet: &mut Wallet, id: PlanId) -> Result<InstallmentPlan, CoreError> {
        wallet.remove_plan(id).ok_or(CoreError::PlanNotFound(id))
    }
}
