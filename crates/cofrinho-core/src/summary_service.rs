use rust_decimal::Decimal;

use cofrinho_domain::{PlanStatus, Wallet};

use crate::InstallmentEngine;

/// Totals across every plan of a wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletSummary {
    pub plan_count: usize,
    pub fully_paid_count: usize,
    pub total_financed: Decimal,
    pub total_paid: Decimal,
    pub total_remaining: Decimal,
    /// Installment values of the plans that still have unpaid parcels.
    pub monthly_commitment: Decimal,
}

pub struct SummaryService;

impl SummaryService {
    pub fn wallet_summary(wallet: &Wallet) -> WalletSummary {
        let mut summary = WalletSummary {
            plan_count: wallet.plans.len(),
            fully_paid_count: 0,
            total_financed: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            total_remaining: Decimal::ZERO,
            monthly_commitment: Decimal::ZERO,
        };
        for plan in &wallet.plans {
            let plan_summary = InstallmentEngine::summarize(plan);
            summary.total_financed = summary.total_financed.saturating_add(plan.total_value);
            summary.total_paid = summary.total_paid.saturating_add(plan_summary.paid_amount);
            summary.total_remaining =
                summary.total_remaining.saturating_add(plan_summary.remaining_balance);
            if plan_summary.status == PlanStatus::FullyPaid {
                summary.fully_paid_count += 1;
            } else {
                summary.monthly_commitment =
                    summary.monthly_commitment.saturating_add(plan.installment_value);
            }
        }
        summary
    }
}
