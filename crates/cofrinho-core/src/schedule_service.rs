//! Calendar view over every parcel of a wallet.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use cofrinho_domain::{calendar::days_in_month, Category, PlanId, Wallet};

use crate::InstallmentEngine;

const DUE_SOON_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParcelStatus {
    Paid,
    Overdue,
    DueSoon,
    Upcoming,
}

impl ParcelStatus {
    fn classify(paid: bool, due_date: NaiveDate, today: NaiveDate) -> ParcelStatus {
        if paid {
            return ParcelStatus::Paid;
        }
        if due_date < today {
            return ParcelStatus::Overdue;
        }
        if due_date <= today + Duration::days(DUE_SOON_WINDOW_DAYS) {
            ParcelStatus::DueSoon
        } else {
            ParcelStatus::Upcoming
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParcelStatus::Paid => "Pago",
            ParcelStatus::Overdue => "Atrasado",
            ParcelStatus::DueSoon => "Vence em breve",
            ParcelStatus::Upcoming => "A vencer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledParcel {
    pub plan_id: PlanId,
    pub description: String,
    pub category: Category,
    pub number: u32,
    pub installments_count: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub status: ParcelStatus,
}

pub struct ScheduleService;

impl ScheduleService {
    /// Parcels of every plan due within `start..=end`, ordered by due date.
    pub fn parcels_between(
        wallet: &Wallet,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Vec<ScheduledParcel> {
        if end < start {
            return Vec::new();
        }
        let mut parcels: Vec<ScheduledParcel> = wallet
            .plans
            .iter()
            .flat_map(|plan| {
                InstallmentEngine::schedule(plan)
                    .into_iter()
                    .filter(|line| line.due_date >= start && line.due_date <= end)
                    .map(move |line| ScheduledParcel {
                        plan_id: plan.id,
                        description: plan.description.clone(),
                        category: plan.category,
                        number: line.number,
                        installments_count: plan.installments_count,
                        due_date: line.due_date,
                        amount: line.amount,
                        status: ParcelStatus::classify(line.paid, line.due_date, today),
                    })
            })
            .collect();
        parcels.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| a.description.cmp(&b.description))
                .then_with(|| a.number.cmp(&b.number))
        });
        parcels
    }

    /// First and last day of the given month.
    pub fn month_window(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)?)?;
        Some((first, last))
    }

    /// Sum of the unpaid parcels in `parcels`.
    pub fn amount_due(parcels: &[ScheduledParcel]) -> Decimal {
        parcels
            .iter()
            .filter(|parcel| parcel.status != ParcelStatus::Paid)
            .map(|parcel| parcel.amount)
            .sum()
    }
}
