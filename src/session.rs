use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, error};

use cofrinho_core::{
    time::{Clock, SystemClock},
    CardService, CoreError, InstallmentEngine, ParcelLine, PlanFields, PlanService, PlanSummary,
    ScheduleService, ScheduledParcel, SummaryService, TermsUpdate, ToggleOutcome, WalletRepository,
    WalletSummary,
};
use cofrinho_domain::{
    CardDraft, CardId, CardStatus, CardStatusFilter, ContractPolicy, CreditCard, InstallmentPlan,
    OwnerId, PlanDraft, PlanId, Wallet,
};

/// Facade that owns one owner's in-memory wallet and mirrors every mutation to the repository.
///
/// Mutations are applied in memory first. When the repository then fails, the error is
/// reported as [`CoreError::Persistence`] and the in-memory change is kept.
pub struct PlanSession {
    owner: OwnerId,
    wallet: Wallet,
    repository: Box<dyn WalletRepository>,
    policy: ContractPolicy,
    clock: Arc<dyn Clock>,
}

impl PlanSession {
    pub fn open(
        owner: OwnerId,
        repository: Box<dyn WalletRepository>,
        policy: ContractPolicy,
    ) -> Result<Self, CoreError> {
        let wallet = repository.load_wallet(&owner)?;
        debug!(owner = %owner, plans = wallet.plans.len(), %policy, "session opened");
        Ok(Self {
            owner,
            wallet,
            repository,
            policy,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn policy(&self) -> ContractPolicy {
        self.policy
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Plans, newest first.
    pub fn plans(&self) -> &[InstallmentPlan] {
        &self.wallet.plans
    }

    pub fn plan(&self, id: PlanId) -> Result<&InstallmentPlan, CoreError> {
        PlanService::get(&self.wallet, id)
    }

    pub fn create_plan(&mut self, draft: &PlanDraft) -> Result<PlanId, CoreError> {
        let id = PlanService::create(&mut self.wallet, draft)?;
        let plan = PlanService::get(&self.wallet, id)?;
        let result = self.repository.create(&self.owner, plan);
        self.persisted("create plan", result)?;
        Ok(id)
    }

    pub fn edit_plan(&mut self, id: PlanId, draft: &PlanDraft) -> Result<TermsUpdate, CoreError> {
        let update = PlanService::edit(&mut self.wallet, id, draft)?;
        self.push_plan(id, "edit plan")?;
        Ok(update)
    }

    /// Toggles a parcel under the session's contract policy.
    pub fn toggle_parcel(&mut self, id: PlanId, parcel: u32) -> Result<ToggleOutcome, CoreError> {
        let outcome = PlanService::toggle_parcel(&mut self.wallet, id, parcel, self.policy)?;
        if outcome != ToggleOutcome::Ignored {
            self.push_plan(id, "toggle parcel")?;
        }
        Ok(outcome)
    }

    pub fn delete_plan(&mut self, id: PlanId) -> Result<InstallmentPlan, CoreError> {
        let removed = PlanService::remove(&mut self.wallet, id)?;
        let result = self.repository.delete(&self.owner, id);
        self.persisted("delete plan", result)?;
        Ok(removed)
    }

    pub fn summary(&self, id: PlanId) -> Result<PlanSummary, CoreError> {
        Ok(InstallmentEngine::summarize(self.plan(id)?))
    }

    pub fn schedule(&self, id: PlanId) -> Result<Vec<ParcelLine>, CoreError> {
        Ok(InstallmentEngine::schedule(self.plan(id)?))
    }

    pub fn wallet_summary(&self) -> WalletSummary {
        SummaryService::wallet_summary(&self.wallet)
    }

    pub fn parcels_in_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<ScheduledParcel>, CoreError> {
        let (start, end) = ScheduleService::month_window(year, month)
            .ok_or_else(|| CoreError::Validation(format!("invalid month {year}-{month:02}")))?;
        Ok(ScheduleService::parcels_between(&self.wallet, start, end, self.today()))
    }

    /// Parcels due from today through the next `days` days.
    pub fn upcoming(&self, days: i64) -> Result<Vec<ScheduledParcel>, CoreError> {
        let today = self.today();
        let end = Duration::try_days(days)
            .and_then(|span| today.checked_add_signed(span))
            .ok_or_else(|| CoreError::Validation(format!("{days} days is beyond the calendar")))?;
        Ok(ScheduleService::parcels_between(&self.wallet, today, end, today))
    }

    pub fn cards(&self) -> &[CreditCard] {
        &self.wallet.cards
    }

    pub fn search_cards(&self, query: &str, filter: CardStatusFilter) -> Vec<&CreditCard> {
        CardService::search(&self.wallet, query, filter)
    }

    pub fn add_card(&mut self, draft: CardDraft) -> Result<CardId, CoreError> {
        let id = CardService::add(&mut self.wallet, draft)?;
        let card = self.wallet.card(id).ok_or(CoreError::CardNotFound(id))?;
        let result = self.repository.create_card(&self.owner, card);
        self.persisted("create card", result)?;
        Ok(id)
    }

    pub fn set_card_status(&mut self, id: CardId, status: CardStatus) -> Result<(), CoreError> {
        CardService::set_status(&mut self.wallet, id, status)?;
        let card = self.wallet.card(id).ok_or(CoreError::CardNotFound(id))?;
        let result = self.repository.update_card(&self.owner, card);
        self.persisted("update card", result)
    }

    pub fn delete_card(&mut self, id: CardId) -> Result<CreditCard, CoreError> {
        let removed = CardService::remove(&mut self.wallet, id)?;
        let result = self.repository.delete_card(&self.owner, id);
        self.persisted("delete card", result)?;
        Ok(removed)
    }

    pub fn next_card_due(&self, card: &CreditCard) -> Option<NaiveDate> {
        CardService::next_due_date(card, self.today())
    }

    /// Replaces the in-memory wallet with the repository's copy.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        self.wallet = self.repository.load_wallet(&self.owner)?;
        Ok(())
    }

    fn push_plan(&self, id: PlanId, action: &str) -> Result<(), CoreError> {
        let fields = PlanFields::from(self.plan(id)?);
        let result = self.repository.update(&self.owner, id, &fields);
        self.persisted(action, result)
    }

    fn persisted<T>(&self, action: &str, result: Result<T, CoreError>) -> Result<T, CoreError> {
        result.map_err(|err| {
            error!(
                owner = %self.owner,
                action,
                error = %err,
                "persistence failed, keeping in-memory state"
            );
            match err {
                CoreError::Persistence(message) => CoreError::Persistence(message),
                other => CoreError::Persistence(other.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cofrinho_core::{time::FixedClock, InMemoryRepository, PlanRepository};
    use cofrinho_domain::Category;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session() -> PlanSession {
        let owner = OwnerId::new("ana").unwrap();
        PlanSession::open(owner, Box::new(InMemoryRepository::new()), ContractPolicy::Strict)
            .unwrap()
            .with_clock(Arc::new(FixedClock::on(date(2026, 2, 25))))
    }

    #[test]
    fn upcoming_uses_session_clock() {
        let mut session = session();
        session
            .create_plan(&PlanDraft::new("Sofá", dec!(1000), 4, date(2026, 1, 31), Category::Casa))
            .unwrap();

        let upcoming = session.upcoming(7).unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].due_date, date(2026, 2, 28));
    }

    #[test]
    fn upcoming_rejects_windows_past_the_calendar() {
        let mut session = session();
        session
            .create_plan(&PlanDraft::new("Sofá", dec!(1000), 4, date(2026, 1, 31), Category::Casa))
            .unwrap();

        for days in [100_000_000, i64::MAX] {
            assert!(matches!(session.upcoming(days), Err(CoreError::Validation(_))));
        }
        assert_eq!(session.upcoming(36_500).unwrap().len(), 3);
    }

    #[test]
    fn invalid_month_is_a_validation_error() {
        let session = session();
        assert!(matches!(
            session.parcels_in_month(2026, 13),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn reload_discards_unsaved_state() {
        let repo = InMemoryRepository::new();
        let owner = OwnerId::new("ana").unwrap();
        let plan = InstallmentEngine::create_plan(
            "Mesa",
            dec!(300),
            3,
            date(2026, 1, 10),
            Category::Casa,
        )
        .unwrap();
        repo.create(&owner, &plan).unwrap();

        let mut session = PlanSession::open(owner, Box::new(repo), ContractPolicy::Strict).unwrap();
        assert_eq!(session.plans().len(), 1);
        session.wallet.plans.clear();
        session.reload().unwrap();
        assert_eq!(session.plans().len(), 1);
    }
}
