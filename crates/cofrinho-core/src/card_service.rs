//! Validation, search, and due-date helpers for payment cards.

use chrono::{Datelike, NaiveDate};

use cofrinho_domain::{
    calendar::{add_months_clamped, clamped_day},
    CardDraft, CardId, CardStatus, CardStatusFilter, CreditCard, Wallet,
};

use crate::CoreError;

pub struct CardService;

impl CardService {
    /// Validates `draft` and stores the resulting active card.
    pub fn add(wallet: &mut Wallet, draft: CardDraft) -> Result<CardId, CoreError> {
        let card = Self::build(draft)?;
        Ok(wallet.add_card(card))
    }

    pub fn build(draft: CardDraft) -> Result<CreditCard, CoreError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("card name must not be empty".into()));
        }
        if !(1..=31).contains(&draft.due_day) {
            return Err(CoreError::Validation(format!(
                "due day {} must be between 1 and 31",
                draft.due_day
            )));
        }
        let last_digits = non_blank(draft.last_digits);
        if let Some(digits) = &last_digits {
            if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(CoreError::Validation(format!(
                    "last digits `{digits}` must be exactly 4 digits"
                )));
            }
        }

        let mut card = CreditCard::new(name, draft.due_day);
        card.nickname = non_blank(draft.nickname);
        card.last_digits = last_digits;
        card.kind = draft.kind;
        card.brand = draft.brand;
        card.advance_days = draft.advance_days;
        Ok(card)
    }

    pub fn list(wallet: &Wallet) -> Vec<&CreditCard> {
        wallet.cards.iter().collect()
    }

    /// Cards whose name or nickname contains `query` (case-insensitive) or whose last digits
    /// contain it, restricted by `filter`.
    pub fn search<'a>(
        wallet: &'a Wallet,
        query: &str,
        filter: CardStatusFilter,
    ) -> Vec<&'a CreditCard> {
        let needle = query.trim().to_lowercase();
        wallet
            .cards
            .iter()
            .filter(|card| filter.matches(card.status))
            .filter(|card| {
                needle.is_empty()
                    || card.name.to_lowercase().contains(&needle)
                    || card
                        .nickname
                        .as_deref()
                        .is_some_and(|nick| nick.to_lowercase().contains(&needle))
                    || card
                        .last_digits
                        .as_deref()
                        .is_some_and(|digits| digits.contains(&needle))
            })
            .collect()
    }

    pub fn set_status(wallet: &mut Wallet, id: CardId, status: CardStatus) -> Result<(), CoreError> {
        let card = wallet.card_mut(id).ok_or(CoreError::CardNotFound(id))?;
        card.status = status;
        wallet.touch();
        Ok(())
    }

    pub fn remove(wallet: &mut Wallet, id: CardId) -> Result<CreditCard, CoreError> {
        wallet.remove_card(id).ok_or(CoreError::CardNotFound(id))
    }

    /// First statement due date on or after `reference`, clamped to short months.
    pub fn next_due_date(card: &CreditCard, reference: NaiveDate) -> Option<NaiveDate> {
        let this_month = clamped_day(reference.year(), reference.month(), card.due_day)?;
        if this_month >= reference {
            return Some(this_month);
        }
        let next_month = add_months_clamped(reference.with_day(1)?, 1)?;
        clamped_day(next_month.year(), next_month.month(), card.due_day)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
