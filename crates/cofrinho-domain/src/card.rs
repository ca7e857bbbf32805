//! Payment cards the installment purchases are charged to.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{category::fold_label, common::*};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditCard {
    pub id: CardId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_digits: Option<String>,
    pub kind: CardKind,
    pub brand: CardBrand,
    pub due_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance_days: Option<u32>,
    #[serde(default)]
    pub status: CardStatus,
}

impl CreditCard {
    pub fn new(name: impl Into<String>, due_day: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            nickname: None,
            last_digits: None,
            kind: CardKind::default(),
            brand: CardBrand::default(),
            due_day,
            advance_days: None,
            status: CardStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CardStatus::Active
    }
}

impl Identifiable for CreditCard {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for CreditCard {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for CreditCard {
    fn display_label(&self) -> String {
        match &self.last_digits {
            Some(digits) => format!("{} •••• {}", self.name, digits),
            None => self.name.clone(),
        }
    }
}

/// Unvalidated card fields collected from the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDraft {
    pub name: String,
    pub nickname: Option<String>,
    pub last_digits: Option<String>,
    pub kind: CardKind,
    pub brand: CardBrand,
    pub due_day: u32,
    pub advance_days: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardKind {
    #[default]
    #[serde(rename = "Crédito")]
    Credit,
    #[serde(rename = "Débito")]
    Debit,
    #[serde(rename = "Alimentação")]
    Food,
    #[serde(rename = "Refeição")]
    Meal,
}

impl CardKind {
    pub const ALL: [CardKind; 4] = [CardKind::Credit, CardKind::Debit, CardKind::Food, CardKind::Meal];

    pub fn label(self) -> &'static str {
        match self {
            CardKind::Credit => "Crédito",
            CardKind::Debit => "Débito",
            CardKind::Food => "Alimentação",
            CardKind::Meal => "Refeição",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CardKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = fold_label(value);
        CardKind::ALL
            .into_iter()
            .find(|kind| fold_label(kind.label()) == needle)
            .ok_or_else(|| format!("unknown card type `{}`", value.trim()))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardBrand {
    Mastercard,
    Visa,
    Elo,
    Amex,
    Hipercard,
    #[default]
    Outra,
}

impl CardBrand {
    pub const ALL: [CardBrand; 6] = [
        CardBrand::Mastercard,
        CardBrand::Visa,
        CardBrand::Elo,
        CardBrand::Amex,
        CardBrand::Hipercard,
        CardBrand::Outra,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CardBrand::Mastercard => "Mastercard",
            CardBrand::Visa => "Visa",
            CardBrand::Elo => "Elo",
            CardBrand::Amex => "Amex",
            CardBrand::Hipercard => "Hipercard",
            CardBrand::Outra => "Outra",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CardBrand {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = fold_label(value);
        CardBrand::ALL
            .into_iter()
            .find(|brand| fold_label(brand.label()) == needle)
            .ok_or_else(|| format!("unknown card brand `{}`", value.trim()))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardStatus {
    #[default]
    #[serde(rename = "Ativo")]
    Active,
    #[serde(rename = "Inativo")]
    Inactive,
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CardStatus::Active => "Ativo",
            CardStatus::Inactive => "Inativo",
        };
        f.write_str(label)
    }
}

impl FromStr for CardStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match fold_label(value).as_str() {
            "ativo" | "active" => Ok(CardStatus::Active),
            "inativo" | "inactive" => Ok(CardStatus::Inactive),
            _ => Err(format!("unknown card status `{}`", value.trim())),
        }
    }
}

/// Status filter applied when listing cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardStatusFilter {
    #[default]
    All,
    Only(CardStatus),
}

impl CardStatusFilter {
    pub fn matches(self, status: CardStatus) -> bool {
        match self {
            CardStatusFilter::All => true,
            CardStatusFilter::Only(expected) => expected == status,
        }
    }
}

impl FromStr for CardStatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match fold_label(value).as_str() {
            "todos" | "all" => Ok(CardStatusFilter::All),
            other => other.parse().map(CardStatusFilter::Only),
        }
    }
}
