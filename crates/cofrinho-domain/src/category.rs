//! Fixed spending categories a plan can be filed under.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Supported plan categories, serialized with their display label.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum Category {
    #[serde(rename = "Alimentação")]
    Alimentacao,
    #[serde(rename = "Casa")]
    Casa,
    #[default]
    #[serde(rename = "Compras")]
    Compras,
    #[serde(rename = "Educação")]
    Educacao,
    #[serde(rename = "Lazer")]
    Lazer,
    #[serde(rename = "Saúde")]
    Saude,
    #[serde(rename = "Serviço")]
    Servico,
    #[serde(rename = "Supermercado")]
    Supermercado,
    #[serde(rename = "Transporte")]
    Transporte,
    #[serde(rename = "Outros")]
    Outros,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Alimentacao,
        Category::Casa,
        Category::Compras,
        Category::Educacao,
        Category::Lazer,
        Category::Saude,
        Category::Servico,
        Category::Supermercado,
        Category::Transporte,
        Category::Outros,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Alimentacao => "Alimentação",
            Category::Casa => "Casa",
            Category::Compras => "Compras",
            Category::Educacao => "Educação",
            Category::Lazer => "Lazer",
            Category::Saude => "Saúde",
            Category::Servico => "Serviço",
            Category::Supermercado => "Supermercado",
            Category::Transporte => "Transporte",
            Category::Outros => "Outros",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a label does not match any known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category `{}`", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = fold_label(value);
        Category::ALL
            .into_iter()
            .find(|category| fold_label(category.label()) == needle)
            .ok_or_else(|| UnknownCategory(value.trim().to_string()))
    }
}

/// Lowercases and strips the Portuguese diacritics used by category labels.
pub(crate) fn fold_label(value: &str) -> String {
    value
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_ignoring_case_and_accents() {
        assert_eq!("compras".parse::<Category>(), Ok(Category::Compras));
        assert_eq!("SAUDE".parse::<Category>(), Ok(Category::Saude));
        assert_eq!(" Alimentação ".parse::<Category>(), Ok(Category::Alimentacao));
        assert_eq!("servico".parse::<Category>(), Ok(Category::Servico));
    }

    #[test]
    fn rejects_unknown_labels() {
        let err = "Viagem".parse::<Category>().unwrap_err();
        assert_eq!(err, UnknownCategory("Viagem".into()));
    }

    #[test]
    fn serializes_with_display_label() {
        let json = serde_json::to_string(&Category::Educacao).unwrap();
        assert_eq!(json, "\"Educação\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::Educacao);
    }
}
