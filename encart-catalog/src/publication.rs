use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pricing::{FormatTier, Money};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Month {
    Janvier,
    #[serde(rename = "Février", alias = "Fevrier")]
    Fevrier,
    Mars,
    Avril,
    Mai,
    Juin,
    Juillet,
    #[serde(rename = "Août", alias = "Aout")]
    Aout,
    Septembre,
    Octobre,
    Novembre,
    #[serde(rename = "Décembre", alias = "Decembre")]
    Decembre,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Janvier,
        Month::Fevrier,
        Month::Mars,
        Month::Avril,
        Month::Mai,
        Month::Juin,
        Month::Juillet,
        Month::Aout,
        Month::Septembre,
        Month::Octobre,
        Month::Novembre,
        Month::Decembre,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Month::Janvier => "Janvier",
            Month::Fevrier => "Février",
            Month::Mars => "Mars",
            Month::Avril => "Avril",
            Month::Mai => "Mai",
            Month::Juin => "Juin",
            Month::Juillet => "Juillet",
            Month::Aout => "Août",
            Month::Septembre => "Septembre",
            Month::Octobre => "Octobre",
            Month::Novembre => "Novembre",
            Month::Decembre => "Décembre",
        }
    }

    /// Accepts the French month name with or without accents, any case.
    pub fn parse(name: &str) -> Option<Self> {
        let wanted = fold_accents(name.trim());
        Self::ALL.into_iter().find(|m| fold_accents(m.name()) == wanted)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn fold_accents(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'à' | 'â' => 'a',
            'û' | 'ù' => 'u',
            'ô' => 'o',
            'î' | 'ï' => 'i',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("Invalid price for {month}: {price} (must be a finite, non-negative amount)")]
    InvalidPrice { month: Month, price: Money },

    #[error("Unknown month: {0}")]
    UnknownMonth(String),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),
}

/// One insert in one month's issue. Only built through [`Publication::new`],
/// so the price is always valid.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Publication {
    pub month: Month,
    pub format: FormatTier,
    pub price: Money,
}

impl Publication {
    pub fn new(month: Month, format: FormatTier, price: Money) -> Result<Self, SelectionError> {
        if !price.is_finite() || price < 0.0 {
            return Err(SelectionError::InvalidPrice { month, price });
        }
        Ok(Self { month, format, price })
    }

    /// Build from untyped labels, e.g. form input.
    pub fn from_labels(month: &str, format: &str, price: Money) -> Result<Self, SelectionError> {
        let month = Month::parse(month).ok_or_else(|| SelectionError::UnknownMonth(month.to_string()))?;
        let format = FormatTier::parse(format).ok_or_else(|| SelectionError::UnknownFormat(format.to_string()))?;
        Self::new(month, format, price)
    }
}

/// Publications picked for a client, at most one per month, kept in calendar order.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PublicationSelection {
    publications: Vec<Publication>,
}

impl PublicationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a publication. An existing entry for the same month is replaced and returned.
    pub fn add(&mut self, publication: Publication) -> Option<Publication> {
        let replaced = self
            .publications
            .iter()
            .position(|p| p.month == publication.month)
            .map(|idx| self.publications.remove(idx));

        let at = self
            .publications
            .partition_point(|p| p.month < publication.month);
        self.publications.insert(at, publication);
        replaced
    }

    pub fn remove(&mut self, month: Month) -> Option<Publication> {
        let idx = self.publications.iter().position(|p| p.month == month)?;
        Some(self.publications.remove(idx))
    }

    pub fn get(&self, month: Month) -> Option<&Publication> {
        self.publications.iter().find(|p| p.month == month)
    }

    pub fn publications(&self) -> &[Publication] {
        &self.publications
    }

    pub fn len(&self) -> usize {
        self.publications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publications.is_empty()
    }

    pub fn total(&self) -> Money {
        self.publications.iter().map(|p| p.price).sum()
    }
}
