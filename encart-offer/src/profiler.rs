use chrono::{DateTime, Datelike, Utc};
use encart_core::Record;
use encart_shared::Clock;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Renewal,
    New,
    Undetermined,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyLevel {
    High,
    Medium,
    Low,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProfileScores {
    pub renewal_score: f64,
    pub novelty_score: f64,
    pub loyalty_score: u32,
}

/// Derived view of a business record. Recomputed on demand, never stored as truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientProfile {
    pub classification: Classification,
    pub confidence: f64,
    pub loyalty: LoyaltyLevel,
    pub years_active: u32,
    pub scores: ProfileScores,
}

lazy_static! {
    static ref RENEWAL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)renouvel\w*|\brenewal\b|\brenew\w*").unwrap(),
        Regex::new(r"(?i)\bfid[eèé]l\w*|\bloyal\w*").unwrap(),
        Regex::new(r"(?i)\br[eé]guli[eè]r\w*|\bregular\b|\bhabituel\w*").unwrap(),
        Regex::new(r"(?i)\bclient\s+depuis\b|\bclient\s+since\b|\b(?:depuis|since)\s+(?:19|20)\d{2}\b").unwrap(),
    ];

    static ref NOVELTY_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bnouve(?:aux?|lles?)\b|\bnew\b").unwrap(),
        Regex::new(r"(?i)\bpremi[eè]re?\b|\bfirst\b").unwrap(),
        Regex::new(r"(?i)\bprospect\w*").unwrap(),
    ];

    static ref YEAR_TOKEN: Regex = Regex::new(r"\b(?:19|20)\d{2}\b").unwrap();

    /// (pattern, weight). Each keyword counts once regardless of repetitions.
    static ref LOYALTY_KEYWORDS: Vec<(Regex, u32)> = vec![
        (Regex::new(r"(?i)\bfid[eèé]l\w*|\bloyal\w*").unwrap(), 3),
        (Regex::new(r"(?i)renouvel\w*|\brenew\w*").unwrap(), 2),
        (Regex::new(r"(?i)\br[eé]guli[eè]r\w*|\bregular\b|\bhabituel\w*").unwrap(), 2),
        (Regex::new(r"(?i)\b(?:depuis|since)\s+(?:19|20)\d{2}\b|\bclient\s+(?:depuis|since)\b").unwrap(), 1),
        (Regex::new(r"(?i)\bsatisfai\w*|\bsatisfied\b|\brecommand\w*").unwrap(), 1),
    ];
}

/// How far back a year mentioned in notes still counts as recent history.
const RECENT_YEAR_WINDOW: i32 = 10;

/// Scores business records into renewal / new-client profiles.
pub struct ClientProfiler {
    clock: Arc<dyn Clock>,
}

impl ClientProfiler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn classify(&self, record: &Record) -> ClientProfile {
        let current_year = self.clock.now().year();

        let mut renewal_score = renewal_hits(&record.notes, current_year) as f64;
        let mut novelty_score = count_matches(&NOVELTY_PATTERNS, &record.notes) as f64;

        let primary_age = age_in_years(record.created_at, current_year);
        match primary_age {
            Some(age) if age >= 1 => renewal_score += 2.0,
            Some(0) => novelty_score += 2.0,
            _ => {}
        }

        let mut alternate_age = None;
        if let Some(alt) = &record.alternate {
            renewal_score += renewal_hits(&alt.notes, current_year) as f64 * 0.5;
            alternate_age = age_in_years(alt.created_at, current_year);
            if matches!(alternate_age, Some(age) if age >= 1) {
                renewal_score += 1.0;
            }
        }

        let (classification, confidence) = if renewal_score > novelty_score {
            (Classification::Renewal, (renewal_score / 5.0).min(1.0))
        } else if novelty_score > renewal_score {
            (Classification::New, (novelty_score / 3.0).min(1.0))
        } else {
            (Classification::Undetermined, 0.5)
        };

        let years_active = primary_age.into_iter().chain(alternate_age).max().unwrap_or(0) as u32;

        let loyalty_text = match &record.alternate {
            Some(alt) => format!("{}\n{}", record.notes, alt.notes),
            None => record.notes.clone(),
        };
        let loyalty_score = loyalty_score(&loyalty_text, years_active);
        let loyalty = loyalty_level(loyalty_score);

        debug!(
            record_id = %record.id,
            ?classification,
            confidence,
            ?loyalty,
            renewal_score,
            novelty_score,
            "classified client"
        );

        ClientProfile {
            classification,
            confidence,
            loyalty,
            years_active,
            scores: ProfileScores {
                renewal_score,
                novelty_score,
                loyalty_score,
            },
        }
    }
}

fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().map(|p| p.find_iter(text).count()).sum()
}

/// Keyword hits plus past-year mentions within the recent window.
fn renewal_hits(text: &str, current_year: i32) -> usize {
    let years = YEAR_TOKEN
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .filter(|y| *y < current_year && current_year - y <= RECENT_YEAR_WINDOW)
        .count();
    count_matches(&RENEWAL_PATTERNS, text) + years
}

/// Whole calendar years since creation. Future dates are ignored.
fn age_in_years(created_at: Option<DateTime<Utc>>, current_year: i32) -> Option<i32> {
    let age = current_year - created_at?.year();
    (age >= 0).then_some(age)
}

fn loyalty_score(text: &str, years_active: u32) -> u32 {
    let keywords: u32 = LOYALTY_KEYWORDS
        .iter()
        .filter(|(pattern, _)| pattern.is_match(text))
        .map(|(_, weight)| weight)
        .sum();

    let age_bonus = if years_active >= 3 {
        2
    } else if years_active >= 2 {
        1
    } else {
        0
    };

    keywords + age_bonus
}

fn loyalty_level(score: u32) -> LoyaltyLevel {
    match score {
        s if s >= 5 => LoyaltyLevel::High,
        s if s >= 3 => LoyaltyLevel::Medium,
        s if s >= 1 => LoyaltyLevel::Low,
        _ => LoyaltyLevel::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use encart_core::AlternateSource;
    use encart_shared::ManualClock;

    fn profiler() -> ClientProfiler {
        let now = Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0).unwrap();
        ClientProfiler::new(Arc::new(ManualClock::new(now)))
    }

    fn year(y: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_loyal_client_since_2021() {
        let record = Record::new("1", "Boulangerie Dupont")
            .with_notes("client fidèle depuis 2021")
            .with_created_at(year(2021));

        let profile = profiler().classify(&record);
        assert_eq!(profile.classification, Classification::Renewal);
        assert_eq!(profile.confidence, 1.0);
        assert!(profile.scores.loyalty_score >= 5);
        assert_eq!(profile.loyalty, LoyaltyLevel::High);
        assert_eq!(profile.years_active, 4);
    }

    #[test]
    fn test_tie_without_creation_date_is_undetermined() {
        let record = Record::new("2", "Garage Martin").with_notes("nouveau contact, client fidèle");

        let profile = profiler().classify(&record);
        assert_eq!(profile.scores.renewal_score, profile.scores.novelty_score);
        assert_eq!(profile.classification, Classification::Undetermined);
        assert_eq!(profile.confidence, 0.5);
    }

    #[test]
    fn test_empty_record_is_undetermined() {
        let profile = profiler().classify(&Record::new("3", "Inconnu"));
        assert_eq!(profile.classification, Classification::Undetermined);
        assert_eq!(profile.confidence, 0.5);
        assert_eq!(profile.loyalty, LoyaltyLevel::Unknown);
        assert_eq!(profile.years_active, 0);
    }

    #[test]
    fn test_created_this_year_counts_as_new() {
        let record = Record::new("4", "Fleuriste Rose")
            .with_notes("premier rendez-vous, prospect")
            .with_created_at(year(2025));

        let profile = profiler().classify(&record);
        // premier + prospect + creation this year
        assert_eq!(profile.scores.novelty_score, 4.0);
        assert_eq!(profile.classification, Classification::New);
        assert_eq!(profile.confidence, 1.0);
    }

    #[test]
    fn test_new_client_confidence_scales_by_three() {
        let record = Record::new("5", "Pizzeria").with_notes("new lead");
        let profile = profiler().classify(&record);
        assert_eq!(profile.classification, Classification::New);
        assert!((profile.confidence - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_renewal_confidence_scales_by_five() {
        // One year old, no keywords: renewal score 2.
        let record = Record::new("6", "Cordonnerie").with_created_at(year(2024));
        let profile = profiler().classify(&record);
        assert_eq!(profile.classification, Classification::Renewal);
        assert!((profile.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_alternate_source_weighs_half() {
        let record = Record::new("7", "Pharmacie").with_alternate(AlternateSource {
            notes: "renouvellement annuel, client régulier".to_string(),
            created_at: Some(year(2019)),
        });

        let profile = profiler().classify(&record);
        // Two keyword hits at 0.5 each, plus 1 for the alternate file's age.
        assert_eq!(profile.scores.renewal_score, 2.0);
        assert_eq!(profile.classification, Classification::Renewal);
        assert_eq!(profile.years_active, 6);
    }

    #[test]
    fn test_old_years_are_not_recent() {
        assert_eq!(renewal_hits("ouvert en 1990", 2025), 0);
        assert_eq!(renewal_hits("contrat 2023 et 2024", 2025), 2);
        assert_eq!(renewal_hits("prévu en 2026", 2025), 0);
    }

    #[test]
    fn test_novelty_words_match_all_forms() {
        assert_eq!(count_matches(&NOVELTY_PATTERNS, "nouveau"), 1);
        assert_eq!(count_matches(&NOVELTY_PATTERNS, "nouveaux clients"), 1);
        assert_eq!(count_matches(&NOVELTY_PATTERNS, "nouvelle enseigne"), 1);
        assert_eq!(count_matches(&NOVELTY_PATTERNS, "nouvelles boutiques"), 1);
    }

    #[test]
    fn test_renewal_word_is_not_novelty() {
        assert_eq!(count_matches(&NOVELTY_PATTERNS, "renouvellement prévu"), 0);
        assert_eq!(count_matches(&NOVELTY_PATTERNS, "renewal"), 0);
    }

    #[test]
    fn test_loyalty_thresholds() {
        assert_eq!(loyalty_level(0), LoyaltyLevel::Unknown);
        assert_eq!(loyalty_level(1), LoyaltyLevel::Low);
        assert_eq!(loyalty_level(3), LoyaltyLevel::Medium);
        assert_eq!(loyalty_level(5), LoyaltyLevel::High);
        assert_eq!(loyalty_score("client régulier", 2), 3);
        assert_eq!(loyalty_score("", 3), 2);
    }

    #[test]
    fn test_future_creation_date_is_ignored() {
        assert_eq!(age_in_years(Some(year(2030)), 2025), None);
        assert_eq!(age_in_years(None, 2025), None);
        assert_eq!(age_in_years(Some(year(2022)), 2025), Some(3));
    }
}
