use serde::{Deserialize, Serialize};

use crate::models::OfferType;
use crate::profiler::{Classification, ClientProfile, LoyaltyLevel};
use encart_catalog::FormatTier;

/// Multi-month commitment with a fixed discount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MultiParutionPackage {
    pub months: u32,
    pub discount_percent: f64,
}

pub const PACKAGE_3_MONTHS: MultiParutionPackage = MultiParutionPackage { months: 3, discount_percent: 5.0 };
pub const PACKAGE_6_MONTHS: MultiParutionPackage = MultiParutionPackage { months: 6, discount_percent: 10.0 };
pub const PACKAGE_12_MONTHS: MultiParutionPackage = MultiParutionPackage { months: 12, discount_percent: 15.0 };

pub const NEW_CLIENT_DISCOUNT: f64 = 12.0;

/// Discount applied to the price difference when moving up one tier.
pub const UPGRADE_INCREMENT_DISCOUNT: f64 = 30.0;

pub fn loyalty_discount(level: LoyaltyLevel) -> Option<f64> {
    match level {
        LoyaltyLevel::High => Some(15.0),
        LoyaltyLevel::Medium => Some(10.0),
        LoyaltyLevel::Low | LoyaltyLevel::Unknown => None,
    }
}

/// 8% plus up to 5 points for confidence, i.e. 8..=13.
pub fn renewal_discount(confidence: f64) -> f64 {
    8.0 + (confidence.clamp(0.0, 1.0) * 5.0).floor()
}

pub fn select_package(profile: &ClientProfile) -> MultiParutionPackage {
    if profile.loyalty == LoyaltyLevel::High {
        PACKAGE_12_MONTHS
    } else if profile.classification == Classification::Renewal {
        PACKAGE_6_MONTHS
    } else {
        PACKAGE_3_MONTHS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RuleCondition {
    Always,
    LoyaltyIn(Vec<LoyaltyLevel>),
    ClassificationIs(Classification),
    HasUpgradePath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRule {
    pub name: String,
    pub offer_type: OfferType,
    pub conditions: Vec<RuleCondition>,
    pub is_active: bool,
}

/// What the rules are evaluated against.
pub struct RuleContext<'a> {
    pub profile: &'a ClientProfile,
    pub next_tier: Option<FormatTier>,
}

/// Gates offer types on the client profile. Rules keep their declared order,
/// which is also the display order of the resulting offers.
pub struct RuleEngine {
    rules: Vec<OfferRule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<OfferRule>) -> Self {
        Self { rules }
    }

    pub fn matching(&self, context: &RuleContext<'_>) -> Vec<OfferType> {
        self.rules
            .iter()
            .filter(|rule| rule.is_active && self.matches(rule, context))
            .map(|rule| rule.offer_type)
            .collect()
    }

    fn matches(&self, rule: &OfferRule, context: &RuleContext<'_>) -> bool {
        rule.conditions.iter().all(|condition| match condition {
            RuleCondition::Always => true,
            RuleCondition::LoyaltyIn(levels) => levels.contains(&context.profile.loyalty),
            RuleCondition::ClassificationIs(c) => context.profile.classification == *c,
            RuleCondition::HasUpgradePath => context.next_tier.is_some(),
        })
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(get_default_rules())
    }
}

pub fn get_default_rules() -> Vec<OfferRule> {
    vec![
        OfferRule {
            name: "Loyalty discount".to_string(),
            offer_type: OfferType::Loyalty,
            is_active: true,
            conditions: vec![RuleCondition::LoyaltyIn(vec![LoyaltyLevel::High, LoyaltyLevel::Medium])],
        },
        OfferRule {
            name: "Multi-parution package".to_string(),
            offer_type: OfferType::MultiParution,
            is_active: true,
            conditions: vec![RuleCondition::Always],
        },
        OfferRule {
            name: "Renewal discount".to_string(),
            offer_type: OfferType::Renewal,
            is_active: true,
            conditions: vec![RuleCondition::ClassificationIs(Classification::Renewal)],
        },
        OfferRule {
            name: "New client welcome".to_string(),
            offer_type: OfferType::NewClient,
            is_active: true,
            conditions: vec![RuleCondition::ClassificationIs(Classification::New)],
        },
        OfferRule {
            name: "Format upgrade".to_string(),
            offer_type: OfferType::Upgrade,
            is_active: true,
            conditions: vec![RuleCondition::HasUpgradePath],
        },
    ]
}
