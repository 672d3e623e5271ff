use chrono::{DateTime, Duration, Utc};
use encart_catalog::{FormatTier, Money};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    Loyalty,
    MultiParution,
    Renewal,
    NewClient,
    Upgrade,
}

impl OfferType {
    /// How long an offer of this type stays valid after generation.
    pub fn validity_days(self) -> i64 {
        match self {
            OfferType::Loyalty => 30,
            OfferType::MultiParution => 45,
            OfferType::Renewal => 60,
            OfferType::NewClient => 90,
            OfferType::Upgrade => 30,
        }
    }

    pub fn priority(self) -> OfferPriority {
        match self {
            OfferType::Loyalty | OfferType::Renewal | OfferType::NewClient => OfferPriority::High,
            OfferType::MultiParution | OfferType::Upgrade => OfferPriority::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferPriority {
    High,
    Medium,
}

/// Extra figures for a multi-month package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageDetails {
    pub months: u32,
    pub monthly_price: Money,
    pub price_per_month: Money,
}

/// Extra figures for a format upgrade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpgradeDetails {
    pub from: FormatTier,
    pub to: FormatTier,
    pub incremental_cost: Money,
    pub incremental_discount_percent: f64,
}

/// A priced discount proposal. Built once by the generator and never changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    pub title: String,
    pub format: FormatTier,
    pub base_price: Money,
    pub discount_percent: f64,
    pub discount_amount: Money,
    pub final_price: Money,
    pub priority: OfferPriority,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<UpgradeDetails>,
}

impl Offer {
    /// Price an offer: `discount = base × percent / 100`, `final = base − discount`,
    /// valid for the type's window starting at `now`.
    pub fn priced(
        offer_type: OfferType,
        title: impl Into<String>,
        format: FormatTier,
        base_price: Money,
        discount_percent: f64,
        now: DateTime<Utc>,
    ) -> Self {
        let discount_percent = discount_percent.max(0.0);
        let discount_amount = base_price * discount_percent / 100.0;

        Self {
            id: Uuid::new_v4(),
            offer_type,
            title: title.into(),
            format,
            base_price,
            discount_percent,
            discount_amount,
            final_price: base_price - discount_amount,
            priority: offer_type.priority(),
            valid_from: now,
            valid_until: now + Duration::days(offer_type.validity_days()),
            conditions: Vec::new(),
            extras: Vec::new(),
            package: None,
            upgrade: None,
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<String>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_extras(mut self, extras: Vec<String>) -> Self {
        self.extras = extras;
        self
    }

    pub fn with_package(mut self, package: PackageDetails) -> Self {
        self.package = Some(package);
        self
    }

    pub fn with_upgrade(mut self, upgrade: UpgradeDetails) -> Self {
        self.upgrade = Some(upgrade);
        self
    }

    /// An offer is valid up to and including `valid_until`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.valid_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_priced_offer_invariants() {
        let now = Utc.with_ymd_and_hms(2025, 4, 2, 9, 30, 0).unwrap();
        let offer = Offer::priced(OfferType::Renewal, "Renouvellement", FormatTier::ThirdPage, 240.0, 10.0, now);

        assert_eq!(offer.discount_amount, 24.0);
        assert_eq!(offer.final_price, 216.0);
        assert_eq!(offer.valid_until, now + Duration::days(60));
        assert_eq!(offer.priority, OfferPriority::High);
    }

    #[test]
    fn test_same_instant_offers_get_distinct_ids() {
        let now = Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0).unwrap();
        let a = Offer::priced(OfferType::Loyalty, "x", FormatTier::QuarterPage, 175.0, 15.0, now);
        let b = Offer::priced(OfferType::Loyalty, "x", FormatTier::FullPage, 550.0, 15.0, now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_negative_discount_is_clamped() {
        let now = Utc::now();
        let offer = Offer::priced(OfferType::Loyalty, "x", FormatTier::SixthPage, 135.0, -5.0, now);
        assert_eq!(offer.discount_percent, 0.0);
        assert_eq!(offer.final_price, 135.0);
    }

    #[test]
    fn test_validity_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let offer = Offer::priced(OfferType::Upgrade, "x", FormatTier::HalfPage, 550.0, 13.0, now);
        assert!(offer.is_valid_at(offer.valid_until));
        assert!(!offer.is_valid_at(offer.valid_until + Duration::seconds(1)));
    }

    #[test]
    fn test_serializes_type_field() {
        let offer = Offer::priced(OfferType::MultiParution, "x", FormatTier::SixthPage, 405.0, 5.0, Utc::now());
        let json = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["type"], "multi_parution");
        assert_eq!(json["priority"], "medium");
        assert!(json.get("upgrade").is_none());
    }
}
