use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::publication::Publication;

/// Currency units. Catalog prices are whole, discounted prices need cents.
pub type Money = f64;

/// Advertising insert formats, smallest to most prominent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatTier {
    #[serde(rename = "1/6 page")]
    SixthPage,
    #[serde(rename = "1/4 page")]
    QuarterPage,
    #[serde(rename = "1/3 page")]
    ThirdPage,
    #[serde(rename = "1/2 page")]
    HalfPage,
    #[serde(rename = "1 page")]
    FullPage,
    #[serde(rename = "Dos de couverture")]
    BackCover,
    #[serde(rename = "Couverture")]
    Cover,
}

impl FormatTier {
    pub const ALL: [FormatTier; 7] = [
        FormatTier::SixthPage,
        FormatTier::QuarterPage,
        FormatTier::ThirdPage,
        FormatTier::HalfPage,
        FormatTier::FullPage,
        FormatTier::BackCover,
        FormatTier::Cover,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormatTier::SixthPage => "1/6 page",
            FormatTier::QuarterPage => "1/4 page",
            FormatTier::ThirdPage => "1/3 page",
            FormatTier::HalfPage => "1/2 page",
            FormatTier::FullPage => "1 page",
            FormatTier::BackCover => "Dos de couverture",
            FormatTier::Cover => "Couverture",
        }
    }

    /// Case and whitespace insensitive label lookup.
    pub fn parse(label: &str) -> Option<Self> {
        let wanted = label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        Self::ALL.into_iter().find(|tier| tier.label().to_lowercase() == wanted)
    }

    /// The tier this one upgrades to, if any.
    pub fn next(self) -> Option<Self> {
        let idx = Self::ALL.iter().position(|t| *t == self)?;
        Self::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for FormatTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Base price per insert, per tier
    pub base_prices: HashMap<FormatTier, Money>,

    /// Tier used when a format label is not recognized
    pub default_tier: FormatTier,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_prices: HashMap::from([
                (FormatTier::SixthPage, 135.0),
                (FormatTier::QuarterPage, 175.0),
                (FormatTier::ThirdPage, 240.0),
                (FormatTier::HalfPage, 320.0),
                (FormatTier::FullPage, 550.0),
                (FormatTier::BackCover, 750.0),
                (FormatTier::Cover, 950.0),
            ]),
            default_tier: FormatTier::QuarterPage,
        }
    }
}

/// Static price list for insert formats.
#[derive(Debug, Clone)]
pub struct PricingCatalog {
    config: PricingConfig,
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

impl PricingCatalog {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn default_tier(&self) -> FormatTier {
        self.config.default_tier
    }

    /// Tier for a label, falling back to the default tier.
    pub fn resolve(&self, label: &str) -> FormatTier {
        FormatTier::parse(label).unwrap_or(self.config.default_tier)
    }

    /// Base price for a format label. Never fails: unknown labels are priced
    /// as the default tier.
    pub fn base_price(&self, label: &str) -> Money {
        self.price_of(self.resolve(label))
    }

    pub fn price_of(&self, tier: FormatTier) -> Money {
        self.config
            .base_prices
            .get(&tier)
            .or_else(|| self.config.base_prices.get(&self.config.default_tier))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn next_tier(&self, tier: FormatTier) -> Option<FormatTier> {
        tier.next()
    }

    /// Sum of the stored publication prices. Prices are not re-read from the
    /// catalog, so manual overrides are kept.
    pub fn total_price(&self, publications: &[Publication]) -> Money {
        publications.iter().map(|p| p.price).sum()
    }
}
