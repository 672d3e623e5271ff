use chrono::{DateTime, Utc};
use encart_catalog::{FormatTier, PricingCatalog};
use encart_shared::Clock;
use std::sync::Arc;
use tracing::info;

use crate::models::{Offer, OfferType, PackageDetails, UpgradeDetails};
use crate::profiler::{ClientProfile, LoyaltyLevel};
use crate::rules::{
    loyalty_discount, renewal_discount, select_package, RuleContext, RuleEngine,
    NEW_CLIENT_DISCOUNT, UPGRADE_INCREMENT_DISCOUNT,
};

/// Derives discount offers from a client profile and an insert format.
///
/// Pure apart from reading the clock: the same inputs at the same instant
/// always produce the same offers.
pub struct OfferGenerator {
    catalog: PricingCatalog,
    rule_engine: RuleEngine,
    clock: Arc<dyn Clock>,
}

impl OfferGenerator {
    pub fn new(catalog: PricingCatalog, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            rule_engine: RuleEngine::default(),
            clock,
        }
    }

    pub fn with_rules(catalog: PricingCatalog, rule_engine: RuleEngine, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, rule_engine, clock }
    }

    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    /// Offers for `format`, in rule order (loyalty, multi-parution, renewal,
    /// new client, upgrade).
    pub fn compute_offers(
        &self,
        profile: &ClientProfile,
        format: FormatTier,
        current_selection_count: usize,
    ) -> Vec<Offer> {
        let now = self.clock.now();
        let next_tier = self.catalog.next_tier(format);
        let context = RuleContext { profile, next_tier };

        let offers: Vec<Offer> = self
            .rule_engine
            .matching(&context)
            .into_iter()
            .filter_map(|offer_type| match offer_type {
                OfferType::Loyalty => self.loyalty_offer(profile, format, now),
                OfferType::MultiParution => Some(self.multi_parution_offer(profile, format, current_selection_count, now)),
                OfferType::Renewal => Some(self.renewal_offer(profile, format, now)),
                OfferType::NewClient => Some(self.new_client_offer(format, now)),
                OfferType::Upgrade => next_tier.map(|to| self.upgrade_offer(format, to, now)),
            })
            .collect();

        info!(
            "Computed {} offers for format {} ({:?}, loyalty {:?})",
            offers.len(),
            format,
            profile.classification,
            profile.loyalty
        );
        offers
    }

    fn loyalty_offer(&self, profile: &ClientProfile, format: FormatTier, now: DateTime<Utc>) -> Option<Offer> {
        let percent = loyalty_discount(profile.loyalty)?;
        let label = if profile.loyalty == LoyaltyLevel::High { "forte" } else { "moyenne" };

        Some(
            Offer::priced(OfferType::Loyalty, "Remise fidélité", format, self.catalog.price_of(format), percent, now)
                .with_conditions(vec![
                    format!("Fidélité {} ({} an(s) d'ancienneté)", label, profile.years_active),
                    "Valable sur une parution".to_string(),
                ]),
        )
    }

    fn multi_parution_offer(
        &self,
        profile: &ClientProfile,
        format: FormatTier,
        current_selection_count: usize,
        now: DateTime<Utc>,
    ) -> Offer {
        let package = select_package(profile);
        let monthly_price = self.catalog.price_of(format);
        let months = package.months;

        let offer = Offer::priced(
            OfferType::MultiParution,
            format!("Forfait {} parutions", months),
            format,
            monthly_price * months as f64,
            package.discount_percent,
            now,
        );
        let price_per_month = offer.final_price / months as f64;
        let remaining = (months as usize).saturating_sub(current_selection_count);

        offer
            .with_conditions(vec![
                format!("Engagement sur {} parutions consécutives", months),
                format!(
                    "{} parution(s) déjà sélectionnée(s), {} à ajouter",
                    current_selection_count, remaining
                ),
            ])
            .with_package(PackageDetails { months, monthly_price, price_per_month })
    }

    fn renewal_offer(&self, profile: &ClientProfile, format: FormatTier, now: DateTime<Utc>) -> Offer {
        let percent = renewal_discount(profile.confidence);

        Offer::priced(OfferType::Renewal, "Offre de renouvellement", format, self.catalog.price_of(format), percent, now)
            .with_conditions(vec![
                format!("Renouvellement confirmé à {:.0}%", profile.confidence * 100.0),
                "Signature avant la fin de validité".to_string(),
            ])
    }

    fn new_client_offer(&self, format: FormatTier, now: DateTime<Utc>) -> Offer {
        Offer::priced(
            OfferType::NewClient,
            "Offre de bienvenue",
            format,
            self.catalog.price_of(format),
            NEW_CLIENT_DISCOUNT,
            now,
        )
        .with_conditions(vec!["Réservé aux nouveaux annonceurs".to_string()])
        .with_extras(vec![
            "Accompagnement personnalisé".to_string(),
            "Conseils d'optimisation offerts".to_string(),
        ])
    }

    /// 30% off the price difference to the next tier. The offer is expressed
    /// against the next tier's price, so `final = current + 70% × increment`.
    fn upgrade_offer(&self, from: FormatTier, to: FormatTier, now: DateTime<Utc>) -> Offer {
        let current_price = self.catalog.price_of(from);
        let target_price = self.catalog.price_of(to);
        let incremental_cost = (target_price - current_price).max(0.0);
        let discount_amount = incremental_cost * UPGRADE_INCREMENT_DISCOUNT / 100.0;
        let effective_percent = if target_price > 0.0 {
            discount_amount / target_price * 100.0
        } else {
            0.0
        };

        Offer::priced(OfferType::Upgrade, format!("Passez au format {}", to), to, target_price, effective_percent, now)
            .with_conditions(vec![format!(
                "{}% de remise sur la différence de prix avec le format {}",
                UPGRADE_INCREMENT_DISCOUNT, from
            )])
            .with_upgrade(UpgradeDetails {
                from,
                to,
                incremental_cost,
                incremental_discount_percent: UPGRADE_INCREMENT_DISCOUNT,
            })
    }
}
