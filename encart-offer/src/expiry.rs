use crate::models::Offer;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Offers handed out so far, by id.
///
/// Nothing is dropped implicitly: validity is checked at read time against
/// the caller's `now`, and `purge_expired` is the only removal path.
pub struct OfferHistory {
    offers: HashMap<Uuid, Offer>,
}

impl OfferHistory {
    pub fn new() -> Self {
        Self {
            offers: HashMap::new(),
        }
    }

    pub fn record(&mut self, offers: &[Offer]) {
        for offer in offers {
            self.offers.insert(offer.id, offer.clone());
        }
    }

    /// Get an offer if it is still valid at `now`.
    pub fn get_valid(&self, offer_id: Uuid, now: DateTime<Utc>) -> Result<&Offer, HistoryError> {
        let offer = self.offers.get(&offer_id)
            .ok_or(HistoryError::NotFound(offer_id))?;

        if !offer.is_valid_at(now) {
            return Err(HistoryError::Expired(offer_id));
        }
        Ok(offer)
    }

    pub fn valid_offers(&self, now: DateTime<Utc>) -> Vec<&Offer> {
        self.offers.values().filter(|o| o.is_valid_at(now)).collect()
    }

    /// Drop offers past their validity window. Returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let initial_count = self.offers.len();
        self.offers.retain(|_, offer| offer.is_valid_at(now));
        initial_count - self.offers.len()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

impl Default for OfferHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Offer not found: {0}")]
    NotFound(Uuid),

    #[error("Offer expired: {0}")]
    Expired(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OfferType;
    use chrono::{Duration, TimeZone};
    use encart_catalog::FormatTier;

    #[test]
    fn test_offer_expiry() {
        let issued = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let loyalty = Offer::priced(OfferType::Loyalty, "x", FormatTier::QuarterPage, 175.0, 15.0, issued);
        let welcome = Offer::priced(OfferType::NewClient, "y", FormatTier::QuarterPage, 175.0, 12.0, issued);

        let mut history = OfferHistory::new();
        history.record(&[loyalty.clone(), welcome.clone()]);

        let later = issued + Duration::days(31);
        // Expired offers stay stored until purged.
        assert!(matches!(history.get_valid(loyalty.id, later), Err(HistoryError::Expired(_))));
        assert_eq!(history.len(), 2);
        assert!(history.get_valid(welcome.id, later).is_ok());
        assert_eq!(history.valid_offers(later).len(), 1);

        assert_eq!(history.purge_expired(later), 1);
        assert!(matches!(history.get_valid(loyalty.id, later), Err(HistoryError::NotFound(_))));
    }

    #[test]
    fn test_valid_on_last_day() {
        let issued = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let offer = Offer::priced(OfferType::Upgrade, "x", FormatTier::HalfPage, 550.0, 10.0, issued);
        let mut history = OfferHistory::default();
        history.record(std::slice::from_ref(&offer));

        assert!(history.get_valid(offer.id, offer.valid_until).is_ok());
        assert_eq!(history.purge_expired(offer.valid_until), 0);
    }

    #[test]
    fn test_same_instant_offers_for_two_clients_are_both_kept() {
        let issued = Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0).unwrap();
        let first = Offer::priced(OfferType::Loyalty, "x", FormatTier::QuarterPage, 175.0, 15.0, issued);
        let second = Offer::priced(OfferType::Loyalty, "x", FormatTier::FullPage, 550.0, 15.0, issued);

        let mut history = OfferHistory::new();
        history.record(std::slice::from_ref(&first));
        history.record(std::slice::from_ref(&second));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get_valid(first.id, issued).unwrap().final_price, 148.75);
        assert_eq!(history.get_valid(second.id, issued).unwrap().format, FormatTier::FullPage);
    }
}
