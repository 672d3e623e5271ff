pub mod expiry;
pub mod generator;
pub mod models;
pub mod profiler;
pub mod rules;

pub use expiry::{HistoryError, OfferHistory};
pub use generator::OfferGenerator;
pub use models::{Offer, OfferPriority, OfferType};
pub use profiler::{Classification, ClientProfile, ClientProfiler, LoyaltyLevel};
