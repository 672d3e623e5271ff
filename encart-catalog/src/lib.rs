pub mod pricing;
pub mod publication;

pub use pricing::{FormatTier, Money, PricingCatalog, PricingConfig};
pub use publication::{Month, Publication, PublicationSelection, SelectionError};
