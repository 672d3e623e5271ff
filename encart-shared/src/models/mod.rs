pub mod events;

pub use events::{SearchEvent, SearchOutcome};
