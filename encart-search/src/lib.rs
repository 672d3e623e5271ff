pub mod coordinator;
pub mod debounce;

pub use coordinator::{SearchCoordinator, SearchError};
pub use debounce::SearchDebouncer;
