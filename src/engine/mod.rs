mod manager;
mod matcher;
pub mod state;
mod traits;

pub use manager::StoreRuleProvider;
pub use matcher::{host_within, DomainSource, RuleSetMatcher};
pub use state::EngineState;
pub use traits::{RuleMatcher, RuleProvider};
