pub mod auth;
pub mod generator;
pub mod planner;
pub mod providers;

pub use auth::{Authenticator, HashParams, TokenSigner};
pub use generator::generate;
pub use planner::SuggestionPlanner;
