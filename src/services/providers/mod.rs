/// Outfit suggestion provider abstraction
///
/// External services (currently Perplexity's chat completions API) can propose
/// outfits from a user's wardrobe. Their output is untrusted: the planner
/// validates every referenced item before it reaches the client.
use crate::{
    error::AppResult,
    models::{Occasion, RawSuggestion, WardrobeItem},
};

pub mod perplexity;

pub use perplexity::PerplexityProvider;

/// Trait for external outfit suggestion providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Ask the provider for outfits built from `items`
    ///
    /// Returned suggestions may reference unknown items or exceed the
    /// requested count; callers must validate them.
    async fn suggest(
        &self,
        items: &[WardrobeItem],
        occasion: Occasion,
        temperature: Option<f64>,
    ) -> AppResult<Vec<RawSuggestion>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
