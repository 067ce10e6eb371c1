use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    models::{Category, Occasion, OutfitItems, OutfitSuggestion, RawSuggestion, WardrobeItem},
    services::{
        generator::{self, score_combination, MAX_SUGGESTIONS},
        providers::SuggestionProvider,
    },
};

/// Produces outfit suggestions for a wardrobe
///
/// When a provider is configured its suggestions are tried first; anything the
/// provider gets wrong (errors, empty replies, references to items the user
/// does not own) falls back to the rule-based generator.
#[derive(Clone, Default)]
pub struct SuggestionPlanner {
    provider: Option<Arc<dyn SuggestionProvider>>,
}

impl SuggestionPlanner {
    pub fn new(provider: Option<Arc<dyn SuggestionProvider>>) -> Self {
        Self { provider }
    }

    /// A planner that only uses the rule-based generator
    pub fn rule_based() -> Self {
        Self::default()
    }

    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.name())
    }

    pub async fn plan(
        &self,
        items: &[WardrobeItem],
        occasion: Occasion,
        temperature: Option<f64>,
    ) -> Vec<OutfitSuggestion> {
        if let Some(provider) = &self.provider {
            match provider.suggest(items, occasion, temperature).await {
                Ok(raw) => {
                    let received = raw.len();
                    let accepted = validate_suggestions(raw, items, occasion);

                    if !accepted.is_empty() {
                        tracing::info!(
                            provider = provider.name(),
                            received,
                            accepted = accepted.len(),
                            "Using provider suggestions"
                        );
                        return accepted;
                    }

                    tracing::warn!(
                        provider = provider.name(),
                        received,
                        "Provider returned no usable suggestions, falling back to rules"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "Suggestion provider failed, falling back to rules"
                    );
                }
            }
        }

        generator::generate(items, occasion, temperature)
    }
}

/// Keeps the provider suggestions that only reference the caller's own items
///
/// A suggestion is dropped when any referenced identifier is unknown or when a
/// slot points at an item of the wrong category. Only the first accessory is
/// kept and accepted suggestions are scored with the rule-based scorer. The
/// first [`MAX_SUGGESTIONS`] accepted are returned by descending score, ties
/// keeping the provider's order.
pub fn validate_suggestions(
    raw: Vec<RawSuggestion>,
    items: &[WardrobeItem],
    occasion: Occasion,
) -> Vec<OutfitSuggestion> {
    let by_id: HashMap<&str, &WardrobeItem> =
        items.iter().map(|item| (item.id.as_str(), item)).collect();

    let mut accepted: Vec<OutfitSuggestion> = raw
        .into_iter()
        .filter_map(|suggestion| accept(suggestion, &by_id, occasion))
        .take(MAX_SUGGESTIONS)
        .collect();

    accepted.sort_by(|a, b| b.score.total_cmp(&a.score));
    accepted
}

fn accept(
    raw: RawSuggestion,
    by_id: &HashMap<&str, &WardrobeItem>,
    occasion: Occasion,
) -> Option<OutfitSuggestion> {
    let top = lookup(by_id, &raw.top_id, Category::Top)?;
    let bottom = lookup(by_id, &raw.bottom_id, Category::Bottom)?;
    let shoes = lookup(by_id, &raw.shoes_id, Category::Shoes)?;

    let accessories = raw
        .accessory_ids
        .iter()
        .map(|id| lookup(by_id, id, Category::Accessory))
        .collect::<Option<Vec<_>>>()?;
    let accessory = accessories.first().copied();

    Some(OutfitSuggestion {
        items: OutfitItems {
            top_id: top.id.clone(),
            bottom_id: bottom.id.clone(),
            shoes_id: shoes.id.clone(),
            accessory_ids: accessory.map(|a| vec![a.id.clone()]).unwrap_or_default(),
        },
        score: score_combination(top, bottom, shoes, accessory, occasion),
        reasoning: raw.reasoning,
    })
}

fn lookup<'a>(
    by_id: &HashMap<&str, &'a WardrobeItem>,
    id: &str,
    category: Category,
) -> Option<&'a WardrobeItem> {
    by_id
        .get(id)
        .copied()
        .filter(|item| item.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::providers::MockSuggestionProvider;

    fn wardrobe() -> Vec<WardrobeItem> {
        vec![
            WardrobeItem::new("top1", "u1", Category::Top)
                .with_color("white")
                .with_formality(3),
            WardrobeItem::new("top2", "u1", Category::Top).with_color("navy"),
            WardrobeItem::new("bottom1", "u1", Category::Bottom)
                .with_color("navy")
                .with_formality(3),
            WardrobeItem::new("shoes1", "u1", Category::Shoes).with_formality(3),
            WardrobeItem::new("watch1", "u1", Category::Accessory),
            WardrobeItem::new("belt1", "u1", Category::Accessory),
        ]
    }

    fn raw(top: &str, bottom: &str, shoes: &str, accessories: &[&str]) -> RawSuggestion {
        RawSuggestion {
            top_id: top.to_string(),
            bottom_id: bottom.to_string(),
            shoes_id: shoes.to_string(),
            accessory_ids: accessories.iter().map(|a| a.to_string()).collect(),
            reasoning: Some("Balanced colors.".to_string()),
        }
    }

    fn mock_provider(
        response: impl Fn() -> Result<Vec<RawSuggestion>, AppError> + Send + 'static,
    ) -> Arc<dyn SuggestionProvider> {
        let mut mock = MockSuggestionProvider::new();
        mock.expect_suggest()
            .times(1)
            .returning(move |_, _, _| response());
        mock.expect_name().return_const("mock");
        Arc::new(mock)
    }

    #[tokio::test]
    async fn test_rule_based_planner_uses_generator() {
        let planner = SuggestionPlanner::rule_based();
        let items = wardrobe();

        let planned = planner.plan(&items, Occasion::Work, None).await;

        assert_eq!(planned, generator::generate(&items, Occasion::Work, None));
        assert_eq!(planner.provider_name(), None);
    }

    #[tokio::test]
    async fn test_valid_provider_suggestions_are_used() {
        let planner = SuggestionPlanner::new(Some(mock_provider(|| {
            Ok(vec![raw("top1", "bottom1", "shoes1", &["belt1"])])
        })));

        let planned = planner.plan(&wardrobe(), Occasion::Work, None).await;

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].items.top_id, "top1");
        assert_eq!(planned[0].items.accessory_ids, vec!["belt1".to_string()]);
        // 10 formality + 5 color + 1 accessory
        assert_eq!(planned[0].score, 16.0);
        assert_eq!(planned[0].reasoning.as_deref(), Some("Balanced colors."));
    }

    #[tokio::test]
    async fn test_provider_error_falls_back_to_rules() {
        let planner = SuggestionPlanner::new(Some(mock_provider(|| {
            Err(AppError::ExternalApi("service unavailable".to_string()))
        })));
        let items = wardrobe();

        let planned = planner.plan(&items, Occasion::Date, Some(15.0)).await;

        assert_eq!(planned, generator::generate(&items, Occasion::Date, Some(15.0)));
        assert!(planned.iter().all(|s| s.reasoning.is_none()));
    }

    #[tokio::test]
    async fn test_unknown_items_fall_back_to_rules() {
        let planner = SuggestionPlanner::new(Some(mock_provider(|| {
            Ok(vec![raw("someone_elses_top", "bottom1", "shoes1", &[])])
        })));
        let items = wardrobe();

        let planned = planner.plan(&items, Occasion::Work, None).await;

        assert_eq!(planned, generator::generate(&items, Occasion::Work, None));
    }

    #[tokio::test]
    async fn test_empty_provider_reply_falls_back_to_rules() {
        let planner = SuggestionPlanner::new(Some(mock_provider(|| Ok(vec![]))));
        let items = wardrobe();

        let planned = planner.plan(&items, Occasion::Sport, None).await;

        assert!(!planned.is_empty());
        assert_eq!(planned, generator::generate(&items, Occasion::Sport, None));
    }

    #[test]
    fn test_validation_rejects_wrong_slot_category() {
        let items = wardrobe();
        let accepted = validate_suggestions(
            vec![
                raw("bottom1", "top1", "shoes1", &[]),
                raw("top1", "bottom1", "shoes1", &["top2"]),
            ],
            &items,
            Occasion::Work,
        );
        assert!(accepted.is_empty());
    }

    #[test]
    fn test_validation_drops_suggestion_with_unknown_accessory() {
        let items = wardrobe();
        let accepted = validate_suggestions(
            vec![
                raw("top1", "bottom1", "shoes1", &["watch1", "missing"]),
                raw("top2", "bottom1", "shoes1", &[]),
            ],
            &items,
            Occasion::Work,
        );

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].items.top_id, "top2");
        // navy on navy: 10 formality + 0 color
        assert_eq!(accepted[0].score, 10.0);
    }

    #[test]
    fn test_validation_keeps_first_accessory_and_truncates() {
        let items = wardrobe();
        let accepted = validate_suggestions(
            vec![
                raw("top1", "bottom1", "shoes1", &["watch1", "belt1"]),
                raw("top2", "bottom1", "shoes1", &["belt1"]),
                raw("top1", "bottom1", "shoes1", &[]),
                raw("top2", "bottom1", "shoes1", &[]),
            ],
            &items,
            Occasion::Work,
        );

        // the fourth suggestion is cut before ranking
        assert_eq!(accepted.len(), MAX_SUGGESTIONS);
        assert_eq!(accepted[0].items.accessory_ids, vec!["watch1".to_string()]);
        assert_eq!(accepted[0].score, 16.0);
        assert!(accepted[1].items.accessory_ids.is_empty());
        assert_eq!(accepted[1].score, 15.0);
        assert_eq!(accepted[2].items.accessory_ids, vec!["belt1".to_string()]);
        assert_eq!(accepted[2].score, 11.0);
    }

    #[tokio::test]
    async fn test_provider_suggestions_are_ranked_by_score() {
        let planner = SuggestionPlanner::new(Some(mock_provider(|| {
            Ok(vec![
                raw("top2", "bottom1", "shoes1", &[]),
                raw("top1", "bottom1", "shoes1", &[]),
                raw("top2", "bottom1", "shoes1", &["belt1"]),
            ])
        })));

        let planned = planner.plan(&wardrobe(), Occasion::Work, None).await;

        let scores: Vec<f64> = planned.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![15.0, 11.0, 10.0]);
        assert_eq!(planned[0].items.top_id, "top1");
        assert_eq!(planned[1].items.accessory_ids, vec!["belt1".to_string()]);
    }
}
