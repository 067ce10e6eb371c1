//! Rule-based outfit generation
//!
//! Enumerates every (top, bottom, shoes) combination of a wardrobe, drops
//! garments unsuited to the temperature, scores what remains and keeps the
//! best few. Everything here is a pure function of its inputs.

use crate::models::{Category, Occasion, OutfitItems, OutfitSuggestion, WardrobeItem};

/// Maximum number of suggestions returned per request
pub const MAX_SUGGESTIONS: usize = 3;

/// Formality assumed when filtering an item that declares none
const NEUTRAL_FORMALITY: u8 = 3;

/// Below this temperature only structured garments (formality >= 3) are kept
const COLD_BELOW_C: f64 = 10.0;
/// Above this temperature only lighter garments (formality <= 3) are kept
const WARM_ABOVE_C: f64 = 23.0;

const DARK_BOTTOM_COLORS: [&str; 4] = ["navy", "black", "gray", "charcoal"];
const LIGHT_TOP_COLORS: [&str; 4] = ["white", "lightgray", "blue", "lightblue"];

const DARK_BOTTOM_BONUS: f64 = 3.0;
const LIGHT_TOP_BONUS: f64 = 2.0;
const MONOCHROME_PENALTY: f64 = 5.0;
const ACCESSORY_BONUS: f64 = 1.0;

/// A scored combination considered during generation
#[derive(Debug, Clone, Copy)]
pub struct OutfitCandidate<'a> {
    pub top: &'a WardrobeItem,
    pub bottom: &'a WardrobeItem,
    pub shoes: &'a WardrobeItem,
    pub accessory: Option<&'a WardrobeItem>,
    pub score: f64,
}

impl From<OutfitCandidate<'_>> for OutfitSuggestion {
    fn from(candidate: OutfitCandidate<'_>) -> Self {
        OutfitSuggestion {
            items: OutfitItems {
                top_id: candidate.top.id.clone(),
                bottom_id: candidate.bottom.id.clone(),
                shoes_id: candidate.shoes.id.clone(),
                accessory_ids: candidate
                    .accessory
                    .map(|a| vec![a.id.clone()])
                    .unwrap_or_default(),
            },
            score: candidate.score,
            reasoning: None,
        }
    }
}

/// A wardrobe split by category, input order preserved within each group
#[derive(Debug, Default)]
struct Wardrobe<'a> {
    tops: Vec<&'a WardrobeItem>,
    bottoms: Vec<&'a WardrobeItem>,
    shoes: Vec<&'a WardrobeItem>,
    accessories: Vec<&'a WardrobeItem>,
}

impl<'a> Wardrobe<'a> {
    fn partition(items: &'a [WardrobeItem]) -> Self {
        let mut wardrobe = Wardrobe::default();
        for item in items {
            match item.category {
                Category::Top => wardrobe.tops.push(item),
                Category::Bottom => wardrobe.bottoms.push(item),
                Category::Shoes => wardrobe.shoes.push(item),
                Category::Accessory => wardrobe.accessories.push(item),
            }
        }
        wardrobe
    }
}

/// Generates up to [`MAX_SUGGESTIONS`] outfits ranked by descending score
///
/// Combinations with equal scores keep their enumeration order (tops outermost,
/// then bottoms, then shoes). Every combination carries the wardrobe's first
/// accessory, if any. An empty result means the wardrobe lacks a top, bottom
/// or pair of shoes suitable for the temperature.
pub fn generate(
    items: &[WardrobeItem],
    occasion: Occasion,
    temperature: Option<f64>,
) -> Vec<OutfitSuggestion> {
    let wardrobe = Wardrobe::partition(items);

    let tops = filter_by_temperature(&wardrobe.tops, temperature);
    let bottoms = filter_by_temperature(&wardrobe.bottoms, temperature);
    let shoes = filter_by_temperature(&wardrobe.shoes, temperature);
    let accessory = wardrobe.accessories.first().copied();

    let mut candidates: Vec<OutfitCandidate> = combinations(&tops, &bottoms, &shoes)
        .map(|(top, bottom, shoes)| OutfitCandidate {
            top,
            bottom,
            shoes,
            accessory,
            score: score_combination(top, bottom, shoes, accessory, occasion),
        })
        .collect();

    tracing::debug!(
        occasion = %occasion,
        temperature = ?temperature,
        candidates = candidates.len(),
        "Scored outfit candidates"
    );

    // sort_by is stable, so ties stay in enumeration order
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    candidates
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(OutfitSuggestion::from)
        .collect()
}

/// Lazily walks tops × bottoms × shoes
fn combinations<'a>(
    tops: &'a [&'a WardrobeItem],
    bottoms: &'a [&'a WardrobeItem],
    shoes: &'a [&'a WardrobeItem],
) -> impl Iterator<Item = (&'a WardrobeItem, &'a WardrobeItem, &'a WardrobeItem)> + 'a {
    tops.iter().flat_map(move |&top| {
        bottoms
            .iter()
            .flat_map(move |&bottom| shoes.iter().map(move |&pair| (top, bottom, pair)))
    })
}

/// Keeps the items suited to the temperature; all items pass when it is unknown
pub fn filter_by_temperature<'a>(
    items: &[&'a WardrobeItem],
    temperature: Option<f64>,
) -> Vec<&'a WardrobeItem> {
    match temperature {
        None => items.to_vec(),
        Some(temp) => items
            .iter()
            .copied()
            .filter(|item| suits_temperature(item, temp))
            .collect(),
    }
}

/// Heuristic temperature bands: formality stands in for garment weight
pub fn suits_temperature(item: &WardrobeItem, temperature: f64) -> bool {
    let formality = item.formality.unwrap_or(NEUTRAL_FORMALITY);
    if temperature < COLD_BELOW_C {
        formality >= NEUTRAL_FORMALITY
    } else if temperature > WARM_ABOVE_C {
        formality <= NEUTRAL_FORMALITY
    } else {
        true
    }
}

/// Total score: formality fit + color compatibility + accessory bonus
pub fn score_combination(
    top: &WardrobeItem,
    bottom: &WardrobeItem,
    shoes: &WardrobeItem,
    accessory: Option<&WardrobeItem>,
    occasion: Occasion,
) -> f64 {
    score_formality(top, bottom, shoes, occasion)
        + score_colors(top, bottom)
        + score_accessory(accessory)
}

/// 10 for a perfect match, minus 3 per point the mean formality is off target
///
/// Items without a formality count as exactly on target.
pub fn score_formality(
    top: &WardrobeItem,
    bottom: &WardrobeItem,
    shoes: &WardrobeItem,
    occasion: Occasion,
) -> f64 {
    let target = occasion.target_formality();
    let level = |item: &WardrobeItem| item.formality.map(f64::from).unwrap_or(target);

    let mean = (level(top) + level(bottom) + level(shoes)) / 3.0;
    let delta = (mean - target).abs();

    (10.0 - delta * 3.0).max(0.0)
}

/// Dark bottoms and light tops earn points; a top and bottom of the same color lose some
///
/// Shoes do not take part in the color rule.
pub fn score_colors(top: &WardrobeItem, bottom: &WardrobeItem) -> f64 {
    let mut score = 0.0;

    if color_in(bottom, &DARK_BOTTOM_COLORS) {
        score += DARK_BOTTOM_BONUS;
    }
    if color_in(top, &LIGHT_TOP_COLORS) {
        score += LIGHT_TOP_BONUS;
    }
    if let (Some(top_color), Some(bottom_color)) = (&top.color, &bottom.color) {
        if top_color == bottom_color {
            score -= MONOCHROME_PENALTY;
        }
    }

    f64::max(score, 0.0)
}

pub fn score_accessory(accessory: Option<&WardrobeItem>) -> f64 {
    if accessory.is_some() {
        ACCESSORY_BONUS
    } else {
        0.0
    }
}

fn color_in(item: &WardrobeItem, palette: &[&str]) -> bool {
    item.color
        .as_deref()
        .is_some_and(|color| palette.iter().any(|p| p.eq_ignore_ascii_case(color)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn item(id: &str, category: Category) -> WardrobeItem {
        WardrobeItem::new(id, "user1", category)
    }

    fn basic_wardrobe() -> Vec<WardrobeItem> {
        vec![
            item("top1", Category::Top).with_color("white").with_formality(3),
            item("bottom1", Category::Bottom)
                .with_color("navy")
                .with_formality(3),
            item("shoes1", Category::Shoes).with_formality(3),
        ]
    }

    fn large_wardrobe() -> Vec<WardrobeItem> {
        vec![
            item("t1", Category::Top).with_color("white").with_formality(3),
            item("t2", Category::Top).with_color("red").with_formality(1),
            item("t3", Category::Top).with_color("Blue"),
            item("b1", Category::Bottom).with_color("navy").with_formality(4),
            item("b2", Category::Bottom).with_color("red").with_formality(2),
            item("s1", Category::Shoes).with_formality(5),
            item("s2", Category::Shoes).with_color("black"),
            item("a1", Category::Accessory).with_color("silver"),
            item("a2", Category::Accessory).with_color("gold"),
        ]
    }

    #[test]
    fn test_empty_wardrobe_yields_nothing() {
        assert!(generate(&[], Occasion::Work, None).is_empty());
    }

    #[test]
    fn test_missing_category_yields_nothing() {
        let wardrobe = basic_wardrobe();
        for missing in [Category::Top, Category::Bottom, Category::Shoes] {
            let items: Vec<WardrobeItem> = wardrobe
                .iter()
                .filter(|i| i.category != missing)
                .cloned()
                .collect();
            assert!(
                generate(&items, Occasion::Work, None).is_empty(),
                "expected no suggestions without {}",
                missing
            );
        }
    }

    #[test]
    fn test_perfect_work_outfit_scores_fifteen() {
        let suggestions = generate(&basic_wardrobe(), Occasion::Work, None);

        assert_eq!(suggestions.len(), 1);
        let suggestion = &suggestions[0];
        assert_eq!(suggestion.items.top_id, "top1");
        assert_eq!(suggestion.items.bottom_id, "bottom1");
        assert_eq!(suggestion.items.shoes_id, "shoes1");
        assert!(suggestion.items.accessory_ids.is_empty());
        assert_eq!(suggestion.score, 15.0);
        assert!(suggestion.reasoning.is_none());
    }

    #[test]
    fn test_at_most_three_suggestions_sorted_by_score() {
        let suggestions = generate(&large_wardrobe(), Occasion::Work, None);

        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert!(suggestions
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score));
    }

    #[test]
    fn test_suggestions_only_reference_input_ids() {
        let items = large_wardrobe();
        let ids: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();

        for temperature in [None, Some(5.0), Some(15.0), Some(30.0)] {
            for occasion in [Occasion::Work, Occasion::Date, Occasion::Sport] {
                for suggestion in generate(&items, occasion, temperature) {
                    assert!(suggestion.items.ids().iter().all(|id| ids.contains(id)));
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let items = large_wardrobe();
        let first = generate(&items, Occasion::Date, Some(18.0));
        let second = generate(&items, Occasion::Date, Some(18.0));
        assert_eq!(first, second);
    }

    #[test]
    fn test_first_accessory_attached_to_every_combination() {
        let suggestions = generate(&large_wardrobe(), Occasion::Sport, None);

        assert!(!suggestions.is_empty());
        for suggestion in suggestions {
            assert_eq!(suggestion.items.accessory_ids, vec!["a1".to_string()]);
        }
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let items = vec![
            item("t1", Category::Top),
            item("t2", Category::Top),
            item("b1", Category::Bottom),
            item("s1", Category::Shoes),
            item("s2", Category::Shoes),
        ];

        let suggestions = generate(&items, Occasion::Work, None);
        let order: Vec<(&str, &str)> = suggestions
            .iter()
            .map(|s| (s.items.top_id.as_str(), s.items.shoes_id.as_str()))
            .collect();

        assert_eq!(order, vec![("t1", "s1"), ("t1", "s2"), ("t2", "s1")]);
        assert!(suggestions.iter().all(|s| s.score == 10.0));
    }

    #[test]
    fn test_temperature_bands() {
        let casual = item("casual", Category::Top).with_formality(2);
        let formal = item("formal", Category::Top).with_formality(4);
        let unknown = item("unknown", Category::Top);

        assert!(!suits_temperature(&casual, 5.0));
        assert!(suits_temperature(&casual, 15.0));
        assert!(suits_temperature(&casual, 28.0));

        assert!(suits_temperature(&formal, 5.0));
        assert!(suits_temperature(&formal, 15.0));
        assert!(!suits_temperature(&formal, 28.0));

        for temp in [5.0, 15.0, 28.0] {
            assert!(suits_temperature(&unknown, temp));
        }
    }

    #[test]
    fn test_temperature_band_edges_are_mild() {
        let casual = item("casual", Category::Top).with_formality(1);
        let formal = item("formal", Category::Top).with_formality(5);

        assert!(suits_temperature(&casual, 10.0));
        assert!(!suits_temperature(&casual, 9.9));
        assert!(suits_temperature(&formal, 23.0));
        assert!(!suits_temperature(&formal, 23.1));
    }

    #[test]
    fn test_cold_weather_excludes_casual_garments() {
        let items = vec![
            item("light_top", Category::Top).with_formality(2),
            item("bottom", Category::Bottom).with_formality(3),
            item("shoes", Category::Shoes).with_formality(3),
        ];

        assert!(generate(&items, Occasion::Work, Some(5.0)).is_empty());
        assert_eq!(generate(&items, Occasion::Work, Some(15.0)).len(), 1);
    }

    #[test]
    fn test_accessories_ignore_temperature() {
        let items = vec![
            item("top", Category::Top),
            item("bottom", Category::Bottom),
            item("shoes", Category::Shoes),
            item("scarf", Category::Accessory).with_formality(5),
        ];

        let suggestions = generate(&items, Occasion::Work, Some(30.0));
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].items.accessory_ids, vec!["scarf".to_string()]);
        assert_eq!(suggestions[0].score, 11.0);
    }

    #[test]
    fn test_filter_without_temperature_keeps_everything() {
        let casual = item("c", Category::Top).with_formality(1);
        let formal = item("f", Category::Top).with_formality(5);
        let pool = vec![&casual, &formal];

        assert_eq!(filter_by_temperature(&pool, None).len(), 2);
        assert_eq!(filter_by_temperature(&pool, Some(0.0)), vec![&formal]);
        assert_eq!(filter_by_temperature(&pool, Some(35.0)), vec![&casual]);
    }

    #[test]
    fn test_formality_score() {
        let top = item("t", Category::Top).with_formality(5);
        let bottom = item("b", Category::Bottom).with_formality(5);
        let shoes = item("s", Category::Shoes).with_formality(5);

        // mean 5, target 3 -> 10 - 6
        assert_eq!(score_formality(&top, &bottom, &shoes, Occasion::Work), 4.0);
        // mean 5, target 2 -> 10 - 9
        assert_eq!(score_formality(&top, &bottom, &shoes, Occasion::Sport), 1.0);

        let sneakers = item("s", Category::Shoes).with_formality(1);
        let tee = item("t", Category::Top).with_formality(1);
        let joggers = item("b", Category::Bottom).with_formality(1);
        assert_eq!(score_formality(&tee, &joggers, &sneakers, Occasion::Sport), 7.0);
    }

    #[test]
    fn test_formality_score_floors_at_zero() {
        // ratings outside 1..=5 are rejected at the API, but the score still never goes negative
        let top = item("t", Category::Top).with_formality(9);
        let bottom = item("b", Category::Bottom).with_formality(9);
        let shoes = item("s", Category::Shoes).with_formality(9);
        assert_eq!(score_formality(&top, &bottom, &shoes, Occasion::Work), 0.0);
    }

    #[test]
    fn test_missing_formality_counts_as_target() {
        let top = item("t", Category::Top);
        let bottom = item("b", Category::Bottom);
        let shoes = item("s", Category::Shoes);

        for occasion in [Occasion::Work, Occasion::Date, Occasion::Sport] {
            assert_eq!(score_formality(&top, &bottom, &shoes, occasion), 10.0);
        }
    }

    #[test]
    fn test_color_rule_light_top_dark_bottom() {
        let top = item("t", Category::Top).with_color("white");
        let bottom = item("b", Category::Bottom).with_color("navy");
        assert_eq!(score_colors(&top, &bottom), 5.0);
    }

    #[test]
    fn test_color_rule_monochrome_penalty_floors_at_zero() {
        let top = item("t", Category::Top).with_color("navy");
        let bottom = item("b", Category::Bottom).with_color("navy");
        assert_eq!(score_colors(&top, &bottom), 0.0);
    }

    #[test]
    fn test_color_rule_is_case_insensitive() {
        let top = item("t", Category::Top).with_color("LightBlue");
        let bottom = item("b", Category::Bottom).with_color("CHARCOAL");
        assert_eq!(score_colors(&top, &bottom), 5.0);
    }

    #[test]
    fn test_color_rule_is_not_symmetric() {
        let top = item("t", Category::Top).with_color("navy");
        let bottom = item("b", Category::Bottom).with_color("white");
        assert_eq!(score_colors(&top, &bottom), 0.0);
    }

    #[test]
    fn test_monochrome_penalty_uses_exact_value() {
        // different case is not the same color value
        let top = item("t", Category::Top).with_color("Blue");
        let bottom = item("b", Category::Bottom).with_color("blue");
        assert_eq!(score_colors(&top, &bottom), 2.0);

        let plain_top = item("t", Category::Top);
        let plain_bottom = item("b", Category::Bottom);
        assert_eq!(score_colors(&plain_top, &plain_bottom), 0.0);
    }

    #[test]
    fn test_accessory_bonus() {
        let belt = item("a", Category::Accessory);
        assert_eq!(score_accessory(Some(&belt)), 1.0);
        assert_eq!(score_accessory(None), 0.0);
    }

    #[test]
    fn test_best_combination_ranked_first() {
        let items = vec![
            item("red_top", Category::Top).with_color("red"),
            item("white_top", Category::Top).with_color("white"),
            item("red_bottom", Category::Bottom).with_color("red"),
            item("navy_bottom", Category::Bottom).with_color("navy"),
            item("shoes", Category::Shoes),
        ];

        let suggestions = generate(&items, Occasion::Date, None);

        assert_eq!(suggestions[0].items.top_id, "white_top");
        assert_eq!(suggestions[0].items.bottom_id, "navy_bottom");
        assert_eq!(suggestions[0].score, 15.0);
        // red/red is penalised to 10 and falls out of the top three
        assert!(suggestions
            .iter()
            .all(|s| !(s.items.top_id == "red_top" && s.items.bottom_id == "red_bottom")));
    }
}
