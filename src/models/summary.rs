use serde::Serialize;
use std::collections::BTreeMap;

use super::{Category, WardrobeItem};

/// Item counts per category; every category is always reported
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CategoryCounts {
    pub top: usize,
    pub bottom: usize,
    pub shoes: usize,
    pub accessory: usize,
}

impl CategoryCounts {
    fn increment(&mut self, category: Category) {
        match category {
            Category::Top => self.top += 1,
            Category::Bottom => self.bottom += 1,
            Category::Shoes => self.shoes += 1,
            Category::Accessory => self.accessory += 1,
        }
    }

    fn non_empty(&self) -> usize {
        [self.top, self.bottom, self.shoes, self.accessory]
            .iter()
            .filter(|count| **count > 0)
            .count()
    }
}

/// Number of distinct values seen per attribute
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Diversity {
    pub categories: usize,
    pub seasons: usize,
    pub colors: usize,
}

/// Aggregate view of a user's wardrobe
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeSummary {
    pub total_items: usize,
    pub by_category: CategoryCounts,
    pub by_season: BTreeMap<String, usize>,
    pub by_color: BTreeMap<String, usize>,
    pub diversity: Diversity,
}

impl WardrobeSummary {
    /// Items without a season or color are left out of those breakdowns
    pub fn from_items(items: &[WardrobeItem]) -> Self {
        let mut by_category = CategoryCounts::default();
        let mut by_season: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_color: BTreeMap<String, usize> = BTreeMap::new();

        for item in items {
            by_category.increment(item.category);
            if let Some(season) = &item.season {
                *by_season.entry(season.clone()).or_default() += 1;
            }
            if let Some(color) = &item.color {
                *by_color.entry(color.clone()).or_default() += 1;
            }
        }

        let diversity = Diversity {
            categories: by_category.non_empty(),
            seasons: by_season.len(),
            colors: by_color.len(),
        };

        Self {
            total_items: items.len(),
            by_category,
            by_season,
            by_color,
            diversity,
        }
    }
}
