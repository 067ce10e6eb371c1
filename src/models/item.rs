use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::{AppError, AppResult};

/// Lowest formality rating an item can carry
pub const MIN_FORMALITY: u8 = 1;
/// Highest formality rating an item can carry
pub const MAX_FORMALITY: u8 = 5;

/// Wardrobe slot an item fills in an outfit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Bottom,
    Shoes,
    Accessory,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Top,
        Category::Bottom,
        Category::Shoes,
        Category::Accessory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Shoes => "shoes",
            Category::Accessory => "accessory",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown category: {}", s)))
    }
}

/// A clothing item in a user's wardrobe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    pub id: String,
    pub user_id: String,
    pub category: Category,
    pub color: Option<String>,
    /// Free-form season tag (e.g. "S", "W", "SS")
    pub season: Option<String>,
    /// Dress level from 1 (casual) to 5 (formal)
    pub formality: Option<u8>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WardrobeItem {
    /// Creates an item with no optional attributes set
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            category,
            color: None,
            season: None,
            formality: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.season = Some(season.into());
        self
    }

    pub fn with_formality(mut self, formality: u8) -> Self {
        self.formality = Some(formality);
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Applies the fields present in a patch
    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(color) = patch.color {
            self.color = Some(color);
        }
        if let Some(season) = patch.season {
            self.season = Some(season);
        }
        if let Some(formality) = patch.formality {
            self.formality = Some(formality);
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
    }
}

/// Request body for creating an item
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub category: Category,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub formality: Option<u8>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewItem {
    pub fn validate(&self) -> AppResult<()> {
        validate_formality(self.formality)?;
        validate_image_url(self.image_url.as_deref())
    }

    /// Builds the stored item for the given owner
    pub fn into_item(self, id: String, user_id: &str) -> WardrobeItem {
        WardrobeItem {
            id,
            user_id: user_id.to_string(),
            category: self.category,
            color: self.color,
            season: self.season,
            formality: self.formality,
            image_url: self.image_url,
            created_at: Utc::now(),
        }
    }
}

/// Request body for a partial item update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub formality: Option<u8>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ItemPatch {
    pub fn validate(&self) -> AppResult<()> {
        validate_formality(self.formality)?;
        validate_image_url(self.image_url.as_deref())
    }
}

/// Query filters for listing items
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ItemFilter {
    pub category: Option<Category>,
    pub color: Option<String>,
    pub season: Option<String>,
}

impl ItemFilter {
    pub fn matches(&self, item: &WardrobeItem) -> bool {
        self.category.map_or(true, |c| item.category == c)
            && self
                .color
                .as_ref()
                .map_or(true, |c| item.color.as_ref() == Some(c))
            && self
                .season
                .as_ref()
                .map_or(true, |s| item.season.as_ref() == Some(s))
    }
}

fn validate_formality(formality: Option<u8>) -> AppResult<()> {
    match formality {
        Some(f) if !(MIN_FORMALITY..=MAX_FORMALITY).contains(&f) => Err(AppError::InvalidInput(
            format!(
                "formality must be between {} and {}",
                MIN_FORMALITY, MAX_FORMALITY
            ),
        )),
        _ => Ok(()),
    }
}

fn validate_image_url(image_url: Option<&str>) -> AppResult<()> {
    match image_url {
        Some(url) => reqwest::Url::parse(url)
            .map(|_| ())
            .map_err(|e| AppError::InvalidInput(format!("imageUrl is not a valid URL: {}", e))),
        None => Ok(()),
    }
}
