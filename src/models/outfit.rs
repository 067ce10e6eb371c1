use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Context an outfit is chosen for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Occasion {
    Work,
    Date,
    Sport,
}

impl Occasion {
    /// Formality level an outfit for this occasion should average to
    pub fn target_formality(&self) -> f64 {
        match self {
            Occasion::Work => 3.0,
            Occasion::Date => 3.0,
            Occasion::Sport => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Occasion::Work => "work",
            Occasion::Date => "date",
            Occasion::Sport => "sport",
        }
    }
}

impl Display for Occasion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request body for outfit generation
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub occasion: Occasion,
    /// Outside temperature in °C
    #[serde(default, rename = "temp", alias = "temperature")]
    pub temperature: Option<f64>,
}

/// Item identifiers making up one outfit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutfitItems {
    pub top_id: String,
    pub bottom_id: String,
    pub shoes_id: String,
    #[serde(default)]
    pub accessory_ids: Vec<String>,
}

impl OutfitItems {
    /// All referenced identifiers, accessories last
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = vec![
            self.top_id.as_str(),
            self.bottom_id.as_str(),
            self.shoes_id.as_str(),
        ];
        ids.extend(self.accessory_ids.iter().map(String::as_str));
        ids
    }
}

/// A ranked outfit returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutfitSuggestion {
    pub items: OutfitItems,
    pub score: f64,
    /// Stylist explanation, only present for provider-backed suggestions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// A saved outfit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Outfit {
    pub id: String,
    pub user_id: String,
    pub top_id: String,
    pub bottom_id: String,
    pub shoes_id: String,
    pub accessory_ids: Vec<String>,
    pub occasion: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for saving an outfit
#[derive(Debug, Clone, Deserialize)]
pub struct NewOutfit {
    pub items: OutfitItems,
    #[serde(default)]
    pub occasion: Option<String>,
}

impl NewOutfit {
    pub fn into_outfit(self, id: String, user_id: &str) -> Outfit {
        Outfit {
            id,
            user_id: user_id.to_string(),
            top_id: self.items.top_id,
            bottom_id: self.items.bottom_id,
            shoes_id: self.items.shoes_id,
            accessory_ids: self.items.accessory_ids,
            occasion: self.occasion,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Suggestion Provider Types
// ============================================================================

/// Outfit proposed by an external suggestion provider, before validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawSuggestion {
    pub top_id: String,
    pub bottom_id: String,
    pub shoes_id: String,
    #[serde(default)]
    pub accessory_ids: Vec<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_formality() {
        assert_eq!(Occasion::Work.target_formality(), 3.0);
        assert_eq!(Occasion::Date.target_formality(), 3.0);
        assert_eq!(Occasion::Sport.target_formality(), 2.0);
    }

    #[test]
    fn test_generation_request_accepts_temp_and_temperature() {
        let short: GenerationRequest =
            serde_json::from_str(r#"{"occasion":"work","temp":12.5}"#).unwrap();
        assert_eq!(short.occasion, Occasion::Work);
        assert_eq!(short.temperature, Some(12.5));

        let long: GenerationRequest =
            serde_json::from_str(r#"{"occasion":"sport","temperature":30}"#).unwrap();
        assert_eq!(long.temperature, Some(30.0));

        let none: GenerationRequest = serde_json::from_str(r#"{"occasion":"date"}"#).unwrap();
        assert_eq!(none.temperature, None);
    }

    #[test]
    fn test_generation_request_rejects_unknown_occasion() {
        let parsed = serde_json::from_str::<GenerationRequest>(r#"{"occasion":"party"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_suggestion_wire_shape() {
        let suggestion = OutfitSuggestion {
            items: OutfitItems {
                top_id: "t".to_string(),
                bottom_id: "b".to_string(),
                shoes_id: "s".to_string(),
                accessory_ids: vec![],
            },
            score: 15.0,
            reasoning: None,
        };
        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "items": {"topId": "t", "bottomId": "b", "shoesId": "s", "accessoryIds": []},
                "score": 15.0
            })
        );
    }

    #[test]
    fn test_outfit_items_ids_order() {
        let items = OutfitItems {
            top_id: "t".to_string(),
            bottom_id: "b".to_string(),
            shoes_id: "s".to_string(),
            accessory_ids: vec!["a".to_string()],
        };
        assert_eq!(items.ids(), vec!["t", "b", "s", "a"]);
    }

    #[test]
    fn test_raw_suggestion_defaults() {
        let raw: RawSuggestion =
            serde_json::from_str(r#"{"topId":"t","bottomId":"b","shoesId":"s"}"#).unwrap();
        assert!(raw.accessory_ids.is_empty());
        assert!(raw.reasoning.is_none());
    }
}
