mod calendar;
mod item;
mod outfit;
mod summary;
mod user;

pub use calendar::{
    parse_calendar_date, CalendarEntry, CalendarQuery, MonthRange, NewCalendarEntry,
};
pub use item::{
    Category, ItemFilter, ItemPatch, NewItem, WardrobeItem, MAX_FORMALITY, MIN_FORMALITY,
};
pub use outfit::{
    GenerationRequest, NewOutfit, Occasion, Outfit, OutfitItems, OutfitSuggestion, RawSuggestion,
};
pub use summary::{CategoryCounts, Diversity, WardrobeSummary};
pub use user::{AuthToken, Credentials, User, UserProfile, MIN_PASSWORD_LEN};
