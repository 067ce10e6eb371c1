use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{
        CalendarEntry, ItemFilter, ItemPatch, MonthRange, NewItem, NewOutfit, Outfit, User,
        WardrobeItem,
    },
};

/// Persistence for accounts, wardrobe items, saved outfits and calendar entries
///
/// Item and listing operations are scoped to `user_id`. Single-record lookups
/// of outfits and calendar entries are not, so callers can tell "missing"
/// apart from "owned by someone else".
#[async_trait::async_trait]
pub trait WardrobeStore: Send + Sync {
    /// Fails with `Conflict("email_exists")` when the email is taken
    async fn create_user(&self, email: &str, password_hash: &str) -> AppResult<User>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Lists a user's items in creation order
    async fn list_items(&self, user_id: &str, filter: &ItemFilter) -> AppResult<Vec<WardrobeItem>>;

    /// Returns the user's items whose id is in `ids`; unknown or foreign ids are skipped
    async fn find_items(&self, user_id: &str, ids: &[&str]) -> AppResult<Vec<WardrobeItem>>;

    async fn get_item(&self, user_id: &str, id: &str) -> AppResult<Option<WardrobeItem>>;

    async fn create_item(&self, user_id: &str, item: NewItem) -> AppResult<WardrobeItem>;

    /// Returns `None` when the user has no item with this id
    async fn update_item(
        &self,
        user_id: &str,
        id: &str,
        patch: ItemPatch,
    ) -> AppResult<Option<WardrobeItem>>;

    /// Returns whether an item was deleted
    async fn delete_item(&self, user_id: &str, id: &str) -> AppResult<bool>;

    async fn create_outfit(&self, user_id: &str, outfit: NewOutfit) -> AppResult<Outfit>;

    async fn list_outfits(&self, user_id: &str) -> AppResult<Vec<Outfit>>;

    async fn get_outfit(&self, id: &str) -> AppResult<Option<Outfit>>;

    async fn list_calendar(
        &self,
        user_id: &str,
        range: Option<MonthRange>,
    ) -> AppResult<Vec<CalendarEntry>>;

    async fn create_calendar_entry(
        &self,
        user_id: &str,
        outfit_id: &str,
        date: NaiveDate,
    ) -> AppResult<CalendarEntry>;

    async fn get_calendar_entry(&self, id: &str) -> AppResult<Option<CalendarEntry>>;

    /// Returns whether an entry was deleted
    async fn delete_calendar_entry(&self, id: &str) -> AppResult<bool>;
}

/// Mints a new record identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
