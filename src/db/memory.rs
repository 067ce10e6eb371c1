use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use super::store::{new_id, WardrobeStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        CalendarEntry, ItemFilter, ItemPatch, MonthRange, NewItem, NewOutfit, Outfit, User,
        WardrobeItem,
    },
};

/// Process-local store used when no database is configured, and by tests
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<StoreInner>,
}

/// Records kept in insertion order
#[derive(Default)]
struct StoreInner {
    users: Vec<User>,
    items: Vec<WardrobeItem>,
    outfits: Vec<Outfit>,
    calendar: Vec<CalendarEntry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl WardrobeStore for InMemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|user| user.email == email) {
            return Err(AppError::Conflict("email_exists".to_string()));
        }
        let user = User {
            id: new_id(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|user| user.email == email).cloned())
    }

    async fn list_items(&self, user_id: &str, filter: &ItemFilter) -> AppResult<Vec<WardrobeItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .items
            .iter()
            .filter(|item| item.user_id == user_id && filter.matches(item))
            .cloned()
            .collect())
    }

    async fn find_items(&self, user_id: &str, ids: &[&str]) -> AppResult<Vec<WardrobeItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .items
            .iter()
            .filter(|item| item.user_id == user_id && ids.contains(&item.id.as_str()))
            .cloned()
            .collect())
    }

    async fn get_item(&self, user_id: &str, id: &str) -> AppResult<Option<WardrobeItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .items
            .iter()
            .find(|item| item.id == id && item.user_id == user_id)
            .cloned())
    }

    async fn create_item(&self, user_id: &str, item: NewItem) -> AppResult<WardrobeItem> {
        let item = item.into_item(new_id(), user_id);
        let mut inner = self.inner.write().await;
        inner.items.push(item.clone());
        Ok(item)
    }

    async fn update_item(
        &self,
        user_id: &str,
        id: &str,
        patch: ItemPatch,
    ) -> AppResult<Option<WardrobeItem>> {
        let mut inner = self.inner.write().await;
        let updated = inner
            .items
            .iter_mut()
            .find(|item| item.id == id && item.user_id == user_id)
            .map(|item| {
                item.apply(patch);
                item.clone()
            });
        Ok(updated)
    }

    async fn delete_item(&self, user_id: &str, id: &str) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.items.len();
        inner
            .items
            .retain(|item| !(item.id == id && item.user_id == user_id));
        Ok(inner.items.len() < before)
    }

    async fn create_outfit(&self, user_id: &str, outfit: NewOutfit) -> AppResult<Outfit> {
        let outfit = outfit.into_outfit(new_id(), user_id);
        let mut inner = self.inner.write().await;
        inner.outfits.push(outfit.clone());
        Ok(outfit)
    }

    async fn list_outfits(&self, user_id: &str) -> AppResult<Vec<Outfit>> {
        let inner = self.inner.read().await;
        Ok(inner
            .outfits
            .iter()
            .filter(|outfit| outfit.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_outfit(&self, id: &str) -> AppResult<Option<Outfit>> {
        let inner = self.inner.read().await;
        Ok(inner.outfits.iter().find(|outfit| outfit.id == id).cloned())
    }

    async fn list_calendar(
        &self,
        user_id: &str,
        range: Option<MonthRange>,
    ) -> AppResult<Vec<CalendarEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .calendar
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .filter(|entry| range.map_or(true, |r| r.contains(entry.date)))
            .cloned()
            .collect())
    }

    async fn create_calendar_entry(
        &self,
        user_id: &str,
        outfit_id: &str,
        date: NaiveDate,
    ) -> AppResult<CalendarEntry> {
        let entry = CalendarEntry {
            id: new_id(),
            user_id: user_id.to_string(),
            outfit_id: outfit_id.to_string(),
            date,
            created_at: Utc::now(),
        };
        let mut inner = self.inner.write().await;
        inner.calendar.push(entry.clone());
        Ok(entry)
    }

    async fn get_calendar_entry(&self, id: &str) -> AppResult<Option<CalendarEntry>> {
        let inner = self.inner.read().await;
        Ok(inner.calendar.iter().find(|entry| entry.id == id).cloned())
    }

    async fn delete_calendar_entry(&self, id: &str) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.calendar.len();
        inner.calendar.retain(|entry| entry.id != id);
        Ok(inner.calendar.len() < before)
    }
}
