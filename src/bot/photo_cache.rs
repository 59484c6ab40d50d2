//! Per-user cache of the most recently received photo
//!
//! Maps a Telegram user to the `file_id` of the last photo they sent, so a
//! later button press can find the photo it refers to. Last write wins;
//! there is no history of earlier photos.

use moka::future::Cache;
use std::time::Duration;
use teloxide::types::{FileId, UserId};
use tracing::debug;

/// Opaque Telegram handle of an uploaded photo
pub type PhotoRef = FileId;

/// Process-wide mapping `UserId -> PhotoRef`
///
/// Entries are bounded by a time-to-live and a maximum capacity. Both only
/// bound memory: within a normal session a photo stays available until the
/// user uploads another one. Access to distinct users is independent.
#[derive(Clone)]
pub struct PhotoCache {
    cache: Cache<UserId, PhotoRef>,
}

impl PhotoCache {
    /// Creates an empty cache
    ///
    /// # Examples
    ///
    /// ```
    /// use photo_action_bot::bot::PhotoCache;
    ///
    /// let cache = PhotoCache::new(
    ///     86_400,  // 24 hours TTL
    ///     100_000  // max 100k users
    /// );
    /// assert_eq!(cache.entry_count(), 0);
    /// ```
    #[must_use]
    pub fn new(ttl_secs: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Stores `photo` as the current photo of `user`, replacing any previous one
    pub async fn put(&self, user: UserId, photo: PhotoRef) {
        debug!(user_id = user.0, "Caching photo reference");
        self.cache.insert(user, photo).await;
    }

    /// Returns the current photo of `user`, if any
    pub async fn get(&self, user: UserId) -> Option<PhotoRef> {
        self.cache.get(&user).await
    }

    /// Approximate number of cached users
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: &str) -> PhotoRef {
        FileId(id.to_string())
    }

    #[tokio::test]
    async fn test_missing_user_is_absent() {
        let cache = PhotoCache::new(60, 100);
        assert!(cache.get(UserId(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_previous_photo() {
        let cache = PhotoCache::new(60, 100);

        cache.put(UserId(1), photo("first")).await;
        cache.put(UserId(1), photo("second")).await;

        assert_eq!(cache.get(UserId(1)).await, Some(photo("second")));
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let cache = PhotoCache::new(60, 100);

        cache.put(UserId(1), photo("a")).await;
        cache.put(UserId(2), photo("b")).await;

        assert_eq!(cache.get(UserId(1)).await, Some(photo("a")));
        assert_eq!(cache.get(UserId(2)).await, Some(photo("b")));
    }

    #[tokio::test]
    async fn test_entry_count() {
        let cache = PhotoCache::new(60, 100);

        cache.put(UserId(111), photo("x")).await;
        cache.put(UserId(222), photo("y")).await;
        cache.put(UserId(222), photo("z")).await;

        cache.cache.run_pending_tasks().await;

        assert_eq!(cache.entry_count(), 2);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = PhotoCache::new(1, 100);
        cache.put(UserId(7), photo("old")).await;

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(cache.get(UserId(7)).await.is_none());
    }
}
