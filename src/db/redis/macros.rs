/// Returns the cached value for a key, or computes and caches it
///
/// On a hit the stored value is deserialized and returned. On a miss the
/// future is awaited, its value queued for storage with the given TTL (in
/// seconds) and returned. A failed cache read is logged and treated as a
/// miss, so an unavailable Redis never hides the computed value. Errors from
/// the future propagate with `?`, so the macro must be used inside a function
/// returning `AppResult`.
///
/// `$key` is evaluated more than once; bind it to a variable first.
///
/// # Example
/// ```rust,ignore
/// let key = CacheKey::Suggestions(fingerprint);
/// let suggestions: Vec<RawSuggestion> =
///     cached!(cache, key, SUGGESTION_CACHE_TTL, provider.request_suggestions(prompt))?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $future:expr) => {{
        match $cache.get_from_cache(&$key).await {
            Ok(Some(hit)) => {
                tracing::debug!(key = %$key, "Cache hit");
                Ok(hit)
            }
            miss => {
                if let Err(e) = miss {
                    tracing::warn!(key = %$key, error = %e, "Cache read failed, computing value");
                }
                let value = $future.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
