/// Read-through caching around an async computation.
///
/// Looks `$key` up in `$cache`; on a hit the cached value is returned. On a
/// miss `$block` is awaited, its value is queued for caching with `$ttl`
/// seconds to live, and then returned. A failed cache read counts as a miss;
/// errors from the block are propagated with `?`, so the macro must be used
/// inside a function returning `AppResult`.
///
/// # Example
/// ```rust,ignore
/// let movie: AppResult<Movie> = cached!(self.cache, CacheKey::Movie(id), 3600, async {
///     self.load_movie(id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, loading from source");
                None
            }
        };
        match hit {
            Some(cached) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            None => {
                tracing::debug!(key = %key, "Cache miss");
                let value = $block.await?;
                if let Err(e) = $cache.put_later(&key, &value, $ttl) {
                    tracing::warn!(key = %key, error = %e, "Value not cached");
                }
                Ok(value)
            }
        }
    }};
}
