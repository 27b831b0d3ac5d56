//! Database schema retrieval and caching.

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};

use async_trait::async_trait;

/// Error returned by a [`SchemaProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaError {
    reason: String,
}

impl SchemaError {
    /// Creates an error with the given reason.
    #[inline]
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error getting schema: {}", self.reason)
    }
}

impl StdError for SchemaError {}

/// A source of the textual description of the database structure.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Returns the schema text, e.g. the newline-joined table definitions.
    async fn schema(&self) -> Result<String, SchemaError>;
}

/// A single-owner cache in front of a [`SchemaProvider`].
///
/// The provider is asked at most once successfully; failures are not
/// cached, so a later turn tries again.
pub struct SchemaCache {
    provider: Option<Box<dyn SchemaProvider>>,
    cached: Option<String>,
}

impl SchemaCache {
    /// Creates an empty cache backed by `provider`.
    #[inline]
    pub fn new<P: SchemaProvider + 'static>(provider: P) -> Self {
        Self {
            provider: Some(Box::new(provider)),
            cached: None,
        }
    }

    /// Creates a cache already holding `schema`, with no provider behind it.
    #[inline]
    pub fn with_schema<S: Into<String>>(schema: S) -> Self {
        Self {
            provider: None,
            cached: Some(schema.into()),
        }
    }

    /// Returns the cached schema, fetching it first if needed.
    ///
    /// Returns `None` only when nothing is cached and the fetch failed.
    pub async fn get_or_populate(&mut self) -> Option<&str> {
        if self.cached.is_none() {
            if let Some(provider) = &self.provider {
                match provider.schema().await {
                    Ok(schema) => {
                        debug!("schema cached ({} bytes)", schema.len());
                        self.cached = Some(schema);
                    }
                    Err(err) => {
                        warn!("failed to fetch schema: {err}");
                    }
                }
            }
        }
        self.cached.as_deref()
    }

    /// Returns the cached schema without fetching.
    #[inline]
    pub fn cached(&self) -> Option<&str> {
        self.cached.as_deref()
    }
}

impl Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("has_provider", &self.provider.is_some())
            .field("cached", &self.cached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        fail_first: bool,
    }

    #[async_trait]
    impl SchemaProvider for CountingProvider {
        async fn schema(&self) -> Result<String, SchemaError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                return Err(SchemaError::new("database is locked"));
            }
            Ok("CREATE TABLE Artist (ArtistId INTEGER, Name TEXT)".to_owned())
        }
    }

    #[tokio::test]
    async fn test_fetches_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache = SchemaCache::new(CountingProvider {
            calls: Arc::clone(&calls),
            fail_first: false,
        });
        assert_eq!(cache.cached(), None);

        for _ in 0..3 {
            let schema = cache.get_or_populate().await.unwrap();
            assert!(schema.starts_with("CREATE TABLE Artist"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.cached().is_some());
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache = SchemaCache::new(CountingProvider {
            calls: Arc::clone(&calls),
            fail_first: true,
        });

        assert_eq!(cache.get_or_populate().await, None);
        assert_eq!(cache.cached(), None);
        assert!(cache.get_or_populate().await.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_prepopulated() {
        let mut cache = SchemaCache::with_schema("CREATE TABLE t (x)");
        assert_eq!(cache.cached(), Some("CREATE TABLE t (x)"));
        assert_eq!(cache.get_or_populate().await, Some("CREATE TABLE t (x)"));
    }

    #[test]
    fn test_error_display() {
        let err = SchemaError::new("no such table");
        assert_eq!(err.to_string(), "Error getting schema: no such table");
        assert_eq!(err.reason(), "no such table");
    }
}
