//! Routing provider contract and response caching.
//!
//! The library never talks to a routing service itself; callers supply a
//! [`RouteFetcher`]. Provider failures are a dedicated type so the batch
//! driver can distinguish retryable throttling from terminal failures,
//! which degrade the affected route to [`Route::zero`] instead of aborting
//! the batch.

use std::collections::HashMap;
use std::sync::Mutex;

use log::{debug, warn};
use thiserror::Error;

use crate::{Coordinate, Route};

/// Errors a routing provider can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The provider throttled the request; retrying may succeed.
    #[error("routing provider rate limited the request")]
    RateLimited,

    /// The provider could not be reached or returned a server error.
    #[error("routing provider unavailable: {reason}")]
    Unavailable { reason: String },

    /// The provider responded with something that is not a route.
    #[error("routing provider returned a malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Source of routes between coordinate pairs.
pub trait RouteFetcher {
    /// Fetch the route from `origin` to `destination`.
    fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> std::result::Result<Route, FetchError>;
}

/// Retries after throttling before a request is given up.
const RATE_LIMIT_ATTEMPTS: usize = 3;

/// Fetch a route, degrading terminal failures to [`Route::zero`].
///
/// Rate limiting is retried a few times; any remaining failure is logged
/// and the zero route is returned so downstream results carry zeros for
/// the affected pair instead of aborting the batch.
pub fn fetch_or_zero<F: RouteFetcher + ?Sized>(
    fetcher: &F,
    origin: Coordinate,
    destination: Coordinate,
) -> Route {
    let mut last_error = None;
    for _ in 0..RATE_LIMIT_ATTEMPTS {
        match fetcher.fetch_route(origin, destination) {
            Ok(route) => return route,
            Err(error) => {
                let retryable = error.is_retryable();
                last_error = Some(error);
                if !retryable {
                    break;
                }
            }
        }
    }
    if let Some(error) = last_error {
        warn!(
            "[fetch] route {},{} -> {},{} failed ({error}), using zero route",
            origin.latitude, origin.longitude, destination.latitude, destination.longitude
        );
    }
    Route::zero()
}

type CacheKey = ((u64, u64), (u64, u64));

/// Caching wrapper around a [`RouteFetcher`].
///
/// Successful responses are memoized by exact origin/destination so repeated
/// coordinate pairs in a batch hit the provider once. Failures are not
/// cached. The cache is behind a [`Mutex`] and shared across worker threads.
pub struct CachedFetcher<F> {
    inner: F,
    cache: Mutex<HashMap<CacheKey, Route>>,
}

impl<F> CachedFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct responses currently cached.
    pub fn cached_responses(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl<F: RouteFetcher> RouteFetcher for CachedFetcher<F> {
    fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> std::result::Result<Route, FetchError> {
        let key = (origin.bits(), destination.bits());

        // A poisoned cache lock falls through to an uncached fetch.
        if let Ok(cache) = self.cache.lock() {
            if let Some(route) = cache.get(&key) {
                debug!(
                    "[fetch] cache hit for {},{} -> {},{}",
                    origin.latitude, origin.longitude, destination.latitude, destination.longitude
                );
                return Ok(route.clone());
            }
        }

        let route = self.inner.fetch_route(origin, destination)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, route.clone());
        }
        Ok(route)
    }
}
