//! Unified error handling for the crate.
//!
//! All fallible public operations return [`Result`] with [`OverlapError`].
//! Routing provider failures are a separate, retry-aware type
//! ([`crate::fetch::FetchError`]) because the batch driver degrades them
//! instead of propagating.

use thiserror::Error;

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OverlapError>;

/// Errors that can occur during overlap computation.
#[derive(Debug, Error)]
pub enum OverlapError {
    /// A route has too few points to form a polyline.
    #[error("route '{label}' has {point_count} point(s) but at least {minimum_required} are required")]
    InsufficientPoints {
        label: String,
        point_count: usize,
        minimum_required: usize,
    },

    /// A configuration parameter is out of range.
    #[error("invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A coordinate string could not be parsed.
    #[error("malformed coordinate '{raw}': expected 'latitude,longitude' in decimal degrees")]
    MalformedCoordinate { raw: String },

    /// An input file could not be read or parsed.
    #[error("failed to read input '{path}': {reason}")]
    InvalidInput { path: String, reason: String },
}

impl OverlapError {
    /// Construct an [`OverlapError::InsufficientPoints`] for the given route.
    pub fn insufficient_points(label: impl Into<String>, point_count: usize) -> Self {
        Self::InsufficientPoints {
            label: label.into(),
            point_count,
            minimum_required: 2,
        }
    }
}

/// Extension trait for converting `Option<T>` into crate results.
pub trait OptionExt<T> {
    /// Convert `None` into [`OverlapError::InsufficientPoints`].
    fn or_insufficient_points(self, label: &str, point_count: usize) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_insufficient_points(self, label: &str, point_count: usize) -> Result<T> {
        self.ok_or_else(|| OverlapError::insufficient_points(label, point_count))
    }
}
