//! Batch processing of many route pairs.
//!
//! Each input pair names two origin/destination coordinate pairs. Routes
//! are fetched through a [`RouteFetcher`] (terminal fetch failures degrade
//! the pair to zeros) and the overlap is computed per pair with a shared
//! configuration. Pairs are independent, so the parallel variant simply
//! fans them out with rayon.

use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::fetch::{fetch_or_zero, RouteFetcher};
use crate::metrics::RouteMetrics;
use crate::orchestrator::compute_overlap;
use crate::{Coordinate, OverlapConfig, OverlapResult, Result};

/// One batch input: origin and destination for commuter A and commuter B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePair {
    pub origin_a: Coordinate,
    pub destination_a: Coordinate,
    pub origin_b: Coordinate,
    pub destination_b: Coordinate,
}

impl RoutePair {
    /// Both commuters travel between exactly the same endpoints.
    pub fn is_identical(&self) -> bool {
        self.origin_a == self.origin_b && self.destination_a == self.destination_b
    }
}

/// One batch output row: the input pair plus its overlap result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRecord {
    pub pair: RoutePair,
    pub result: OverlapResult,
}

/// Process a batch of route pairs sequentially.
///
/// Fails fast on invalid configuration; individual fetch failures degrade
/// to zero-valued rows instead of aborting the batch.
pub fn process_route_pairs<F: RouteFetcher>(
    fetcher: &F,
    pairs: &[RoutePair],
    config: &OverlapConfig,
) -> Result<Vec<PairRecord>> {
    config.validate()?;
    info!(
        "[batch] processing {} pair(s) in mode {}",
        pairs.len(),
        config.mode
    );
    pairs
        .iter()
        .map(|pair| process_pair(fetcher, pair, config))
        .collect()
}

/// Process a batch of route pairs in parallel with rayon.
#[cfg(feature = "parallel")]
pub fn process_route_pairs_parallel<F: RouteFetcher + Sync>(
    fetcher: &F,
    pairs: &[RoutePair],
    config: &OverlapConfig,
) -> Result<Vec<PairRecord>> {
    config.validate()?;
    info!(
        "[batch] processing {} pair(s) in parallel, mode {}",
        pairs.len(),
        config.mode
    );
    pairs
        .par_iter()
        .map(|pair| process_pair(fetcher, pair, config))
        .collect()
}

fn process_pair<F: RouteFetcher + ?Sized>(
    fetcher: &F,
    pair: &RoutePair,
    config: &OverlapConfig,
) -> Result<PairRecord> {
    if pair.is_identical() {
        return Ok(identical_pair_record(fetcher, pair));
    }

    let route_a = fetch_or_zero(fetcher, pair.origin_a, pair.destination_a);
    let route_b = fetch_or_zero(fetcher, pair.origin_b, pair.destination_b);
    let result = compute_overlap(&route_a, &route_b, config)?;
    Ok(PairRecord { pair: *pair, result })
}

/// Shortcut for pairs with identical endpoints: one fetch, full overlap,
/// no geometry work.
fn identical_pair_record<F: RouteFetcher + ?Sized>(fetcher: &F, pair: &RoutePair) -> PairRecord {
    debug!(
        "[batch] identical endpoints {},{} -> {},{}, skipping geometry",
        pair.origin_a.latitude,
        pair.origin_a.longitude,
        pair.destination_a.latitude,
        pair.destination_a.longitude
    );

    let route = fetch_or_zero(fetcher, pair.origin_a, pair.destination_a);
    let mut result = OverlapResult::from_totals(&route, &route);
    if !route.is_zero() {
        let overlap_km = RouteMetrics::new(&route).polyline_length_km();
        result.a_overlap_dist = overlap_km;
        result.b_overlap_dist = overlap_km;
        result.a_overlap_time = route.total_time_min;
        result.b_overlap_time = route.total_time_min;
        result.first_common_index_a = Some(0);
        result.last_common_index_a = Some(route.points.len() - 1);
        result.first_common_index_b = Some(0);
        result.last_common_index_b = Some(route.points.len() - 1);
    }
    PairRecord { pair: *pair, result }
}
