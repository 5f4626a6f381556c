//! Derived response-time metrics over a request's change history.
//!
//! The summary stored next to each request log is a pure function of the
//! full change sequence and is recomputed from scratch on every append.
//! Recomputation keeps the figure self-healing: if attribution rules ever
//! change, the next append rewrites history's verdict wholesale instead of
//! compounding on a stale rollup.

use serde::{Deserialize, Serialize};

use crate::changes::{RequestChange, STATUS_FIELD};
use crate::tenant::TenantType;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Average response time for one side of a request. `ms` is the raw mean of
/// the attributed deltas; `hours` is that mean rounded to two decimals.
/// Both are zero when the side has no samples yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideAverage {
    pub ms: f64,
    pub hours: f64,
}

/// Per-side averages as stored on the log and served to dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeSummary {
    pub provider: SideAverage,
    pub proxy: SideAverage,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn side_average(sum_ms: i64, count: u32) -> SideAverage {
    if count == 0 {
        return SideAverage::default();
    }
    let ms = sum_ms as f64 / f64::from(count);
    SideAverage {
        ms,
        hours: round2(ms / MS_PER_HOUR),
    }
}

/// Compute both sides' averages from a change sequence.
///
/// Only `status` entries count. Each consecutive pair of status entries
/// yields one delta, attributed to the bucket named by the later entry's
/// actor role; management actors advance the pairing without feeding either
/// bucket. The input order is the stored log order, so timestamps are
/// non-decreasing and deltas non-negative.
pub fn average_response_time(changes: &[RequestChange]) -> ResponseTimeSummary {
    let mut provider_sum = 0_i64;
    let mut provider_count = 0_u32;
    let mut proxy_sum = 0_i64;
    let mut proxy_count = 0_u32;

    let mut previous: Option<&RequestChange> = None;
    for change in changes.iter().filter(|c| c.field == STATUS_FIELD) {
        if let Some(prev) = previous {
            let delta = change.updated_at - prev.updated_at;
            match change.changed_by.tenant_type {
                TenantType::Provider => {
                    provider_sum += delta;
                    provider_count += 1;
                }
                TenantType::Proxy => {
                    proxy_sum += delta;
                    proxy_count += 1;
                }
                TenantType::Management => {}
            }
        }
        previous = Some(change);
    }

    ResponseTimeSummary {
        provider: side_average(provider_sum, provider_count),
        proxy: side_average(proxy_sum, proxy_count),
    }
}
