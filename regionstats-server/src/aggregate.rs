use crate::store::TelemetryStore;
use regionstats_common::{MetricsQuery, RegionMetrics, RegionStatsError, Result};

/// Decimal places kept for `avg_latency` and `p95_latency`.
pub const LATENCY_DECIMALS: usize = 2;

/// Decimal places kept for `avg_uptime`.
pub const UPTIME_DECIMALS: usize = 3;

/// Percentile reported as `p95_latency`.
pub const LATENCY_PERCENTILE: f64 = 0.95;

/// Compute one `RegionMetrics` per requested region, in request order.
///
/// Fails only when `regions` is absent or empty or `threshold_ms` is absent;
/// unknown regions produce an empty aggregate rather than an error.
pub fn aggregate(query: &MetricsQuery, store: &TelemetryStore) -> Result<Vec<RegionMetrics>> {
    let (regions, threshold_ms) = match (query.regions.as_deref(), query.threshold_ms) {
        (Some(regions), Some(threshold_ms)) if !regions.is_empty() => (regions, threshold_ms),
        _ => return Err(RegionStatsError::MissingFields),
    };

    Ok(regions
        .iter()
        .map(|region| region_metrics(store, region, threshold_ms))
        .collect())
}

fn region_metrics(store: &TelemetryStore, region: &str, threshold_ms: f64) -> RegionMetrics {
    let rows = store.records_for_region(region);
    if rows.is_empty() {
        return RegionMetrics::empty(region);
    }

    let latencies: Vec<f64> = rows.iter().map(|r| r.latency_ms).collect();
    let uptimes: Vec<f64> = rows.iter().map(|r| r.uptime_pct).collect();
    let breaches = latencies.iter().filter(|&&l| l > threshold_ms).count() as u64;

    RegionMetrics {
        region: region.to_string(),
        avg_latency: mean(&latencies).map(|v| round_to(v, LATENCY_DECIMALS)),
        p95_latency: percentile(&latencies, LATENCY_PERCENTILE).map(|v| round_to(v, LATENCY_DECIMALS)),
        avg_uptime: mean(&uptimes).map(|v| round_to(v, UPTIME_DECIMALS)),
        breaches,
    }
}

/// Block length below which `pairwise_sum` stops splitting.
const PAIRWISE_BLOCK: usize = 128;

/// Arithmetic mean over a pairwise sum. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(pairwise_sum(values) / values.len() as f64)
}

/// Sum with eight interleaved partial accumulators, splitting slices longer
/// than `PAIRWISE_BLOCK` in halves rounded down to a multiple of eight.
/// Slices shorter than eight are summed left to right.
pub fn pairwise_sum(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 8 {
        return values.iter().fold(0.0, |acc, v| acc + v);
    }
    if n > PAIRWISE_BLOCK {
        let mut half = n / 2;
        half -= half % 8;
        let (left, right) = values.split_at(half);
        return pairwise_sum(left) + pairwise_sum(right);
    }

    let mut r = [0.0_f64; 8];
    r.copy_from_slice(&values[..8]);
    let unrolled = n - n % 8;
    for chunk in values[8..unrolled].chunks_exact(8) {
        for (acc, v) in r.iter_mut().zip(chunk) {
            *acc += v;
        }
    }
    let mut sum = ((r[0] + r[1]) + (r[2] + r[3])) + ((r[4] + r[5]) + (r[6] + r[7]));
    for v in &values[unrolled..] {
        sum += v;
    }
    sum
}

/// Linear-interpolation percentile, `p` in `[0, 1]`. `None` for an empty slice.
///
/// The rank is `p * (n - 1)` over the ascending values. The lerp is evaluated
/// from whichever bracketing value is nearer, so `t >= 0.5` computes
/// `b - (b - a) * (1 - t)` instead of `a + (b - a) * t`.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let t = rank - lo as f64;
    let (a, b) = (sorted[lo], sorted[hi]);
    let diff = b - a;

    Some(if t >= 0.5 { b - diff * (1.0 - t) } else { a + diff * t })
}

/// Round to `decimals` places using the correctly rounded decimal expansion
/// (exact ties go to even).
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}
