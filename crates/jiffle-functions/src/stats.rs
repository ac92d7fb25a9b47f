//! List statistics.
//!
//! NaN elements are skipped by every statistic except `length`; an empty
//! list (after skipping) yields NaN, except `sum` (0) and `length` (0).

fn valid(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = valid(values);
    v.sort_by(f64::total_cmp);
    v
}

pub(crate) fn max(values: &[f64]) -> f64 {
    sorted(values).last().copied().unwrap_or(f64::NAN)
}

pub(crate) fn min(values: &[f64]) -> f64 {
    sorted(values).first().copied().unwrap_or(f64::NAN)
}

pub(crate) fn sum(values: &[f64]) -> f64 {
    valid(values).iter().sum()
}

pub(crate) fn length(values: &[f64]) -> f64 {
    values.len() as f64
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    let v = valid(values);
    if v.is_empty() {
        return f64::NAN;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

pub(crate) fn median(values: &[f64]) -> f64 {
    let v = sorted(values);
    let n = v.len();
    match n {
        0 => f64::NAN,
        _ if n % 2 == 1 => v[n / 2],
        _ => (v[n / 2 - 1] + v[n / 2]) / 2.0,
    }
}

/// Most frequent value; ties go to the smallest.
pub(crate) fn mode(values: &[f64]) -> f64 {
    let v = sorted(values);
    let mut best = f64::NAN;
    let mut best_count = 0;
    let mut i = 0;
    while i < v.len() {
        let mut j = i;
        while j < v.len() && v[j] == v[i] {
            j += 1;
        }
        if j - i > best_count {
            best_count = j - i;
            best = v[i];
        }
        i = j;
    }
    best
}

pub(crate) fn range(values: &[f64]) -> f64 {
    let v = sorted(values);
    match (v.first(), v.last()) {
        (Some(lo), Some(hi)) => hi - lo,
        _ => f64::NAN,
    }
}

/// Sample variance (n - 1 denominator).
pub(crate) fn variance(values: &[f64]) -> f64 {
    let v = valid(values);
    let n = v.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = v.iter().sum::<f64>() / n as f64;
    v.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (n - 1) as f64
}

pub(crate) fn sdev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}
