use std::collections::BTreeMap;

/// The lowest and highest buckets of a lamp-count distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramExtremes {
    /// `(lamp_count, segments)` with the smallest lamp counts, ascending.
    pub lowest: Vec<(usize, usize)>,
    /// `(lamp_count, segments)` with the largest lamp counts, ascending.
    pub highest: Vec<(usize, usize)>,
    /// Buckets between `lowest` and `highest` that are not shown.
    pub omitted: usize,
}

/// Selects up to `n` buckets from each end of `distribution`, keyed by lamp
/// count rather than by frequency. When everything fits it all goes in `lowest`.
pub fn histogram_extremes(distribution: &BTreeMap<usize, usize>, n: usize) -> HistogramExtremes {
    let buckets: Vec<(usize, usize)> = distribution.iter().map(|(k, v)| (*k, *v)).collect();

    if buckets.len() <= 2 * n {
        return HistogramExtremes {
            lowest: buckets,
            highest: Vec::new(),
            omitted: 0,
        };
    }

    HistogramExtremes {
        lowest: buckets[..n].to_vec(),
        highest: buckets[buckets.len() - n..].to_vec(),
        omitted: buckets.len() - 2 * n,
    }
}
