use super::model::{Dataset, MatchResult, Query, Row};

/// Plain Euclidean distance in the (density, temperature) plane, raw units.
pub fn distance(row: &Row, query: &Query) -> f64 {
    let dd = row.measured_density - query.measured_density();
    let dt = row.observed_temperature - query.observed_temperature();
    dd.hypot(dt)
}

/// Find the row nearest to `query`.
///
/// Returns `None` when there is no dataset or it has no rows. When several
/// rows share the minimum distance the first one in dataset order wins.
pub fn find_nearest(dataset: Option<&Dataset>, query: &Query) -> Option<MatchResult> {
    let dataset = dataset?;

    let mut best: Option<MatchResult> = None;
    for (row_index, row) in dataset.rows().iter().enumerate() {
        let d = distance(row, query);
        // Strict `<` keeps the earliest row on ties.
        let better = match &best {
            None => !d.is_nan(),
            Some(b) => d < b.distance,
        };
        if better {
            best = Some(MatchResult {
                row_index,
                corresponding_density: row.corresponding_density,
                distance: d,
            });
        }
    }
    best
}

impl Dataset {
    /// Convenience wrapper around [`find_nearest`].
    pub fn nearest(&self, query: &Query) -> Option<MatchResult> {
        find_nearest(Some(self), query)
    }
}
