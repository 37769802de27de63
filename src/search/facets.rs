// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Facet aggregation: raw per-document tags → ranked, capped counts.
//!
//! Groups come out in first-seen order. Within a group, values are ranked by
//! count descending; `sort_by` is stable, so equal counts keep the order in
//! which the values were first encountered.

use super::types::{FacetHit, FacetRow, SearchFacet};

/// Facet aggregator with a per-facet cap
#[derive(Debug, Clone, Copy)]
pub struct FacetAggregator {
    limit: usize,
}

impl Default for FacetAggregator {
    fn default() -> Self {
        Self::new(9)
    }
}

impl FacetAggregator {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Aggregate `(facet_type, facet_value, count)` rows.
    ///
    /// Repeated `(type, value)` pairs are summed into the first occurrence.
    pub fn aggregate_rows(&self, rows: &[FacetRow]) -> Vec<SearchFacet> {
        let mut groups: Vec<(String, Vec<FacetHit>)> = Vec::new();

        for row in rows {
            let idx = match groups.iter().position(|(name, _)| *name == row.facet_type) {
                Some(idx) => idx,
                None => {
                    groups.push((row.facet_type.clone(), Vec::new()));
                    groups.len() - 1
                }
            };
            let hits = &mut groups[idx].1;
            match hits.iter_mut().find(|h| h.ep == row.facet_value) {
                Some(existing) => existing.hits += row.count,
                None => hits.push(FacetHit {
                    ep: row.facet_value.clone(),
                    hits: row.count,
                }),
            }
        }

        groups
            .into_iter()
            .map(|(name, hits)| self.rank(name, hits))
            .collect()
    }

    /// Aggregate the nested `{facet: {value: count}}` form.
    pub fn aggregate_distribution(&self, distribution: &[(String, Vec<(String, u64)>)]) -> Vec<SearchFacet> {
        let rows: Vec<FacetRow> = distribution
            .iter()
            .flat_map(|(facet, values)| {
                values
                    .iter()
                    .map(move |(value, count)| FacetRow::new(facet.clone(), value.clone(), *count))
            })
            .collect();
        self.aggregate_rows(&rows)
    }

    fn rank(&self, facet_name: String, mut hits: Vec<FacetHit>) -> SearchFacet {
        hits.sort_by(|a, b| b.hits.cmp(&a.hits));
        hits.truncate(self.limit);
        SearchFacet {
            facet_name,
            facet_hits: hits,
        }
    }
}
