//! Cross-border classification via the endpoint country join.

use hashbrown::HashMap;
use tracing::debug;

use crate::models::{GridNode, Pipeline};

/// A pipeline with both endpoint country codes resolved.
#[derive(Debug, Clone)]
pub struct JoinedPipeline<'a> {
    pub pipeline: &'a Pipeline,
    pub country_start: &'a str,
    pub country_end: &'a str,
}

impl JoinedPipeline<'_> {
    /// True when the endpoint country codes differ. Self-loops share a
    /// node and therefore a country, so they are never cross-border.
    pub fn is_crossborder(&self) -> bool {
        self.country_start != self.country_end
    }
}

/// Result of resolving pipeline endpoints against the node table.
#[derive(Debug)]
pub struct CrossBorderReport<'a> {
    /// Pipelines whose both endpoints resolved to a node
    pub joined: Vec<JoinedPipeline<'a>>,
    /// Pipelines dropped because an endpoint was missing from the table
    pub unmatched: usize,
}

impl<'a> CrossBorderReport<'a> {
    /// Cross-border pipelines among the joined set.
    pub fn crossborder(&self) -> impl Iterator<Item = &JoinedPipeline<'a>> {
        self.joined.iter().filter(|j| j.is_crossborder())
    }

    pub fn crossborder_count(&self) -> usize {
        self.crossborder().count()
    }

    /// Percentage of joined pipelines that cross a border, in [0, 100].
    pub fn share(&self) -> f64 {
        if self.joined.is_empty() {
            return 0.0;
        }
        self.crossborder_count() as f64 / self.joined.len() as f64 * 100.0
    }
}

/// Resolve both endpoints of every pipeline against the node table.
///
/// A pipeline joins only when bus0 AND bus1 resolve (an inner join);
/// anything else is counted in `unmatched` and excluded from the share
/// denominator.
pub fn join_countries<'a>(
    pipelines: &'a [Pipeline],
    nodes: &'a [GridNode],
) -> CrossBorderReport<'a> {
    let countries: HashMap<&str, &str> = nodes
        .iter()
        .map(|n| (n.id.as_str(), n.country_code.as_str()))
        .collect();

    let mut joined = Vec::with_capacity(pipelines.len());
    let mut unmatched = 0usize;

    for pipeline in pipelines {
        match (
            countries.get(pipeline.bus0.as_str()),
            countries.get(pipeline.bus1.as_str()),
        ) {
            (Some(start), Some(end)) => joined.push(JoinedPipeline {
                pipeline,
                country_start: start,
                country_end: end,
            }),
            _ => {
                debug!(
                    "Pipeline {} has an unresolved endpoint ({} -> {})",
                    pipeline.id, pipeline.bus0, pipeline.bus1
                );
                unmatched += 1;
            }
        }
    }

    CrossBorderReport { joined, unmatched }
}
