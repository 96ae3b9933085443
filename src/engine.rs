use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Duration, NaiveDateTime};
use tracing::info;

use crate::dates;
use crate::error::IngestError;
use crate::ingest::{AvailabilityRecord, BaselineRecord};
use crate::report::DomainResult;

/// Baseline membership, keyed by domain.
pub type BaselineSets = HashMap<String, HashSet<String>>;

/// Latest resolved timestamp per `(agent_name, domain)` key.
pub type AvailabilityIndex = HashMap<(String, String), NaiveDateTime>;

/// How far back from the reference instant an agent may have last reported
/// and still count as available. The lower bound is inclusive.
pub fn freshness_window() -> Duration {
    Duration::hours(24)
}

/// Group baseline records into per-domain agent sets.
///
/// Duplicate `(domain, agent)` pairs collapse harmlessly.
pub fn build_baseline_sets(records: &[BaselineRecord]) -> BaselineSets {
    let mut sets = BaselineSets::new();
    for record in records {
        sets.entry(record.domain.clone())
            .or_default()
            .insert(record.agent_name.clone());
    }
    sets
}

/// Resolve raw feed rows into the deduplicated latest-timestamp index.
///
/// A single unparseable date aborts the whole batch; rows are never skipped.
/// When multiple rows share a key, only the maximum timestamp is kept.
pub fn build_availability_index(
    records: &[AvailabilityRecord],
) -> Result<AvailabilityIndex, IngestError> {
    let mut index = AvailabilityIndex::new();

    for record in records {
        let timestamp = dates::parse_available_date(&record.timestamp_raw)?;
        let key = (record.agent_name.clone(), record.domain.clone());
        match index.get(&key) {
            Some(existing) if *existing >= timestamp => {}
            _ => {
                index.insert(key, timestamp);
            }
        }
    }

    Ok(index)
}

/// Classify every baseline agent as available or not, per domain.
///
/// An agent is available iff it appears in the index with a timestamp at or
/// after `now - 24h`. Agents absent from the index get no `last_seen` entry;
/// stale agents keep theirs. `now` is an explicit input so the boundary is
/// testable; the wall clock is read only at the caller.
pub fn classify(
    baseline: &BaselineSets,
    index: &AvailabilityIndex,
    now: NaiveDateTime,
) -> BTreeMap<String, DomainResult> {
    let cutoff = now - freshness_window();
    let mut results = BTreeMap::new();

    for (domain, agents) in baseline {
        let mut result = DomainResult::new(agents.len());

        for agent in agents {
            let key = (agent.clone(), domain.clone());
            match index.get(&key) {
                None => {
                    result.not_available.insert(agent.clone());
                }
                Some(&timestamp) => {
                    if timestamp >= cutoff {
                        result.available.insert(agent.clone());
                    } else {
                        result.not_available.insert(agent.clone());
                    }
                    result.last_seen.insert(agent.clone(), timestamp);
                }
            }
        }

        results.insert(domain.clone(), result);
    }

    info!(
        action = "classify",
        component = "availability_engine",
        domain_count = results.len(),
        "Classification complete"
    );
    results
}
