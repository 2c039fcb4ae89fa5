//! Frequency tables accumulated over one pass of the flow log.

use indexmap::IndexMap;

use crate::{enrichment::LookupTable, flow::FlowKey};

/// Tag assigned to records whose (port, protocol) has no lookup entry.
pub const UNTAGGED: &str = "Untagged";

/// Both report tables, in first-seen order. Owned by the run function and
/// consumed once by the report writer; nothing survives the process.
#[derive(Debug)]
pub struct Aggregate {
    tag_counts: IndexMap<String, u64>,
    pair_counts: IndexMap<FlowKey, u64>,
    records: u64,
}

impl Aggregate {
    /// The untagged sentinel is registered up front so it shows in the
    /// report even when every record matches.
    pub fn new() -> Self {
        let mut tag_counts = IndexMap::new();
        tag_counts.insert(UNTAGGED.to_string(), 0);

        Self {
            tag_counts,
            pair_counts: IndexMap::new(),
            records: 0,
        }
    }

    /// Folds one normalized record into both tables.
    pub fn record(&mut self, key: FlowKey, table: &LookupTable) {
        let tag = table.find(&key).unwrap_or(UNTAGGED);
        *self.tag_counts.entry(tag.to_string()).or_insert(0) += 1;
        *self.pair_counts.entry(key).or_insert(0) += 1;
        self.records += 1;
    }

    /// Tags in first-seen order, sentinel first.
    pub fn tag_counts(&self) -> impl Iterator<Item = (&str, u64)> {
        self.tag_counts
            .iter()
            .map(|(tag, count)| (tag.as_str(), *count))
    }

    /// Unique (port, protocol) pairs in first-seen order.
    pub fn pair_counts(&self) -> impl Iterator<Item = (&FlowKey, u64)> {
        self.pair_counts.iter().map(|(key, count)| (key, *count))
    }

    /// Total records folded in so far.
    pub const fn records(&self) -> u64 {
        self.records
    }
}

impl Default for Aggregate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn table(rows: &[(u16, &str, &str)]) -> LookupTable {
        let entries: HashMap<FlowKey, String> = rows
            .iter()
            .map(|(port, protocol, tag)| (FlowKey::new(*port, protocol), tag.to_string()))
            .collect();
        LookupTable::new(entries)
    }

    fn scenario_table() -> LookupTable {
        table(&[
            (25, "tcp", "sv_P1"),
            (68, "udp", "sv_P2"),
            (23, "tcp", "sv_P1"),
            (31, "udp", "SV_P3"),
        ])
    }

    #[test]
    fn sentinel_is_seeded_at_zero() {
        let agg = Aggregate::new();

        assert_eq!(agg.tag_counts().collect::<Vec<_>>(), vec![(UNTAGGED, 0)]);
        assert_eq!(agg.records(), 0);
    }

    #[test]
    fn matched_records_count_under_their_tag() {
        let table = scenario_table();
        let mut agg = Aggregate::new();

        agg.record(FlowKey::new(25, "tcp"), &table);
        agg.record(FlowKey::new(25, "tcp"), &table);
        agg.record(FlowKey::new(23, "tcp"), &table);

        let tags: Vec<_> = agg.tag_counts().collect();
        assert_eq!(tags, vec![(UNTAGGED, 0), ("sv_P1", 3)]);
    }

    #[test]
    fn unmatched_records_count_as_untagged() {
        let table = scenario_table();
        let mut agg = Aggregate::new();

        agg.record(FlowKey::new(99, "tcp"), &table);

        let tags: Vec<_> = agg.tag_counts().collect();
        assert_eq!(tags, vec![(UNTAGGED, 1)]);
    }

    #[test]
    fn scenario_tallies() {
        let table = scenario_table();
        let mut agg = Aggregate::new();

        for key in [
            FlowKey::new(25, "tcp"),
            FlowKey::new(25, "tcp"),
            FlowKey::new(68, "udp"),
            FlowKey::new(68, "udp"),
            FlowKey::new(68, "udp"),
            FlowKey::new(23, "tcp"),
            FlowKey::new(99, "tcp"),
        ] {
            agg.record(key, &table);
        }

        let tags: Vec<_> = agg.tag_counts().collect();
        assert_eq!(tags, vec![(UNTAGGED, 1), ("sv_P1", 3), ("sv_P2", 3)]);

        let pairs: Vec<_> = agg
            .pair_counts()
            .map(|(key, count)| (key.port, key.protocol.as_str(), count))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (25, "tcp", 2),
                (68, "udp", 3),
                (23, "tcp", 1),
                (99, "tcp", 1),
            ]
        );
    }

    #[test]
    fn both_tables_sum_to_the_record_count() {
        let table = scenario_table();
        let mut agg = Aggregate::new();

        for key in [
            FlowKey::new(25, "tcp"),
            FlowKey::new(99, "tcp"),
            FlowKey::new(68, "udp"),
            FlowKey::new(443, "tcp"),
        ] {
            agg.record(key, &table);
        }

        let tag_total: u64 = agg.tag_counts().map(|(_, count)| count).sum();
        let pair_total: u64 = agg.pair_counts().map(|(_, count)| count).sum();
        assert_eq!(tag_total, agg.records());
        assert_eq!(pair_total, agg.records());
        assert_eq!(agg.records(), 4);
    }

    #[test]
    fn tags_keep_first_seen_order() {
        let table = scenario_table();
        let mut agg = Aggregate::new();

        agg.record(FlowKey::new(68, "udp"), &table);
        agg.record(FlowKey::new(25, "tcp"), &table);
        agg.record(FlowKey::new(68, "udp"), &table);

        let order: Vec<_> = agg.tag_counts().map(|(tag, _)| tag).collect();
        assert_eq!(order, vec![UNTAGGED, "sv_P2", "sv_P1"]);
    }
}
