//! Streetlight fixture counts per street segment.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Number of fixtures referencing each segment identifier.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LampCountIndex {
    counts: HashMap<String, usize>,
    rows_read: usize,
    rows_skipped: usize,
}

impl LampCountIndex {
    /// Counts fixtures from CSV data with a header row.
    ///
    /// Rows whose `id_column` is empty or missing are skipped. Every other row
    /// counts as one fixture, duplicates included.
    pub fn from_reader<R: Read>(reader: R, id_column: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
        let column = rdr
            .headers()
            .context("failed to read streetlight CSV header")?
            .iter()
            .position(|h| h == id_column);

        if column.is_none() {
            warn!(column = id_column, "Segment id column not found, no lamps will be counted");
        }

        let mut index = Self::default();
        let mut record = StringRecord::new();
        while rdr.read_record(&mut record)? {
            index.rows_read += 1;
            match column.and_then(|c| record.get(c)).filter(|id| !id.is_empty()) {
                Some(id) => index.add(id),
                None => index.rows_skipped += 1,
            }
        }

        debug!(
            rows = index.rows_read,
            skipped = index.rows_skipped,
            segments = index.len(),
            "Streetlight CSV scanned"
        );
        Ok(index)
    }

    #[tracing::instrument(skip_all, fields(path = %path.display(), column = id_column))]
    pub fn from_path(path: &Path, id_column: &str) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let index = Self::from_reader(file, id_column)
            .with_context(|| format!("failed to read {}", path.display()))?;
        info!(
            lamps = index.total(),
            segments = index.len(),
            skipped = index.rows_skipped,
            "Counted lamps"
        );
        Ok(index)
    }

    fn add(&mut self, segment_id: &str) {
        match self.counts.get_mut(segment_id) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(segment_id.to_string(), 1);
            }
        }
    }

    /// Fixtures on `segment_id`, 0 when none reference it.
    pub fn count(&self, segment_id: &str) -> usize {
        self.counts.get(segment_id).copied().unwrap_or(0)
    }

    /// Number of distinct segments with at least one fixture.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total fixtures counted.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn rows_skipped(&self) -> usize {
        self.rows_skipped
    }

    pub fn segment_ids(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Maps each lamp count to how many segments have exactly that many lamps.
    pub fn distribution(&self) -> BTreeMap<usize, usize> {
        let mut dist = BTreeMap::new();
        for count in self.counts.values() {
            *dist.entry(*count).or_insert(0) += 1;
        }
        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "OBJECTID,STREETSEGMID,TYPE\n\
                       1,A1,LED\n\
                       2,A1,LED\n\
                       3,B2,HPS\n\
                       4,,LED\n";

    #[test]
    fn test_counts_skip_empty_ids() {
        let index = LampCountIndex::from_reader(CSV.as_bytes(), "STREETSEGMID").unwrap();

        assert_eq!(index.count("A1"), 2);
        assert_eq!(index.count("B2"), 1);
        assert_eq!(index.count("C3"), 0);
        assert_eq!(index.len(), 2);
        assert_eq!(index.total(), 3);
        assert_eq!(index.rows_read(), 4);
        assert_eq!(index.rows_skipped(), 1);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let first = LampCountIndex::from_reader(CSV.as_bytes(), "STREETSEGMID").unwrap();
        let second = LampCountIndex::from_reader(CSV.as_bytes(), "STREETSEGMID").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_column_counts_nothing() {
        let index = LampCountIndex::from_reader(CSV.as_bytes(), "SEGID").unwrap();
        assert!(index.is_empty());
        assert_eq!(index.rows_skipped(), 4);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let csv = "OBJECTID,TYPE,STREETSEGMID\n1,LED,Z9\n2,LED\n";
        let index = LampCountIndex::from_reader(csv.as_bytes(), "STREETSEGMID").unwrap();
        assert_eq!(index.count("Z9"), 1);
        assert_eq!(index.rows_skipped(), 1);
    }

    #[test]
    fn test_distribution() {
        let csv = "STREETSEGMID\nA\nA\nA\nB\nC\nD\nD\n";
        let index = LampCountIndex::from_reader(csv.as_bytes(), "STREETSEGMID").unwrap();
        let dist = index.distribution();

        assert_eq!(dist.get(&1), Some(&2));
        assert_eq!(dist.get(&2), Some(&1));
        assert_eq!(dist.get(&3), Some(&1));
        assert_eq!(dist.values().sum::<usize>(), index.len());
    }
}
