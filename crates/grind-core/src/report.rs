//! Flat report table
//!
//! The published view of the store: one row per person, no dedup clock.

use crate::store::AggregateStore;
use serde::Serialize;

/// Column headers of the published table
pub const REPORT_HEADER: [&str; 5] = ["Name", "Highest React", "Mentions", "Posts", "Total"];

/// Row ordering for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportOrder {
    /// `Total` descending, ties by name
    #[default]
    ByTotalDesc,
    /// Store order (snapshot order, new people last)
    Stored,
}

/// One report line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub highest_react: u64,
    pub mentions: u64,
    pub posts: u64,
    pub total: u64,
}

impl ReportRow {
    /// Cells in header order
    #[must_use]
    pub fn cells(&self) -> [String; 5] {
        [
            self.name.clone(),
            self.highest_react.to_string(),
            self.mentions.to_string(),
            self.posts.to_string(),
            self.total.to_string(),
        ]
    }
}

/// Table ready for publication
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReportTable {
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    /// Build table from store
    #[must_use]
    pub fn from_store(store: &AggregateStore, order: ReportOrder) -> Self {
        let entries = match order {
            ReportOrder::ByTotalDesc => store.sorted_by_total(),
            ReportOrder::Stored => store.iter().collect(),
        };
        let rows = entries
            .into_iter()
            .map(|(key, row)| ReportRow {
                name: key.as_str().to_string(),
                highest_react: row.highest_react,
                mentions: row.mentions,
                posts: row.posts,
                total: row.total,
            })
            .collect();
        Self { rows }
    }

    /// Header followed by all rows, as cell strings
    #[must_use]
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        std::iter::once(REPORT_HEADER.iter().map(ToString::to_string).collect::<Vec<_>>())
            .chain(self.rows.iter().map(|r| r.cells().to_vec()))
            .collect()
    }

    /// Aligned plain-text rendering for the console
    #[must_use]
    pub fn to_text(&self) -> String {
        let grid = self.to_grid();
        let mut widths = [0usize; 5];
        for line in &grid {
            for (w, cell) in widths.iter_mut().zip(line) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for line in &grid {
            let mut text = String::new();
            for (i, (cell, w)) in line.iter().zip(widths).enumerate() {
                if i == 0 {
                    text.push_str(&format!("{cell:<w$}"));
                } else {
                    text.push_str(&format!("  {cell:>w$}"));
                }
            }
            out.push_str(text.trim_end());
            out.push('\n');
        }
        out
    }

    /// Number of people in the table
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no people
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CreditDelta;
    use crate::types::{PersonKey, Timestamp};

    fn store() -> AggregateStore {
        let mut store = AggregateStore::new();
        store.credit(PersonKey::new("Zed"), CreditDelta::mention());
        store.credit(
            PersonKey::new("Ada"),
            CreditDelta::post(Timestamp::from_secs(1.0).unwrap()),
        );
        store.credit(PersonKey::new("Ada"), CreditDelta::mention());
        store
    }

    #[test]
    fn sorted_by_total() {
        let table = ReportTable::from_store(&store(), ReportOrder::ByTotalDesc);
        let names: Vec<_> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Zed"]);
        assert_eq!(table.rows[0].total, 2);
    }

    #[test]
    fn stored_order() {
        let table = ReportTable::from_store(&store(), ReportOrder::Stored);
        let names: Vec<_> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Ada"]);
    }

    #[test]
    fn grid_has_header() {
        let grid = ReportTable::from_store(&store(), ReportOrder::ByTotalDesc).to_grid();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], REPORT_HEADER.map(String::from).to_vec());
        assert_eq!(grid[1], vec!["Ada", "0", "1", "1", "2"]);
    }

    #[test]
    fn text_is_aligned() {
        let text = ReportTable::from_store(&store(), ReportOrder::ByTotalDesc).to_text();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[0].ends_with("Total"));
        assert!(lines[1].starts_with("Ada "));
        assert!(lines[1].ends_with('2'));
        assert_eq!(lines[1].len(), lines[0].len());
    }

    #[test]
    fn empty_store_gives_header_only() {
        let table = ReportTable::from_store(&AggregateStore::new(), ReportOrder::default());
        assert!(table.is_empty());
        assert_eq!(table.to_grid().len(), 1);
    }
}
