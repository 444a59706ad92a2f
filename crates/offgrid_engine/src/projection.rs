//! Filtered/sorted/grouped views for presentation.
//!
//! Pure functions over record snapshots; stateless with respect to the
//! engine.

use offgrid_model::{Record, RecordStatus};

/// Sort key for projected views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Order by `last_modified`.
    #[default]
    LastModified,
    /// Order by `title`.
    Title,
}

/// Sort direction for projected views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Filter and ordering for a projected view.
#[derive(Debug, Clone, Default)]
pub struct ProjectionFilter {
    /// Case-insensitive substring matched against title and content.
    pub search_text: Option<String>,
    /// Exact category tag match.
    pub category: Option<String>,
    /// Restrict to records with a local copy (the offline view):
    /// `Materialized` and `Conflicted`.
    pub only_materialized: bool,
    /// Sort key.
    pub sort_key: SortKey,
    /// Sort direction.
    pub sort_dir: SortDir,
}

impl ProjectionFilter {
    /// A filter that passes everything, sorted by `last_modified`
    /// ascending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search text.
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Sets the category filter.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restricts the view to records with a local copy.
    #[must_use]
    pub fn only_materialized(mut self) -> Self {
        self.only_materialized = true;
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub fn sorted(mut self, key: SortKey, dir: SortDir) -> Self {
        self.sort_key = key;
        self.sort_dir = dir;
        self
    }

    fn matches(&self, record: &Record) -> bool {
        if self.only_materialized && !record.status.has_local_copy() {
            return false;
        }
        if let Some(category) = &self.category {
            if record.category != *category {
                return false;
            }
        }
        if let Some(needle) = &self.search_text {
            let needle = needle.to_lowercase();
            if !needle.is_empty()
                && !record.title.to_lowercase().contains(&needle)
                && !record.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Projects a record snapshot into an ordered, filtered view.
///
/// The ordering is total: ties under the sort key are broken by `id`
/// ascending, regardless of direction, so equal-keyed records appear in
/// a stable, documented order.
#[must_use]
pub fn project(records: &[Record], filter: &ProjectionFilter) -> Vec<Record> {
    let mut view: Vec<Record> = records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();

    view.sort_by(|a, b| {
        let key_order = match filter.sort_key {
            SortKey::LastModified => a.last_modified.cmp(&b.last_modified),
            SortKey::Title => a.title.cmp(&b.title),
        };
        let directed = match filter.sort_dir {
            SortDir::Asc => key_order,
            SortDir::Desc => key_order.reverse(),
        };
        // Tie-break outside the direction so it stays ascending.
        directed.then_with(|| a.id.cmp(&b.id))
    });
    view
}

/// Per-status record counts, for the presentation layer's status
/// tracking panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Records without a local copy.
    pub remote_only: usize,
    /// Records currently transferring.
    pub transferring: usize,
    /// Records fully materialized.
    pub materialized: usize,
    /// Records in conflict.
    pub conflicted: usize,
}

/// Counts records per status.
#[must_use]
pub fn count_by_status(records: &[Record]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for record in records {
        match record.status {
            RecordStatus::RemoteOnly => counts.remote_only += 1,
            RecordStatus::Transferring => counts.transferring += 1,
            RecordStatus::Materialized => counts.materialized += 1,
            RecordStatus::Conflicted => counts.conflicted += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: &str, category: &str, last_modified: u64) -> Record {
        Record::new(id, title, category, format!("content of {title}"), "2024-05-10", last_modified)
    }

    fn materialized(id: &str, title: &str, category: &str, last_modified: u64) -> Record {
        let mut r = record(id, title, category, last_modified);
        r.transition(RecordStatus::Transferring).unwrap();
        r.transition(RecordStatus::Materialized).unwrap();
        r
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_content() {
        let records = vec![
            record("A", "Network Config Pack", "WIFI", 1),
            record("B", "Field Guide", "MANUAL", 2),
        ];

        let by_title = project(&records, &ProjectionFilter::new().with_search("NETWORK"));
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "A");

        let by_content = project(&records, &ProjectionFilter::new().with_search("of field"));
        assert_eq!(by_content.len(), 1);
        assert_eq!(by_content[0].id, "B");
    }

    #[test]
    fn category_filter_is_exact() {
        let records = vec![
            record("A", "a", "WIFI", 1),
            record("B", "b", "SYSTEM", 2),
        ];
        let view = project(&records, &ProjectionFilter::new().with_category("WIFI"));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "A");
    }

    #[test]
    fn offline_view_includes_conflicted() {
        let mut conflicted = materialized("C", "c", "SYSTEM", 3);
        conflicted.transition(RecordStatus::Conflicted).unwrap();

        let records = vec![
            record("A", "a", "WIFI", 1),
            materialized("B", "b", "SYSTEM", 2),
            conflicted,
        ];
        let view = project(&records, &ProjectionFilter::new().only_materialized());
        let ids: Vec<&str> = view.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["B", "C"]);
    }

    #[test]
    fn sort_by_last_modified_desc() {
        let records = vec![
            record("A", "a", "WIFI", 10),
            record("B", "b", "WIFI", 30),
            record("C", "c", "WIFI", 20),
        ];
        let view = project(
            &records,
            &ProjectionFilter::new().sorted(SortKey::LastModified, SortDir::Desc),
        );
        let ids: Vec<&str> = view.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["B", "C", "A"]);
    }

    #[test]
    fn ties_break_by_id_ascending_in_both_directions() {
        let records = vec![
            record("B", "same", "WIFI", 5),
            record("A", "same", "WIFI", 5),
            record("C", "same", "WIFI", 5),
        ];

        let asc = project(
            &records,
            &ProjectionFilter::new().sorted(SortKey::Title, SortDir::Asc),
        );
        let desc = project(
            &records,
            &ProjectionFilter::new().sorted(SortKey::Title, SortDir::Desc),
        );

        let asc_ids: Vec<&str> = asc.iter().map(|r| r.id.as_str()).collect();
        let desc_ids: Vec<&str> = desc.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(asc_ids, ["A", "B", "C"]);
        assert_eq!(desc_ids, ["A", "B", "C"]);
    }

    #[test]
    fn status_counts() {
        let mut transferring = record("T", "t", "WIFI", 1);
        transferring.transition(RecordStatus::Transferring).unwrap();

        let records = vec![
            record("A", "a", "WIFI", 1),
            transferring,
            materialized("M", "m", "WIFI", 2),
        ];
        let counts = count_by_status(&records);
        assert_eq!(
            counts,
            StatusCounts {
                remote_only: 1,
                transferring: 1,
                materialized: 1,
                conflicted: 0,
            }
        );
    }

    #[test]
    fn projection_does_not_mutate_input() {
        let records = vec![record("A", "a", "WIFI", 1)];
        let before = records.clone();
        let _ = project(&records, &ProjectionFilter::new().with_search("zzz"));
        assert_eq!(records, before);
    }
}
