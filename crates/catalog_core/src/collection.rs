use std::collections::BTreeMap;

use serde::Serialize;

use crate::NormalizedRecord;

/// Heading for records that carry no categories.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Ordered records of one run, in fetch order (page order, then within-page order).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CatalogCollection {
    records: Vec<NormalizedRecord>,
}

/// Records listed under one heading of the categorized view.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub heading: &'a str,
    pub records: Vec<&'a NormalizedRecord>,
}

impl CatalogCollection {
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<NormalizedRecord> {
        self.records
    }

    /// All records sorted by title. The sort is stable, so equal titles keep
    /// fetch order.
    pub fn sorted_by_title(&self) -> Vec<&NormalizedRecord> {
        let mut sorted: Vec<_> = self.records.iter().collect();
        sort_by_title(&mut sorted);
        sorted
    }

    /// Groups records under each of their categories.
    ///
    /// A record with N categories appears in N groups. Headings are sorted
    /// lexicographically, records within a group by title, and records without
    /// categories form a trailing [`UNCATEGORIZED`] group (omitted when empty).
    pub fn by_category(&self) -> Vec<CategoryGroup<'_>> {
        let mut grouped: BTreeMap<&str, Vec<&NormalizedRecord>> = BTreeMap::new();
        let mut uncategorized = Vec::new();

        for record in &self.records {
            if record.categories.is_empty() {
                uncategorized.push(record);
                continue;
            }
            for category in &record.categories {
                grouped.entry(category.as_str()).or_default().push(record);
            }
        }

        let mut groups: Vec<CategoryGroup<'_>> = grouped
            .into_iter()
            .map(|(heading, mut records)| {
                sort_by_title(&mut records);
                CategoryGroup { heading, records }
            })
            .collect();

        if !uncategorized.is_empty() {
            sort_by_title(&mut uncategorized);
            groups.push(CategoryGroup {
                heading: UNCATEGORIZED,
                records: uncategorized,
            });
        }
        groups
    }
}

impl From<Vec<NormalizedRecord>> for CatalogCollection {
    fn from(records: Vec<NormalizedRecord>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a CatalogCollection {
    type Item = &'a NormalizedRecord;
    type IntoIter = std::slice::Iter<'a, NormalizedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn sort_by_title(records: &mut [&NormalizedRecord]) {
    records.sort_by(|a, b| a.title.cmp(&b.title));
}
