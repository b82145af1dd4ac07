//! Generic entity list: column spec, filtering and pagination shared by
//! every collection the CLI can list.

use console::{Alignment, measure_text_width, pad_str};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::{ApiClient, Resource};
use crate::cache::{QueryCache, QueryKey};
use crate::errors::ApiError;

/// Widest a rendered cell may get before it is truncated.
const MAX_CELL_WIDTH: usize = 40;

/// One table column: a header and how to render a record's cell.
pub struct Column<T> {
    pub header: &'static str,
    pub value: fn(&T) -> String,
}

impl<T> Column<T> {
    pub fn new(header: &'static str, value: fn(&T) -> String) -> Self {
        Self { header, value }
    }
}

/// A record type that can be shown in an [`EntityList`].
pub trait Tabular: Sized {
    fn columns() -> Vec<Column<Self>>;

    /// Machine-readable status matched by the `--status` filter.
    fn status(&self) -> Option<String> {
        None
    }
}

/// Free-text search and status filter plus the requested page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            page: 1,
            page_size: 10,
        }
    }
}

/// One page of results. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// `ceil(total / page_size)`, with a page size of 0 treated as 1.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Slice `items` into 1-based page `page`. Out-of-range pages are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = page_count(total_items, page_size);
    let slice = if page == 0 || page > total_pages {
        &[][..]
    } else {
        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total_items);
        &items[start..end]
    };
    Page {
        items: slice.to_vec(),
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// A list of records with its column spec and an optional extra predicate.
pub struct EntityList<T> {
    records: Vec<T>,
    columns: Vec<Column<T>>,
    predicate: Option<Box<dyn Fn(&T) -> bool + Send + Sync>>,
}

impl<T: Tabular + Clone> EntityList<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            columns: T::columns(),
            predicate: None,
        }
    }

    /// Add a custom filter on top of search and status.
    pub fn filter_by<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    fn matches(&self, record: &T, query: &ListQuery) -> bool {
        if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
            match record.status() {
                Some(s) if s.eq_ignore_ascii_case(status) => {}
                _ => return false,
            }
        }
        if let Some(needle) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let needle = needle.to_lowercase();
            let hit = self
                .columns
                .iter()
                .any(|c| (c.value)(record).to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        self.predicate.as_ref().is_none_or(|p| p(record))
    }

    /// Records passing search, status and the custom predicate, in order.
    pub fn filtered(&self, query: &ListQuery) -> Vec<T> {
        self.records
            .iter()
            .filter(|r| self.matches(r, query))
            .cloned()
            .collect()
    }

    pub fn page(&self, query: &ListQuery) -> Page<T> {
        paginate(&self.filtered(query), query.page, query.page_size)
    }

    /// Render `page` as a fixed-width text table.
    pub fn render_table(&self, page: &Page<T>) -> String {
        let cells: Vec<Vec<String>> = page
            .items
            .iter()
            .map(|r| {
                self.columns
                    .iter()
                    .map(|c| truncate_cell(&(c.value)(r)))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|row| measure_text_width(&row[i]))
                    .chain(std::iter::once(measure_text_width(c.header)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| pad_str(c.header, *w, Alignment::Left, None).into_owned())
            .collect();
        out.push_str(header.join("  ").trim_end());
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| pad_str(cell, *w, Alignment::Left, None).into_owned())
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out.push_str(&format!(
            "Sayfa {}/{} ({} kayıt)\n",
            page.page,
            page.total_pages.max(1),
            page.total_items
        ));
        out
    }
}

impl<T> EntityList<T>
where
    T: Tabular + Clone + DeserializeOwned + Send + Sync + 'static,
{
    /// Fetch `resource` through the cache and wrap it in a list.
    pub async fn load(
        client: &ApiClient,
        cache: &QueryCache,
        resource: Resource,
    ) -> Result<Self, ApiError> {
        let key = QueryKey::new(resource.path());
        let records = cache
            .get_or_fetch(key, || async {
                client.get_list::<T>(resource.path(), &[]).await
            })
            .await?;
        Ok(Self::new(records.as_ref().clone()))
    }
}

fn truncate_cell(value: &str) -> String {
    let single_line = value.replace(['\n', '\r'], " ");
    if measure_text_width(&single_line) <= MAX_CELL_WIDTH {
        return single_line;
    }
    let mut out: String = single_line.chars().take(MAX_CELL_WIDTH - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: usize,
        name: &'static str,
        status: &'static str,
    }

    impl Tabular for Row {
        fn columns() -> Vec<Column<Self>> {
            vec![
                Column::new("ID", |r: &Self| r.id.to_string()),
                Column::new("Ad", |r: &Self| r.name.to_string()),
            ]
        }

        fn status(&self) -> Option<String> {
            Some(self.status.to_string())
        }
    }

    fn rows(n: usize) -> Vec<Row> {
        (1..=n)
            .map(|id| Row {
                id,
                name: if id % 2 == 0 { "Örme" } else { "Dokuma" },
                status: if id % 3 == 0 { "completed" } else { "pending" },
            })
            .collect()
    }

    #[test]
    fn test_page_count_is_ceiling() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(23, 5), 5);
        assert_eq!(page_count(3, 0), 3);
    }

    #[test]
    fn test_pages_concatenate_to_original() {
        for (n, size) in [(0, 3), (1, 1), (7, 3), (9, 3), (10, 4)] {
            let items: Vec<usize> = (0..n).collect();
            let total = paginate(&items, 1, size).total_pages;
            assert_eq!(total, n.div_ceil(size));
            let joined: Vec<usize> = (1..=total)
                .flat_map(|p| paginate(&items, p, size).items)
                .collect();
            assert_eq!(joined, items);
        }
    }

    #[test]
    fn test_out_of_range_and_zero_page_are_empty() {
        let items = [1, 2, 3];
        assert!(paginate(&items, 0, 2).items.is_empty());
        assert!(paginate(&items, 3, 2).items.is_empty());
        assert_eq!(paginate(&items, 2, 2).items, vec![3]);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let page = paginate(&[1, 2, 3], 2, 0);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![2]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_columns() {
        let list = EntityList::new(rows(6));
        let query = ListQuery {
            search: Some("örme".to_string()),
            ..Default::default()
        };
        let ids: Vec<usize> = list.filtered(&query).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4, 6]);

        let query = ListQuery {
            search: Some("5".to_string()),
            ..Default::default()
        };
        assert_eq!(list.filtered(&query).len(), 1);
    }

    #[test]
    fn test_status_filter_and_custom_predicate() {
        let list = EntityList::new(rows(9)).filter_by(|r| r.id > 3);
        let query = ListQuery {
            status: Some("COMPLETED".to_string()),
            ..Default::default()
        };
        let ids: Vec<usize> = list.filtered(&query).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![6, 9]);
    }

    #[test]
    fn test_page_applies_filter_before_paging() {
        let list = EntityList::new(rows(10));
        let query = ListQuery {
            status: Some("pending".to_string()),
            page: 2,
            page_size: 4,
            ..Default::default()
        };
        let page = list.page(&query);
        assert_eq!(page.total_items, 7);
        assert_eq!(page.total_pages, 2);
        let ids: Vec<usize> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![7, 8, 10]);
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let list = EntityList::new(rows(2));
        let page = list.page(&ListQuery::default());
        let table = list.render_table(&page);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ID  Ad");
        assert_eq!(lines[2], "1   Dokuma");
        assert_eq!(lines[3], "2   Örme");
        assert!(lines[4].contains("Sayfa 1/1 (2 kayıt)"));
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let long = "x".repeat(100);
        let cell = truncate_cell(&long);
        assert_eq!(cell.chars().count(), MAX_CELL_WIDTH);
        assert!(cell.ends_with('…'));
    }
}
