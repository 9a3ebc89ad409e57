//! Pagination over a filtered record list.

/// One page of a larger result list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub total_pages: usize,
    /// 1-based
    pub current_page: usize,
}

/// Slice out 1-based `page` of size `limit`.
///
/// Page 0 is read as page 1. A page past the end is empty rather than an
/// error. A zero `limit` yields no pages at all.
pub fn paginate<T: Clone>(records: &[T], page: usize, limit: usize) -> Page<T> {
    let page = page.max(1);
    let total_items = records.len();

    if limit == 0 {
        return Page {
            items: Vec::new(),
            total_items,
            total_pages: 0,
            current_page: page,
        };
    }

    let total_pages = total_items.div_ceil(limit);
    let start = (page - 1).saturating_mul(limit);
    let items = if start >= total_items {
        Vec::new()
    } else {
        let end = start.saturating_add(limit).min(total_items);
        records[start..end].to_vec()
    };

    Page {
        items,
        total_items,
        total_pages,
        current_page: page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_partial_page() {
        let list: Vec<usize> = (1..=45).collect();
        let page = paginate(&list, 3, 20);

        assert_eq!(page.items, vec![41, 42, 43, 44, 45]);
        assert_eq!(page.total_items, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let list: Vec<usize> = (1..=10).collect();
        let page = paginate(&list, 5, 20);

        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_pages_reconstruct_list() {
        for (len, limit) in [(0, 5), (1, 1), (17, 4), (40, 20), (41, 20)] {
            let list: Vec<usize> = (0..len).collect();
            let first = paginate(&list, 1, limit);
            assert_eq!(first.total_pages, len.div_ceil(limit));

            let rebuilt: Vec<usize> = (1..=first.total_pages)
                .flat_map(|p| paginate(&list, p, limit).items)
                .collect();
            assert_eq!(rebuilt, list);
        }
    }

    #[test]
    fn test_zero_page_and_limit() {
        let list = vec!['a', 'b', 'c'];
        assert_eq!(paginate(&list, 0, 2).items, vec!['a', 'b']);
        assert_eq!(paginate(&list, 1, 0).total_pages, 0);
    }
}
