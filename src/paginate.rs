//! Fixed-size pagination over ordered sequences

/// One paginated view of an ordered sequence.
///
/// A `Page` is derived data: re-sorting or resizing builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub pages: Vec<Vec<T>>,
}

impl<T> Page<T> {
    /// Rows on page `index`, empty when out of range
    pub fn rows(&self, index: usize) -> &[T] {
        self.pages.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Absolute position of `row` on page `index` in the source sequence
    pub fn absolute(&self, index: usize, row: usize) -> usize {
        index * self.page_size + row
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Slice `items` into consecutive chunks of `page_size`.
///
/// A zero page size (a terminal probe reporting no rows) is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let pages: Vec<Vec<T>> = items.chunks(page_size).map(<[T]>::to_vec).collect();

    Page {
        total: items.len(),
        page_count: pages.len(),
        page_size,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_five_items_in_pages_of_ten() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 10);

        assert_eq!(page.total, 25);
        assert_eq!(page.page_count, 3);
        let lens: Vec<usize> = page.pages.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![10, 10, 5]);
    }

    #[test]
    fn test_flatten_reproduces_items() {
        let items: Vec<u32> = (0..37).collect();
        for size in 1..=40 {
            let page = paginate(&items, size);
            let flat: Vec<u32> = page.pages.concat();
            assert_eq!(flat, items, "page size {}", size);
            assert_eq!(page.page_count, items.len().div_ceil(size));
        }
    }

    #[test]
    fn test_empty_input() {
        let page = paginate::<u32>(&[], 5);
        assert_eq!(page.page_count, 0);
        assert!(page.is_empty());
        assert!(page.rows(0).is_empty());
    }

    #[test]
    fn test_zero_page_size_is_coerced() {
        let page = paginate(&[1, 2, 3], 0);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.page_count, 3);
    }

    #[test]
    fn test_absolute_index() {
        let items: Vec<u32> = (0..20).collect();
        let page = paginate(&items, 10);
        assert_eq!(page.absolute(1, 0), 10);
        assert_eq!(page.rows(1)[0], 10);
    }
}
