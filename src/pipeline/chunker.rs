//! Fixed-size batching of rendered messages.

/// Split `items` into consecutive batches of `size`; the last batch holds
/// the remainder.
///
/// Empty input yields no batches. A zero `size` yields one batch with
/// everything in it.
pub fn chunk<T>(items: &[T], size: usize) -> Vec<&[T]> {
    if items.is_empty() {
        return Vec::new();
    }
    if size == 0 {
        return vec![items];
    }
    items.chunks(size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_five_by_ten() {
        let items: Vec<u32> = (0..25).collect();
        let sizes: Vec<usize> = chunk(&items, 10).iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let items: Vec<u32> = (0..20).collect();
        let sizes: Vec<usize> = chunk(&items, 10).iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![10, 10]);
    }

    #[test]
    fn fewer_items_than_size() {
        let items = ["a", "b", "c"];
        assert_eq!(chunk(&items, 10), vec![&items[..]]);
    }

    #[test]
    fn empty_input_has_no_chunks() {
        let items: Vec<String> = Vec::new();
        assert!(chunk(&items, 10).is_empty());
    }

    #[test]
    fn zero_size_is_single_chunk() {
        let items = [1, 2, 3];
        assert_eq!(chunk(&items, 0), vec![&items[..]]);
    }

    #[test]
    fn concat_preserves_items_for_all_sizes() {
        let items: Vec<u32> = (0..37).collect();
        for size in 1..=40 {
            let chunks = chunk(&items, size);
            let flat: Vec<u32> = chunks.concat();
            assert_eq!(flat, items, "size {size}");

            let (last, rest) = chunks.split_last().unwrap();
            assert!(rest.iter().all(|c| c.len() == size), "size {size}");
            assert!(!last.is_empty() && last.len() <= size, "size {size}");
        }
    }
}
