use culprit_search::{theoretical_max_attempts, CursorChain, PackedBitVector, SubsetEnumerator};
use std::collections::HashSet;

fn omitted_patterns(capacity: usize) -> Vec<Vec<usize>> {
    SubsetEnumerator::new((0..capacity).collect::<Vec<usize>>())
        .unwrap()
        .map(|candidate| candidate.positions)
        .collect()
}

#[test]
fn test_no_duplicates_up_to_twenty_items() {
    for capacity in [1, 2, 3, 5, 8, 12, 16, 20] {
        let mut enumerator = SubsetEnumerator::new((0..capacity).collect::<Vec<usize>>()).unwrap();
        let mut kept = Vec::with_capacity(capacity);
        let mut omitted = Vec::with_capacity(capacity);
        let mut seen = HashSet::new();
        while enumerator.next_into(&mut kept, &mut omitted) {
            assert!(!omitted.is_empty());
            let code = enumerator.bits().to_bits_u64().unwrap();
            assert!(seen.insert(code), "repeat at capacity {capacity}");
        }
        assert!((seen.len() as u128) < theoretical_max_attempts(capacity));
        assert_eq!(enumerator.stats().skipped_seen, 0);
    }
}

#[test]
fn test_cardinality_grows_one_generation_at_a_time() {
    for capacity in [1, 4, 9] {
        let patterns = omitted_patterns(capacity);
        let sizes: Vec<usize> = patterns.iter().map(Vec::len).collect();
        assert_eq!(sizes.first(), Some(&1));
        assert_eq!(sizes.last(), Some(&capacity));
        assert!(sizes.windows(2).all(|pair| pair[1] == pair[0] || pair[1] == pair[0] + 1));
    }
}

#[test]
fn test_cursor_count_matches_set_bits() {
    let mut bits = PackedBitVector::new(7);
    let mut chain = CursorChain::new(&mut bits);
    while chain.advance(&mut bits).is_some() {
        assert_eq!(chain.len(), bits.cardinality());
        let positions: HashSet<usize> = chain.positions().collect();
        assert_eq!(positions.len(), chain.len());
        assert!(chain.is_consistent_with(&bits));
    }
    assert!(bits.is_saturated());
}

#[test]
fn test_large_item_count_without_seen_set() {
    let mut enumerator = SubsetEnumerator::new((0..100u32).collect::<Vec<_>>()).unwrap();
    assert!(!enumerator.dedup_enabled());

    let mut kept = Vec::new();
    let mut omitted = Vec::new();
    let mut previous: Option<Vec<u32>> = None;
    for _ in 0..500 {
        assert!(enumerator.next_into(&mut kept, &mut omitted));
        assert_eq!(kept.len() + omitted.len(), 100);
        assert_ne!(previous.as_ref(), Some(&omitted));
        previous = Some(omitted.clone());
    }
    // the first 100 candidates omit one item each, then pairs start
    assert_eq!(omitted.len(), 2);
    assert_eq!(enumerator.stats().produced, 500);
}

#[test]
fn test_iterator_and_buffered_paths_agree() {
    let items: Vec<char> = "abcdef".chars().collect();
    let via_iter: Vec<Vec<char>> = SubsetEnumerator::new(items.clone())
        .unwrap()
        .map(|candidate| candidate.kept)
        .collect();

    let mut enumerator = SubsetEnumerator::new(items).unwrap();
    let mut kept = Vec::new();
    let mut omitted = Vec::new();
    let mut via_buffers = Vec::new();
    while enumerator.next_into(&mut kept, &mut omitted) {
        via_buffers.push(kept.clone());
    }
    assert_eq!(via_iter, via_buffers);
    assert_eq!(via_iter.len(), 63);
}
