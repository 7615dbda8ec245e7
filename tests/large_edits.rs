use slice_tree::SliceTree;
use test_log::test;

#[test]
fn bulk_insert_then_bulk_delete() {
    let mut tree = SliceTree::new();

    tree.insert(0, vec![b'X'; 10_000]);
    tree.remove(100, 9_800);

    assert_eq!(200, tree.len());
    assert_eq!(tree.to_vec(), vec![b'X'; 200]);
    tree.verify();
}

#[test]
fn cursor_over_the_shrunken_document() {
    let mut tree = SliceTree::new();
    tree.insert(0, vec![b'X'; 10_000]);
    tree.remove(100, 9_800);

    let mut iter = tree.iter_at(50);
    assert_eq!(Some(b'X'), iter.byte());

    assert_eq!(Some(b'X'), iter.prev_byte(50));
    assert_eq!(0, iter.pos());

    assert_eq!(Some(b'X'), iter.next_byte(199));
    assert_eq!(199, iter.pos());

    assert_eq!(None, iter.next_byte(1));
    assert_eq!(200, iter.pos());
    assert_eq!(None, iter.byte());
}

#[test]
fn many_small_inserts_grow_the_tree() {
    let mut tree = SliceTree::new();
    let mut shadow = vec![];

    // scattered positions force piece churn, leaf splits, inner splits, and
    // eventually a taller root
    for i in 0..5_000_u64 {
        let pos = (i * 7_919) % (tree.len() + 1);
        let data = [b'a' + (i % 26) as u8; 8];

        tree.insert(pos, data);
        shadow.splice(pos as usize..pos as usize, data.iter().copied());
    }

    assert_eq!(shadow, tree.to_vec());
    assert_eq!(40_000, tree.len());
    tree.verify();
}

#[test]
fn deletions_spanning_many_leaves() {
    let mut tree = SliceTree::new();
    let mut shadow = vec![];

    for i in 0..2_000_u64 {
        let pos = (i * 5_023) % (tree.len() + 1);
        let data = [b'0' + (i % 10) as u8; 16];
        tree.insert(pos, data);
        shadow.splice(pos as usize..pos as usize, data.iter().copied());
    }
    tree.verify();

    // carve out ranges crossing 0, 1, 2 and many leaf boundaries
    for &(pos, count) in &[
        (5_u64, 1_u64),
        (100, 500),
        (1_000, 3_000),
        (2_000, 20_000),
        (0, 7),
    ] {
        tree.remove(pos, count);
        let end = shadow.len().min(pos as usize + count as usize);
        shadow.drain(pos as usize..end);

        assert_eq!(shadow, tree.to_vec());
        tree.verify();
    }
}

#[test]
fn deleting_everything_collapses_the_tree() {
    let mut tree = SliceTree::new();

    for i in 0..3_000_u64 {
        tree.insert((i * 31) % (tree.len() + 1), "0123456789");
    }
    tree.verify();

    tree.remove(0, tree.len());

    assert!(tree.is_empty());
    assert!(tree.to_vec().is_empty());
    tree.verify();

    // and the tree is still editable afterwards
    tree.insert(0, "alive");
    assert_eq!(tree.to_vec(), b"alive");
    tree.verify();
}

#[test]
fn alternating_front_edits() {
    let mut tree = SliceTree::new();

    // underflow churn at the left spine
    for _ in 0..1_000 {
        tree.insert(0, vec![b'q'; 100]);
    }
    tree.verify();

    for _ in 0..999 {
        tree.remove(0, 100);
        tree.verify();
    }

    assert_eq!(100, tree.len());
    assert_eq!(tree.to_vec(), vec![b'q'; 100]);
}

#[test]
fn huge_single_insert_is_one_shared_block() {
    let mut tree = SliceTree::new();
    let payload: Vec<u8> = (0..1_000_000_u32).map(|i| (i % 251) as u8).collect();

    tree.insert(0, &payload);
    assert_eq!(payload, tree.to_vec());
    tree.verify();

    // cutting into it produces windows into the same block
    tree.remove(500_000, 1_000);
    assert_eq!(999_000, tree.len());
    tree.verify();

    let mut expected = payload;
    expected.drain(500_000..501_000);
    assert_eq!(expected, tree.to_vec());
}
