mod common;

use hex_literal::hex;
use quickcheck::{QuickCheck, TestResult};
use rootstore::{AuthenticatedTree, Blake3Hasher, Digest, EmptyDigests, Sha2Hasher};

#[test]
fn empty_root_of_height_twenty() {
    let tree = AuthenticatedTree::<Sha2Hasher>::new(20).unwrap();
    let expected = Digest::new(hex!(
        "cddba7b592e3133393c16194fac7431abf2f5485ed711db282183c819e08ebaa"
    ));
    assert_eq!(tree.get_root(), expected);
    assert_eq!(
        EmptyDigests::<Sha2Hasher>::new(20).unwrap().root(),
        expected
    );
}

#[test]
fn set_leaf_522_to_nine() {
    common::init_logging();
    let mut tree = AuthenticatedTree::<Sha2Hasher>::new(20).unwrap();
    let empty_root = tree.get_root();

    tree.set_leaf(522, Digest::from(9)).unwrap();
    let r1 = tree.get_root();
    assert_eq!(
        r1,
        Digest::new(hex!(
            "4c2091e8dc4364fcd919e3ec7f2f11ad8fb434a258b9d7b30e4402f512d10727"
        ))
    );

    let witness = tree.get_witness(522).unwrap();
    assert_eq!(witness.verify::<Sha2Hasher>(Digest::from(9)), r1);
    // the old value with the same witness recovers the empty-tree root.
    assert_eq!(witness.verify::<Sha2Hasher>(Digest::from(0)), empty_root);
    assert_eq!(witness.calculate_index(), 522);
}

#[test]
fn round_trip_many_leaves() {
    let mut tree = AuthenticatedTree::<Blake3Hasher>::new(16).unwrap();
    let writes = common::random_writes(1, 16, 200);
    for (index, leaf) in &writes {
        tree.set_leaf(*index, *leaf).unwrap();
    }
    let root = tree.get_root();
    for (index, leaf) in &writes {
        let witness = tree.get_witness(*index).unwrap();
        assert_eq!(witness.verify::<Blake3Hasher>(*leaf), root);
        assert!(tree.validate(*index).unwrap());
    }
}

#[test]
fn determinism_across_trees() {
    let writes = common::random_writes(2, 12, 300);
    let mut a = AuthenticatedTree::<Blake3Hasher>::new(12).unwrap();
    let mut b = AuthenticatedTree::<Blake3Hasher>::new(12).unwrap();
    for (index, leaf) in &writes {
        a.set_leaf(*index, *leaf).unwrap();
        b.set_leaf(*index, *leaf).unwrap();
    }
    assert_eq!(a.get_root(), b.get_root());
}

#[test]
fn root_depends_only_on_final_leaves() {
    let writes = common::random_writes(3, 10, 100);
    let mut forward = AuthenticatedTree::<Blake3Hasher>::new(10).unwrap();
    let mut backward = AuthenticatedTree::<Blake3Hasher>::new(10).unwrap();
    for (index, leaf) in &writes {
        forward.set_leaf(*index, *leaf).unwrap();
    }
    for (index, leaf) in writes.iter().rev() {
        // a detour that is overwritten must leave no trace.
        backward.set_leaf(*index, common::leaf(u64::MAX)).unwrap();
        backward.set_leaf(*index, *leaf).unwrap();
    }
    assert_eq!(forward.get_root(), backward.get_root());
}

#[test]
fn fill_matches_individual_sets() {
    let leaves: Vec<Digest> = (0..37).map(common::leaf).collect();
    let mut filled = AuthenticatedTree::<Blake3Hasher>::new(6).unwrap();
    filled.fill(&leaves).unwrap();
    let mut set = AuthenticatedTree::<Blake3Hasher>::new(6).unwrap();
    for (i, leaf) in leaves.iter().enumerate() {
        set.set_leaf(i as u64, *leaf).unwrap();
    }
    assert_eq!(filled.get_root(), set.get_root());
}

#[test]
fn tamper_detection() {
    fn prop(index: u16, value: u64, other: u64) -> TestResult {
        if value == other {
            return TestResult::discard();
        }
        let mut tree = AuthenticatedTree::<Blake3Hasher>::new(16).unwrap();
        let index = index as u64;
        tree.set_leaf(index, common::leaf(value)).unwrap();
        let witness = tree.get_witness(index).unwrap();
        TestResult::from_bool(witness.verify::<Blake3Hasher>(common::leaf(other)) != tree.get_root())
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(u16, u64, u64) -> TestResult);
}

#[test]
fn non_interference() {
    fn prop(i: u16, j: u16, vi: u64, vj: u64) -> TestResult {
        if i == j {
            return TestResult::discard();
        }
        let (i, j) = (i as u64, j as u64);
        let mut tree = AuthenticatedTree::<Blake3Hasher>::new(16).unwrap();
        tree.set_leaf(j, common::leaf(vj)).unwrap();
        let before = tree.get_witness(j).unwrap();

        tree.set_leaf(i, common::leaf(vi)).unwrap();
        let after = tree.get_witness(j).unwrap();

        // the refreshed witness of j still proves j's value.
        let refreshed_ok = after.verify::<Blake3Hasher>(common::leaf(vj)) == tree.get_root();
        // the old one is stale.
        let old_stale = before.verify::<Blake3Hasher>(common::leaf(vj)) != tree.get_root();
        let leaf_kept = tree.get_leaf(j).unwrap() == common::leaf(vj);
        TestResult::from_bool(refreshed_ok && old_stale && leaf_kept)
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(u16, u16, u64, u64) -> TestResult);
}
