use std::collections::HashSet;

use proptest::prelude::*;
use rust_data_index::index::{AnyIndex, CategoricalIndex, Index, MultiIndex, Positional};
use rust_data_index::{Key, Label, Positions};

fn label() -> impl Strategy<Value = Label> {
    prop_oneof![
        (-50i64..50).prop_map(Label::Int),
        "[a-e]{1,2}".prop_map(Label::Str),
    ]
}

fn unique_labels(max: usize) -> impl Strategy<Value = Vec<Label>> {
    prop::collection::hash_set(label(), 0..max).prop_map(|s| s.into_iter().collect())
}

fn tuples() -> impl Strategy<Value = Vec<Vec<Label>>> {
    (2usize..4).prop_flat_map(|width| {
        prop::collection::vec(
            prop::collection::vec(
                prop::sample::select(vec!["x", "y", "z"]).prop_map(Label::from),
                width,
            ),
            1..30,
        )
    })
}

fn dedup(rows: Vec<Vec<Label>>) -> Vec<Vec<Label>> {
    let mut seen = HashSet::new();
    rows.into_iter().filter(|r| seen.insert(r.clone())).collect()
}

proptest! {
    #[test]
    fn flat_pos_inverts_label(labels in unique_labels(40)) {
        let idx = Index::new(labels);
        for p in 0..idx.size() {
            let label = idx.label(p).unwrap();
            prop_assert_eq!(idx.pos(&[Key::from(label)]).unwrap(), Positions::Single(p));
        }
    }

    #[test]
    fn multi_keeps_deduplicated_tuples_and_resolves_prefixes(rows in tuples()) {
        let expected = dedup(rows.clone());
        let mi = MultiIndex::from_tuples(rows).unwrap();
        prop_assert_eq!(mi.to_vec(), expected.clone());

        for tuple in &expected {
            for k in 1..mi.width() {
                let prefix = &tuple[..k];
                let keys: Vec<Key> = prefix.iter().map(Key::from).collect();
                let want: Vec<usize> = expected
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.starts_with(prefix))
                    .map(|(p, _)| p)
                    .collect();
                prop_assert_eq!(mi.pos(&keys).unwrap(), Positions::Multiple(want));
            }
        }
    }

    #[test]
    fn categories_partition_positions(labels in prop::collection::vec(
        prop::sample::select(vec!["a", "b", "c", "d"]), 0..40)
    ) {
        let cat = CategoricalIndex::new(labels);
        let mut seen = HashSet::new();
        for category in cat.categories() {
            let positions = cat.pos(&[Key::from(category)]).unwrap().into_vec();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            for p in positions {
                prop_assert!(seen.insert(p));
            }
        }
        prop_assert_eq!(seen, (0..cat.size()).collect::<HashSet<_>>());
    }

    #[test]
    fn identity_reorder_is_a_noop(labels in unique_labels(30), rows in tuples()) {
        let flat = Index::new(labels);
        let identity: Vec<usize> = (0..flat.size()).collect();
        prop_assert_eq!(flat.reorder(&identity).unwrap(), flat);

        let mi = MultiIndex::from_tuples(rows).unwrap();
        let identity: Vec<usize> = (0..mi.size()).collect();
        prop_assert_eq!(mi.reorder(&identity).unwrap(), mi);

        let cat = CategoricalIndex::new(["a", "b", "a"]);
        prop_assert_eq!(cat.reorder(&[0, 1, 2]).unwrap(), cat);
    }

    #[test]
    fn identity_reorder_survives_level_removal(rows in tuples(), layer in 0usize..4) {
        let mi = MultiIndex::from_tuples(rows).unwrap();
        let layer = layer % mi.width();
        let identity: Vec<usize> = (0..mi.size()).collect();
        let reversed: Vec<usize> = identity.iter().rev().copied().collect();

        let reduced: Vec<AnyIndex> = vec![mi.drop_left_level(1).unwrap(), mi.remove_layer(layer).unwrap()];
        for idx in reduced {
            prop_assert_eq!(idx.size(), mi.size());
            prop_assert_eq!(idx.reorder(&identity).unwrap(), idx.clone());
            prop_assert_eq!(idx.take(&identity).unwrap(), idx.clone());
            let back = idx.reorder(&reversed).unwrap().reorder(&reversed).unwrap();
            prop_assert_eq!(back, idx);
        }
    }

    #[test]
    fn set_algebra_preserves_left_order(left in unique_labels(20), right in unique_labels(20)) {
        let a = Index::new(left);
        let b = Index::new(right);

        let union = a.union(&b).unwrap().to_vec();
        let mut want = a.to_vec();
        want.extend(b.iter().filter(|l| !a.contains(l)));
        prop_assert_eq!(union, want);

        let inter = a.intersection(&b).unwrap().to_vec();
        let want: Vec<Label> = a.iter().filter(|l| b.contains(l)).collect();
        prop_assert_eq!(inter, want);
    }
}
