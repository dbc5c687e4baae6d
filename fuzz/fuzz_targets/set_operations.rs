#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rbset::{Insert, Tree};

#[derive(Arbitrary, Clone, Debug)]
pub enum Operation {
    Insert(i32),
    Delete(i32),
}

fuzz_target!(|ops: Vec<Operation>| {
    use Operation::{Delete, Insert as Ins};

    let mut tree = Tree::new();
    let mut count = 0usize;
    for op in ops {
        match op {
            Ins(key) => {
                if tree.insert(key) == Insert::Inserted {
                    count += 1;
                }
            }
            Delete(key) => {
                if tree.delete(key) == rbset::Delete::Deleted {
                    count -= 1;
                }
            }
        }
        assert!(tree.is_balanced());
        assert_eq!(tree.len(), count);
    }

    let keys: Vec<_> = tree.iter().map(|(_, key)| key).collect();
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
});
