#[allow(unused_macros)]
macro_rules! set {
    ($($key:expr),* $(,)?) => {{
        let mut tree = crate::Tree::new();
        $(tree.insert($key);)*
        tree
    }};
}

#[allow(unused_macros)]
macro_rules! keys {
    ($tree:expr) => {{
        $tree.iter().map(|(_, key)| key).collect::<Vec<_>>()
    }};
}

#[allow(unused_imports)]
pub(super) use {keys, set};
