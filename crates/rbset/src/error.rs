pub(crate) type Result<T> = std::result::Result<T, Error>;

/// First red-black/BST invariant found to be violated by [`Tree::check`].
///
/// Each variant carries the key of the offending node where one exists.
///
/// [`Tree::check`]: crate::Tree::check
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    RedRoot,
    ConsecutiveRed(i32),
    DifferingBlackHeight(i32),
    OrderViolation(i32),
    BrokenParentLink(i32),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}
