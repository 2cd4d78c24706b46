//! Symmetric two-way branching.
//!
//! `Either` is the polarity-free sibling of [`Result`]: a `Result<B, A>`
//! converts into it with `Err` on the left and `Ok` on the right.

/// Value tagged with the branch it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Either<A, B> {
    /// Left branch.
    Left(A),
    /// Right branch.
    Right(B),
}

impl<A, B> Either<A, B> {
    /// Returns true if this is the Left variant.
    pub fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    /// Returns true if this is the Right variant.
    pub fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    /// Folds both branches into one value.
    pub fn either<R>(self, left: impl FnOnce(A) -> R, right: impl FnOnce(B) -> R) -> R {
        match self {
            Self::Left(a) => left(a),
            Self::Right(b) => right(b),
        }
    }

    /// Transforms the left payload.
    pub fn map_left<C>(self, f: impl FnOnce(A) -> C) -> Either<C, B> {
        match self {
            Self::Left(a) => Either::Left(f(a)),
            Self::Right(b) => Either::Right(b),
        }
    }

    /// Transforms the right payload.
    pub fn map_right<C>(self, f: impl FnOnce(B) -> C) -> Either<A, C> {
        match self {
            Self::Left(a) => Either::Left(a),
            Self::Right(b) => Either::Right(f(b)),
        }
    }

    /// Swaps the branches.
    pub fn flip(self) -> Either<B, A> {
        match self {
            Self::Left(a) => Either::Right(a),
            Self::Right(b) => Either::Left(b),
        }
    }

    /// Reads the value as a `Result` where the left branch is success.
    pub fn a_ok(self) -> Result<A, B> {
        match self {
            Self::Left(a) => Ok(a),
            Self::Right(b) => Err(b),
        }
    }

    /// Reads the value as a `Result` where the right branch is success.
    pub fn b_ok(self) -> Result<B, A> {
        match self {
            Self::Left(a) => Err(a),
            Self::Right(b) => Ok(b),
        }
    }
}

impl<A, B> From<Result<B, A>> for Either<A, B> {
    fn from(result: Result<B, A>) -> Self {
        match result {
            Ok(b) => Either::Right(b),
            Err(a) => Either::Left(a),
        }
    }
}
