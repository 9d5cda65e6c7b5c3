//! A two-case success/failure container.
//!
//! # Outcome vs Result
//!
//! `Outcome<E, A>` carries the same information as `Result<A, E>` but puts the
//! failure type first and spells the cases `Failure` / `Success`. It is the value
//! an [`Effect`](crate::Effect) reifies its typed failure channel into (see
//! [`Effect::either`](crate::Effect::either)) and the argument of
//! [`Effect::from_outcome`](crate::Effect::from_outcome).
//!
//! Conversions to and from `Result` are provided in both directions, so code that
//! wants the `?` operator can move over with `.into_result()?`.
//!
//! # Examples
//!
//! ```rust
//! use eddy::Outcome;
//!
//! fn parse_port(raw: &str) -> Outcome<String, u16> {
//!     match raw.parse::<u16>() {
//!         Ok(port) => Outcome::success(port),
//!         Err(_) => Outcome::failure(format!("not a port: {}", raw)),
//!     }
//! }
//!
//! let described = parse_port("8080").fold(
//!     |err| format!("error: {}", err),
//!     |port| format!("port {}", port),
//! );
//! assert_eq!(described, "port 8080");
//!
//! let checked = parse_port("80").require(|p| *p >= 1024, |p| format!("privileged: {}", p));
//! assert_eq!(checked, Outcome::failure("privileged: 80".to_string()));
//! ```

use std::any::Any;
use std::convert::Infallible;
use std::fmt;

use crate::error::UnhandledFailure;

/// Either a `Failure(E)` or a `Success(A)`.
///
/// Exactly one case is populated. Every operation is total over both cases;
/// operations that only concern one case (`map`, `map_err`, `and_then`, ...)
/// pass the other case through untouched.
///
/// # Example
///
/// ```rust
/// use eddy::Outcome;
///
/// let ok: Outcome<&str, i32> = Outcome::success(21);
/// let err: Outcome<&str, i32> = Outcome::failure("boom");
///
/// assert_eq!(ok.map(|x| x * 2), Outcome::success(42));
/// assert_eq!(err.map(|x| x * 2), Outcome::failure("boom"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome<E, A> {
    /// The failure case
    Failure(E),
    /// The success case
    Success(A),
}

impl<E, A> Outcome<E, A> {
    // ========== Constructors ==========

    /// Create a `Success` value.
    #[inline]
    pub fn success(value: A) -> Self {
        Outcome::Success(value)
    }

    /// Create a `Failure` value.
    #[inline]
    pub fn failure(error: E) -> Self {
        Outcome::Failure(error)
    }

    // ========== Predicates ==========

    /// Returns `true` if this is a `Success`.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns `true` if this is a `Failure`.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    // ========== Extractors ==========

    /// Returns the success value if present, consuming self.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::Outcome;
    ///
    /// assert_eq!(Outcome::<&str, i32>::success(1).into_success(), Some(1));
    /// assert_eq!(Outcome::<&str, i32>::failure("e").into_success(), None);
    /// ```
    #[inline]
    pub fn into_success(self) -> Option<A> {
        match self {
            Outcome::Failure(_) => None,
            Outcome::Success(a) => Some(a),
        }
    }

    /// Returns the failure value if present, consuming self.
    #[inline]
    pub fn into_failure(self) -> Option<E> {
        match self {
            Outcome::Failure(e) => Some(e),
            Outcome::Success(_) => None,
        }
    }

    /// Convert to `Outcome<&E, &A>`.
    #[inline]
    pub fn as_ref(&self) -> Outcome<&E, &A> {
        match self {
            Outcome::Failure(e) => Outcome::Failure(e),
            Outcome::Success(a) => Outcome::Success(a),
        }
    }

    /// Extract the success value, panicking on `Failure`.
    ///
    /// # Panics
    ///
    /// Panics if the value is a `Failure`.
    #[inline]
    pub fn unwrap_success(self) -> A
    where
        E: fmt::Debug,
    {
        match self {
            Outcome::Success(a) => a,
            Outcome::Failure(e) => {
                panic!("called `Outcome::unwrap_success()` on a `Failure` value: {:?}", e)
            }
        }
    }

    /// Extract the failure value, panicking on `Success`.
    ///
    /// # Panics
    ///
    /// Panics if the value is a `Success`.
    #[inline]
    pub fn unwrap_failure(self) -> E
    where
        A: fmt::Debug,
    {
        match self {
            Outcome::Failure(e) => e,
            Outcome::Success(a) => {
                panic!("called `Outcome::unwrap_failure()` on a `Success` value: {:?}", a)
            }
        }
    }

    // ========== Folding ==========

    /// Unify both cases into a single value, invoking exactly one of the callables.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::Outcome;
    ///
    /// let ok: Outcome<i32, &str> = Outcome::success("hello");
    /// assert_eq!(ok.fold(|e| e.to_string(), |s| s.to_uppercase()), "HELLO");
    /// ```
    #[inline]
    pub fn fold<C, F, G>(self, case_failure: F, case_success: G) -> C
    where
        F: FnOnce(E) -> C,
        G: FnOnce(A) -> C,
    {
        match self {
            Outcome::Failure(e) => case_failure(e),
            Outcome::Success(a) => case_success(a),
        }
    }

    // ========== Transformations ==========

    /// Transform the success value.
    #[inline]
    pub fn map<B, F>(self, f: F) -> Outcome<E, B>
    where
        F: FnOnce(A) -> B,
    {
        match self {
            Outcome::Failure(e) => Outcome::Failure(e),
            Outcome::Success(a) => Outcome::Success(f(a)),
        }
    }

    /// Transform the failure value.
    #[inline]
    pub fn map_err<E2, F>(self, f: F) -> Outcome<E2, A>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Outcome::Failure(e) => Outcome::Failure(f(e)),
            Outcome::Success(a) => Outcome::Success(a),
        }
    }

    /// Chain a computation on the success value. Failures short-circuit:
    /// `f` is never invoked for a `Failure`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::Outcome;
    ///
    /// let halve = |x: i32| {
    ///     if x % 2 == 0 {
    ///         Outcome::success(x / 2)
    ///     } else {
    ///         Outcome::failure(format!("{} is odd", x))
    ///     }
    /// };
    ///
    /// assert_eq!(Outcome::success(8).and_then(halve), Outcome::success(4));
    /// assert_eq!(Outcome::success(3).and_then(halve), Outcome::failure("3 is odd".to_string()));
    /// ```
    #[inline]
    pub fn and_then<B, F>(self, f: F) -> Outcome<E, B>
    where
        F: FnOnce(A) -> Outcome<E, B>,
    {
        match self {
            Outcome::Failure(e) => Outcome::Failure(e),
            Outcome::Success(a) => f(a),
        }
    }

    /// Exchange the two cases.
    #[inline]
    pub fn swap(self) -> Outcome<A, E> {
        match self {
            Outcome::Failure(e) => Outcome::Success(e),
            Outcome::Success(a) => Outcome::Failure(a),
        }
    }

    /// Downgrade a `Success` that fails `predicate` into a `Failure` built by `to_error`.
    #[inline]
    pub fn require<P, F>(self, predicate: P, to_error: F) -> Self
    where
        P: FnOnce(&A) -> bool,
        F: FnOnce(&A) -> E,
    {
        match self {
            Outcome::Success(a) => {
                if predicate(&a) {
                    Outcome::Success(a)
                } else {
                    Outcome::Failure(to_error(&a))
                }
            }
            failure => failure,
        }
    }

    /// Check `predicate` on a `Success`, panicking with `to_error(&value)` as the
    /// panic payload when it does not hold.
    ///
    /// Unlike [`require`](Outcome::require) this is not a recoverable path: the
    /// produced error leaves through the native unwinding channel.
    ///
    /// # Panics
    ///
    /// Panics with the produced error as payload when the predicate fails.
    #[inline]
    pub fn asserting<P, F, X>(self, predicate: P, to_error: F) -> Self
    where
        P: FnOnce(&A) -> bool,
        F: FnOnce(&A) -> X,
        X: Any + Send,
    {
        match self {
            Outcome::Success(a) => {
                if !predicate(&a) {
                    std::panic::panic_any(to_error(&a));
                }
                Outcome::Success(a)
            }
            failure => failure,
        }
    }

    /// Unwrap a `Failure` by panicking with the error itself as payload.
    ///
    /// # Panics
    ///
    /// Panics on `Failure`.
    pub fn raise_errors(self) -> Outcome<Infallible, A>
    where
        E: std::error::Error + Send + 'static,
    {
        match self {
            Outcome::Failure(e) => std::panic::panic_any(e),
            Outcome::Success(a) => Outcome::Success(a),
        }
    }

    /// Unwrap a `Failure` by panicking with an [`UnhandledFailure`] wrapping the error.
    ///
    /// Use this for error types that are plain data rather than `std::error::Error`s.
    ///
    /// # Panics
    ///
    /// Panics on `Failure`.
    pub fn raise_unhandled(self) -> Outcome<Infallible, A>
    where
        E: fmt::Debug + Send + 'static,
    {
        match self {
            Outcome::Failure(e) => std::panic::panic_any(UnhandledFailure::new(e)),
            Outcome::Success(a) => Outcome::Success(a),
        }
    }

    /// Observe the outcome by reference and return it unchanged.
    #[inline]
    pub fn tap<F>(self, f: F) -> Self
    where
        F: FnOnce(&Self),
    {
        f(&self);
        self
    }

    // ========== Conversions ==========

    /// Convert into a standard `Result`.
    #[inline]
    pub fn into_result(self) -> Result<A, E> {
        match self {
            Outcome::Failure(e) => Err(e),
            Outcome::Success(a) => Ok(a),
        }
    }

    /// Create from a standard `Result`.
    #[inline]
    pub fn from_result(result: Result<A, E>) -> Self {
        match result {
            Ok(a) => Outcome::Success(a),
            Err(e) => Outcome::Failure(e),
        }
    }

    /// Rebuild an outcome from an untyped value.
    ///
    /// The failure type is tested first. When the value is of neither type it is
    /// handed back untouched.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::any::Any;
    /// use eddy::Outcome;
    ///
    /// let raw: Box<dyn Any + Send> = Box::new(7_u8);
    /// let outcome = Outcome::<String, u8>::from_union(raw).ok();
    /// assert_eq!(outcome, Some(Outcome::success(7)));
    /// ```
    pub fn from_union(value: Box<dyn Any + Send>) -> Result<Self, Box<dyn Any + Send>>
    where
        E: 'static,
        A: 'static,
    {
        let value = match value.downcast::<E>() {
            Ok(e) => return Ok(Outcome::Failure(*e)),
            Err(value) => value,
        };
        value.downcast::<A>().map(|a| Outcome::Success(*a))
    }
}

impl<T> Outcome<T, T> {
    /// Project either case into the plain value it holds.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy::Outcome;
    ///
    /// assert_eq!(Outcome::<i32, i32>::failure(1).into_union(), 1);
    /// assert_eq!(Outcome::<i32, i32>::success(2).into_union(), 2);
    /// ```
    #[inline]
    pub fn into_union(self) -> T {
        match self {
            Outcome::Failure(t) | Outcome::Success(t) => t,
        }
    }
}

impl<E, A> Outcome<E, Outcome<E, A>> {
    /// Flatten a nested outcome.
    #[inline]
    pub fn flatten(self) -> Outcome<E, A> {
        self.and_then(|inner| inner)
    }
}

impl<A> Outcome<Infallible, A> {
    /// Extract the value of an outcome that cannot fail.
    #[inline]
    pub fn into_value(self) -> A {
        match self {
            Outcome::Failure(never) => match never {},
            Outcome::Success(a) => a,
        }
    }
}

impl<E, A> From<Result<A, E>> for Outcome<E, A> {
    fn from(result: Result<A, E>) -> Self {
        Outcome::from_result(result)
    }
}

impl<E, A> From<Outcome<E, A>> for Result<A, E> {
    fn from(outcome: Outcome<E, A>) -> Self {
        outcome.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[derive(Debug, Clone, PartialEq)]
    struct Bippy(String);

    impl fmt::Display for Bippy {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "bippy: {}", self.0)
        }
    }

    impl std::error::Error for Bippy {}

    #[test]
    fn test_constructors_and_predicates() {
        let ok: Outcome<&str, i32> = Outcome::success(1);
        let err: Outcome<&str, i32> = Outcome::failure("e");
        assert!(ok.is_success() && !ok.is_failure());
        assert!(err.is_failure() && !err.is_success());
    }

    #[test]
    fn test_fold_invokes_exactly_one_branch() {
        let mut calls = Vec::new();
        let result = Outcome::<i32, i32>::success(3).fold(
            |e| {
                calls.push("failure");
                e
            },
            |a| a * 10,
        );
        assert_eq!(result, 30);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_map_err_only_touches_failure() {
        let err: Outcome<i32, &str> = Outcome::failure(2);
        assert_eq!(err.map_err(|e| e + 1), Outcome::failure(3));
        let ok: Outcome<i32, &str> = Outcome::success("x");
        assert_eq!(ok.map_err(|e| e + 1), Outcome::success("x"));
    }

    #[test]
    fn test_and_then_short_circuits() {
        let mut called = false;
        let err: Outcome<&str, i32> = Outcome::failure("stop");
        let result = err.and_then(|x| {
            called = true;
            Outcome::success(x + 1)
        });
        assert_eq!(result, Outcome::failure("stop"));
        assert!(!called);
    }

    #[test]
    fn test_flatten() {
        let nested: Outcome<&str, Outcome<&str, i32>> = Outcome::success(Outcome::success(4));
        assert_eq!(nested.flatten(), Outcome::success(4));

        let nested: Outcome<&str, Outcome<&str, i32>> = Outcome::success(Outcome::failure("in"));
        assert_eq!(nested.flatten(), Outcome::failure("in"));

        let nested: Outcome<&str, Outcome<&str, i32>> = Outcome::failure("out");
        assert_eq!(nested.flatten(), Outcome::failure("out"));
    }

    #[test]
    fn test_swap() {
        assert_eq!(Outcome::<i32, &str>::failure(1).swap(), Outcome::success(1));
        assert_eq!(Outcome::<i32, &str>::success("a").swap(), Outcome::failure("a"));
    }

    #[test]
    fn test_require_keeps_passing_values() {
        let ok: Outcome<String, i32> = Outcome::success(10);
        assert_eq!(
            ok.require(|x| *x > 5, |x| format!("{} too small", x)),
            Outcome::success(10)
        );
    }

    #[test]
    fn test_require_leaves_failures_alone() {
        let err: Outcome<String, i32> = Outcome::failure("earlier".to_string());
        assert_eq!(
            err.require(|_| false, |x| format!("{}", x)),
            Outcome::failure("earlier".to_string())
        );
    }

    #[test]
    fn test_asserting_passes_when_predicate_holds() {
        let ok: Outcome<String, i32> = Outcome::success(1);
        assert_eq!(
            ok.asserting(|x| *x == 1, |x| Bippy(x.to_string())),
            Outcome::success(1)
        );
    }

    #[test]
    fn test_asserting_panics_with_produced_error() {
        let payload = panic::catch_unwind(|| {
            Outcome::<String, i32>::success(2).asserting(|x| *x == 1, |x| Bippy(x.to_string()))
        })
        .unwrap_err();
        assert_eq!(payload.downcast_ref::<Bippy>(), Some(&Bippy("2".to_string())));
    }

    #[test]
    fn test_raise_errors_panics_with_error_payload() {
        let payload = panic::catch_unwind(|| {
            Outcome::<Bippy, i32>::failure(Bippy("raised".to_string())).raise_errors()
        })
        .unwrap_err();
        assert_eq!(payload.downcast_ref::<Bippy>(), Some(&Bippy("raised".to_string())));
    }

    #[test]
    fn test_raise_unhandled_wraps_plain_data() {
        let payload = panic::catch_unwind(AssertUnwindSafe(|| {
            Outcome::<i32, i32>::failure(7).raise_unhandled()
        }))
        .unwrap_err();
        let wrapped = payload.downcast_ref::<UnhandledFailure<i32>>().unwrap();
        assert_eq!(wrapped.error(), &7);
    }

    #[test]
    fn test_raise_errors_keeps_success() {
        let ok: Outcome<Bippy, i32> = Outcome::success(5);
        assert_eq!(ok.raise_errors().into_value(), 5);
    }

    #[test]
    fn test_into_union() {
        let ok: Outcome<String, String> = Outcome::success("a".to_string());
        assert_eq!(ok.into_union(), "a");
    }

    #[test]
    fn test_from_union_prefers_failure_type() {
        let raw: Box<dyn Any + Send> = Box::new(5_i32);
        let outcome = Outcome::<i32, i32>::from_union(raw).ok();
        assert_eq!(outcome, Some(Outcome::failure(5)));
    }

    #[test]
    fn test_from_union_returns_unmatched_value() {
        let raw: Box<dyn Any + Send> = Box::new("neither");
        let rejected = Outcome::<i32, String>::from_union(raw).unwrap_err();
        assert_eq!(rejected.downcast_ref::<&str>(), Some(&"neither"));
    }

    #[test]
    fn test_tap_observes() {
        let mut seen = None;
        let ok: Outcome<&str, i32> = Outcome::success(9);
        let out = ok.tap(|o| seen = Some(o.is_success()));
        assert_eq!(out, Outcome::success(9));
        assert_eq!(seen, Some(true));
    }

    #[test]
    fn test_result_conversion() {
        let outcome: Outcome<&str, i32> = Ok(1).into();
        assert_eq!(outcome, Outcome::success(1));
        let result: Result<i32, &str> = Outcome::failure("e").into();
        assert_eq!(result, Err("e"));
    }

    #[test]
    #[should_panic(expected = "called `Outcome::unwrap_success()` on a `Failure` value")]
    fn test_unwrap_success_panics() {
        Outcome::<&str, i32>::failure("e").unwrap_success();
    }

    #[test]
    #[should_panic(expected = "called `Outcome::unwrap_failure()` on a `Success` value")]
    fn test_unwrap_failure_panics() {
        Outcome::<&str, i32>::success(1).unwrap_failure();
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let ok: Outcome<String, i32> = Outcome::success(3);
        let json = serde_json::to_string(&ok).unwrap();
        assert_eq!(json, r#"{"Success":3}"#);
        let back: Outcome<String, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ok);
    }
}
