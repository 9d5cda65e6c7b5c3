//! Testing utilities for code built on eddy.
//!
//! Assertion macros for [`Outcome`](crate::Outcome) values, a helper that turns
//! a run's unwinding into an inspectable [`Defect`], and, with the `proptest`
//! feature, an `Arbitrary` implementation for `Outcome`.
//!
//! # Examples
//!
//! ```rust
//! use eddy::{assert_failure_eq, assert_success, IO};
//!
//! let ok = IO::<String, _>::succeed(42).either::<std::convert::Infallible>().run();
//! assert_success!(ok);
//!
//! let failed = IO::<_, i32>::fail("nope").either::<std::convert::Infallible>().run();
//! assert_failure_eq!(failed, "nope");
//! ```

use std::panic::{self, AssertUnwindSafe};

use crate::cause::Defect;

/// Assert that an outcome is a `Success`.
///
/// # Example
///
/// ```rust
/// use eddy::{assert_success, Outcome};
///
/// assert_success!(Outcome::<String, _>::success(1));
/// ```
#[macro_export]
macro_rules! assert_success {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Success(_) => {}
            $crate::Outcome::Failure(e) => {
                panic!("Expected Success, got Failure: {:?}", e);
            }
        }
    };
}

/// Assert that an outcome is a `Failure`.
#[macro_export]
macro_rules! assert_failure {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Failure(_) => {}
            $crate::Outcome::Success(v) => {
                panic!("Expected Failure, got Success: {:?}", v);
            }
        }
    };
}

/// Assert that an outcome is a `Failure` holding the expected error.
///
/// # Example
///
/// ```rust
/// use eddy::{assert_failure_eq, Outcome};
///
/// let outcome = Outcome::<_, i32>::failure("too short");
/// assert_failure_eq!(outcome, "too short");
/// ```
#[macro_export]
macro_rules! assert_failure_eq {
    ($outcome:expr, $expected:expr) => {
        match $outcome {
            $crate::Outcome::Failure(error) => {
                assert_eq!(error, $expected);
            }
            $crate::Outcome::Success(v) => {
                panic!(
                    "Expected Failure with error {:?}, got Success: {:?}",
                    $expected, v
                );
            }
        }
    };
}

/// Call `f`, turning any panic it raises into a [`Defect`].
///
/// Handy for asserting on what escapes [`Effect::run`](crate::Effect::run):
/// typed failures and defect payloads both arrive as the defect's payload.
///
/// # Example
///
/// ```rust
/// use eddy::{testing::capture_defect, IO};
///
/// let effect = IO::<u16, ()>::fail(503);
/// let defect = capture_defect(|| effect.run()).unwrap_err();
/// assert_eq!(defect.downcast_ref::<u16>(), Some(&503));
/// ```
pub fn capture_defect<T, F>(f: F) -> Result<T, Defect>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(Defect::from_payload)
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl<E, A> Arbitrary for crate::Outcome<E, A>
where
    E: Arbitrary + 'static,
    A: Arbitrary + 'static,
    E::Strategy: 'static,
    A::Strategy: 'static,
{
    type Parameters = (E::Parameters, A::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let (e_params, a_params) = args;
        prop_oneof![
            any_with::<A>(a_params).prop_map(crate::Outcome::success),
            any_with::<E>(e_params).prop_map(crate::Outcome::failure),
        ]
        .boxed()
    }
}
