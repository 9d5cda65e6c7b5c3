//! Error types raised by the interpreter and by the escape hatches of
//! [`Outcome`](crate::Outcome).
//!
//! None of these travel through an effect's typed error channel. They are the
//! payloads of [`Defect`](crate::Defect)s, and surface as panics at the
//! [`Runtime::run`](crate::Runtime::run) boundary.

use std::any::{self, Any};
use std::fmt;

/// A broken interpreter invariant.
///
/// # Examples
///
/// ```rust
/// use std::panic::{self, AssertUnwindSafe};
/// use eddy::{Effect, RuntimeError};
///
/// // Reading an environment nobody provided.
/// let effect = Effect::<(), String, ()>::environment();
/// let payload = panic::catch_unwind(AssertUnwindSafe(|| effect.run())).unwrap_err();
///
/// assert_eq!(
///     payload.downcast_ref::<RuntimeError>(),
///     Some(&RuntimeError::MissingEnvironment { expected: "()" })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// An environment was read with nothing provided.
    MissingEnvironment {
        /// Type the reader expected.
        expected: &'static str,
    },
    /// The innermost provided environment is not of the type the reader expected.
    EnvironmentMismatch {
        /// Type the reader expected.
        expected: &'static str,
    },
    /// A value flowing between nodes did not have the type its consumer expected.
    ValueMismatch {
        /// Type the consumer expected.
        expected: &'static str,
    },
    /// A single-use node (built at run time around an owned value) was evaluated twice.
    AlreadyConsumed,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::MissingEnvironment { expected } => {
                write!(f, "no environment bound (expected {})", expected)
            }
            RuntimeError::EnvironmentMismatch { expected } => {
                write!(f, "bound environment is not a {}", expected)
            }
            RuntimeError::ValueMismatch { expected } => {
                write!(f, "effect value is not a {}", expected)
            }
            RuntimeError::AlreadyConsumed => {
                write!(f, "single-use effect node evaluated more than once")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// No [`at_type`](crate::Effect::at_type) case matched the value marked by
/// [`match_types`](crate::Effect::match_types).
///
/// Carries the unmatched value for diagnostics.
pub struct TypeMatchError {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl TypeMatchError {
    /// Wrap the value awaiting dispatch.
    ///
    /// A `Box<dyn Any + Send>` is unwrapped, so dispatch sees the type of the
    /// value inside it; its type name is then reported as `<erased>`.
    pub fn new<T: Any + Send>(value: T) -> Self {
        let value: Box<dyn Any + Send> = Box::new(value);
        match value.downcast::<Box<dyn Any + Send>>() {
            Ok(erased) => TypeMatchError {
                value: *erased,
                type_name: "<erased>",
            },
            Err(value) => TypeMatchError {
                value,
                type_name: any::type_name::<T>(),
            },
        }
    }

    /// Name of the unmatched value's type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the pending value is exactly a `T`.
    pub fn holds<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrow the unmatched value as a `T`.
    pub fn value_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the value out as a `T`, or get the error back untouched.
    pub fn take<T: Any>(self) -> Result<T, TypeMatchError> {
        let TypeMatchError { value, type_name } = self;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(TypeMatchError { value, type_name }),
        }
    }

    /// Take the unmatched value out.
    pub fn into_value(self) -> Box<dyn Any + Send> {
        self.value
    }
}

impl fmt::Debug for TypeMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMatchError")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no type case matched a value of type {}", self.type_name)
    }
}

impl std::error::Error for TypeMatchError {}

/// A typed failure that was raised out of an [`Outcome`](crate::Outcome) although
/// its error type is not a `std::error::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledFailure<E> {
    error: E,
}

impl<E> UnhandledFailure<E> {
    /// Wrap an error.
    pub fn new(error: E) -> Self {
        UnhandledFailure { error }
    }

    /// Get a reference to the wrapped error.
    pub fn error(&self) -> &E {
        &self.error
    }

    /// Extract the wrapped error.
    pub fn into_error(self) -> E {
        self.error
    }
}

impl<E: fmt::Debug> fmt::Display for UnhandledFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unhandled failure: {:?}", self.error)
    }
}

impl<E: fmt::Debug> std::error::Error for UnhandledFailure<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_display() {
        assert_eq!(
            RuntimeError::MissingEnvironment { expected: "u8" }.to_string(),
            "no environment bound (expected u8)"
        );
        assert_eq!(
            RuntimeError::AlreadyConsumed.to_string(),
            "single-use effect node evaluated more than once"
        );
    }

    #[test]
    fn test_type_match_error_keeps_value() {
        let err = TypeMatchError::new(vec![1, 2]);
        assert!(err.holds::<Vec<i32>>());
        assert_eq!(err.value_ref::<Vec<i32>>(), Some(&vec![1, 2]));
        assert!(err.to_string().starts_with("no type case matched a value of type"));
        assert!(err.type_name().ends_with("Vec<i32>"));
        let value = err.into_value();
        assert_eq!(value.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2]));
    }

    #[test]
    fn test_type_match_error_unwraps_erased_values() {
        let erased: Box<dyn Any + Send> = Box::new(7_u8);
        let err = TypeMatchError::new(erased);
        assert!(err.holds::<u8>());
        assert_eq!(err.type_name(), "<erased>");
        assert_eq!(err.take::<u8>().ok(), Some(7));
    }

    #[test]
    fn test_take_returns_error_on_mismatch() {
        let err = TypeMatchError::new("text");
        let err = err.take::<String>().unwrap_err();
        assert!(err.holds::<&str>());
    }

    #[test]
    fn test_unhandled_failure_display() {
        let err = UnhandledFailure::new("plain");
        assert_eq!(err.to_string(), "unhandled failure: \"plain\"");
        assert_eq!(err.into_error(), "plain");
    }
}
