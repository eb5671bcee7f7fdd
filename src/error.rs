//! Error types for the resolution and injection core.

use std::fmt;
use std::sync::Arc;

/// Underlying fault attached to a wrapping error variant.
///
/// Construction and invocation failures keep the original error alive so
/// callers can walk the causal chain through [`std::error::Error::source`].
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by [`resolve`](crate::Ioc::resolve) and
/// [`inject`](crate::Ioc::inject).
///
/// All of these indicate missing or malformed generated registration, not
/// transient conditions; nothing is retried internally and no failure is
/// partially applied. The variants group into the three families exposed by
/// [`kind`](IocError::kind).
///
/// # Examples
///
/// ```rust
/// use ioc_runtime::{Bindings, Ioc, IocError};
///
/// struct Unregistered;
///
/// let ioc = Ioc::new(|_: &mut Bindings| {});
/// let err = ioc.resolve::<Unregistered>().err().expect("nothing registered");
/// match err {
///     IocError::NoProvider(name) => assert!(name.contains("Unregistered")),
///     _ => panic!("expected NoProvider"),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum IocError {
    /// No provider registered for the requested type.
    NoProvider(&'static str),
    /// A provider mapping names this implementation, but no singleton
    /// accessor was registered for it.
    MissingAccessor(&'static str),
    /// The implementation's accessor failed while constructing the singleton.
    Construction(&'static str, Cause),
    /// The registered value is not of the type the caller asked for.
    ImplementationMismatch(&'static str),
    /// No companion injector found anywhere in the target's ancestor chain.
    InjectorNotFound(&'static str),
    /// A companion was located for the target, but it hosts no routine.
    RoutineMissing(&'static str, &'static str),
    /// The injector routine was found and invoked, and the invocation failed.
    Injection(&'static str, Cause),
}

/// The three error families of the core, for callers that match on the
/// taxonomy rather than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `resolve` failed: missing mapping, missing accessor, or a
    /// construction fault.
    Resolution,
    /// `inject` failed before any routine ran: no companion, or a companion
    /// without the expected routine.
    InjectorNotFound,
    /// `inject` located and invoked the routine and the invocation failed.
    Injection,
}

impl IocError {
    /// The family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IocError::NoProvider(_)
            | IocError::MissingAccessor(_)
            | IocError::Construction(_, _)
            | IocError::ImplementationMismatch(_) => ErrorKind::Resolution,
            IocError::InjectorNotFound(_) | IocError::RoutineMissing(_, _) => {
                ErrorKind::InjectorNotFound
            }
            IocError::Injection(_, _) => ErrorKind::Injection,
        }
    }
}

impl fmt::Display for IocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IocError::NoProvider(name) => {
                write!(f, "No provider registered for: {}", name)
            }
            IocError::MissingAccessor(name) => {
                write!(f, "No singleton accessor registered for: {}", name)
            }
            IocError::Construction(name, cause) => {
                write!(f, "Constructing {} failed: {}", name, cause)
            }
            IocError::ImplementationMismatch(name) => {
                write!(f, "Registered value for {} has an unexpected type", name)
            }
            IocError::InjectorNotFound(name) => {
                write!(f, "No injector found in the ancestor chain of: {}", name)
            }
            IocError::RoutineMissing(target, companion) => {
                write!(f, "Companion {} hosts no routine for: {}", companion, target)
            }
            IocError::Injection(name, cause) => {
                write!(f, "Injecting {} failed: {}", name, cause)
            }
        }
    }
}

impl std::error::Error for IocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IocError::Construction(_, cause) | IocError::Injection(_, cause) => {
                Some(&**cause as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// Result type for core operations.
pub type IocResult<T> = Result<T, IocError>;
