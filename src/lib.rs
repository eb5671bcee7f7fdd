//! # ioc-runtime
//!
//! The resolution-and-caching core of a generated dependency-injection
//! system: given a requested type it locates the registered implementation,
//! lazily constructs (or retrieves) its singleton, and performs field
//! injection on arbitrary targets by locating the nearest injector routine
//! in the target's registered ancestor chain.
//!
//! The mapping itself — which implementation satisfies which type, which
//! companion hosts which injector — is produced by an external
//! code-generation step. That step hands its output over as a
//! [`RegistrationSource`]; this crate only consumes the tables, with two
//! guarantees doing the heavy lifting:
//!
//! - **At most one construction per implementation**, ever, even under
//!   concurrent first resolutions. The cache is keyed by the implementation,
//!   not the request, so two requested types bound to one implementation
//!   share its instance.
//! - **At most one ancestor walk per concrete target type.** The companion
//!   found for a target is cached under the target's own type, and the
//!   routine handle is cached per companion.
//!
//! ## Quick start
//!
//! ```rust
//! use ioc_runtime::{Bindings, Ioc};
//! use std::sync::Arc;
//!
//! // Application types.
//! struct Database {
//!     url: String,
//! }
//!
//! #[derive(Default)]
//! struct Session {
//!     db: Option<Arc<Database>>,
//! }
//!
//! // Companion emitted by the generation step.
//! struct SessionInjector;
//!
//! // The generated registration step, here written by hand.
//! let ioc = Ioc::new(|b: &mut Bindings| {
//!     b.bind::<Database, Database>().provide::<Database, _>(|_| Database {
//!         url: "postgres://localhost".to_string(),
//!     });
//!     b.companion::<Session, SessionInjector>()
//!         .routine::<SessionInjector, Session, _>(|ioc, session| {
//!             session.db = Some(ioc.resolve::<Database>()?);
//!             Ok(())
//!         });
//! });
//!
//! // Resolution: one shared instance per implementation.
//! let db = ioc.resolve::<Database>().unwrap();
//! assert!(Arc::ptr_eq(&db, &ioc.resolve::<Database>().unwrap()));
//!
//! // Injection: mutates the target in place.
//! let mut session = Session::default();
//! ioc.inject(&mut session).unwrap();
//! assert_eq!(session.db.as_ref().unwrap().url, "postgres://localhost");
//! ```
//!
//! ## Errors
//!
//! Every failure is terminal for its operation and carries the original
//! fault where one exists; see [`IocError`] for the taxonomy. All of them
//! mean missing or malformed generated registration — retrying is never
//! appropriate.

pub mod container;
pub mod error;
pub mod key;
pub mod metrics;
pub mod registration;

mod injector;
mod singletons;

pub use container::Ioc;
pub use error::{Cause, ErrorKind, IocError, IocResult};
pub use key::Key;
pub use metrics::IocStats;
pub use registration::{AnyArc, Bindings, CastFn, InjectFn, ProvideFn, RegistrationSource};
