//! Registration surface populated by the generated registration step.
//!
//! The code-generation collaborator that produces the provider mapping and
//! the injector routines is outside this crate; it hands its output over by
//! implementing [`RegistrationSource`] and filling a [`Bindings`] table set.
//! The container loads the source exactly once, on first use.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::container::Ioc;
use crate::error::{Cause, IocError, IocResult};
use crate::key::Key;

/// Type-erased shared instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Zero-argument singleton accessor for an implementation type.
///
/// The accessor receives the container so a generated implementation can
/// resolve its own dependencies while being constructed.
pub type ProvideFn = Arc<dyn Fn(&Ioc) -> Result<AnyArc, Cause> + Send + Sync>;

/// Type-erased injector routine hosted by a companion type.
pub type InjectFn = Arc<dyn Fn(&Ioc, &mut dyn Any) -> Result<(), Cause> + Send + Sync>;

/// Coercion from an implementation instance to the requested trait object.
pub type CastFn = Arc<dyn Fn(AnyArc) -> Option<AnyArc> + Send + Sync>;

/// Produces the registration tables consumed by [`Ioc`].
///
/// Implemented by the generated registration step; any
/// `Fn(&mut Bindings) + Send + Sync` closure works as a source, which keeps
/// hand-written setup and tests short.
///
/// # Examples
///
/// ```rust
/// use ioc_runtime::{Bindings, Ioc, RegistrationSource};
///
/// struct Clock;
///
/// struct GeneratedRegistrations;
///
/// impl RegistrationSource for GeneratedRegistrations {
///     fn register(&self, bindings: &mut Bindings) {
///         bindings.bind::<Clock, Clock>().provide::<Clock, _>(|_| Clock);
///     }
/// }
///
/// let ioc = Ioc::new(GeneratedRegistrations);
/// let _clock = ioc.resolve::<Clock>().unwrap();
/// ```
pub trait RegistrationSource: Send + Sync {
    /// Registers this source's bindings. Runs at most once per container.
    fn register(&self, bindings: &mut Bindings);
}

impl<F> RegistrationSource for F
where
    F: Fn(&mut Bindings) + Send + Sync,
{
    fn register(&self, bindings: &mut Bindings) {
        self(bindings)
    }
}

/// The registration tables of the core.
///
/// Populated once by a [`RegistrationSource`] and immutable afterwards:
///
/// - provider mapping: requested type → implementation type,
/// - accessor table: implementation type → singleton accessor,
/// - caster table: trait-object requested type → captured unsizing coercion,
/// - parent links: explicit ancestor chain for injection targets,
/// - companion table: target type → the type hosting its injector,
/// - routine table: companion type → the injector routine itself.
///
/// The companion and routine tables are deliberately separate so "companion
/// exists but hosts no routine" stays an observable failure.
#[derive(Default)]
pub struct Bindings {
    pub(crate) providers: HashMap<Key, Key>,
    pub(crate) accessors: HashMap<Key, ProvideFn>,
    pub(crate) casters: HashMap<Key, CastFn>,
    pub(crate) parents: HashMap<Key, Key>,
    pub(crate) companions: HashMap<Key, Key>,
    pub(crate) routines: HashMap<Key, InjectFn>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps requested type `R` to implementation `I`.
    ///
    /// Several requested types may name the same implementation; they all
    /// share its singleton because the cache is keyed by the implementation.
    pub fn bind<R: ?Sized + 'static, I: 'static>(&mut self) -> &mut Self {
        self.providers.insert(Key::of::<R>(), Key::of::<I>());
        self
    }

    /// Maps trait object `R` to implementation `I`, with the unsizing
    /// coercion captured so [`Ioc::resolve_trait`] can hand out `Arc<R>`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ioc_runtime::{Bindings, Ioc};
    ///
    /// trait Logger: Send + Sync {
    ///     fn log(&self, msg: &str);
    /// }
    ///
    /// struct StdoutLogger;
    /// impl Logger for StdoutLogger {
    ///     fn log(&self, msg: &str) {
    ///         println!("{}", msg);
    ///     }
    /// }
    ///
    /// let ioc = Ioc::new(|b: &mut Bindings| {
    ///     b.bind_trait::<dyn Logger, StdoutLogger, _>(|a| a)
    ///         .provide::<StdoutLogger, _>(|_| StdoutLogger);
    /// });
    ///
    /// let logger = ioc.resolve_trait::<dyn Logger>().unwrap();
    /// logger.log("resolved");
    /// ```
    pub fn bind_trait<R, I, F>(&mut self, cast: F) -> &mut Self
    where
        R: ?Sized + Send + Sync + 'static,
        I: Send + Sync + 'static,
        F: Fn(Arc<I>) -> Arc<R> + Send + Sync + 'static,
    {
        self.providers.insert(Key::of::<R>(), Key::of::<I>());
        let caster: CastFn = Arc::new(move |any: AnyArc| {
            let concrete = any.downcast::<I>().ok()?;
            Some(Arc::new(cast(concrete)) as AnyArc)
        });
        self.casters.insert(Key::of::<R>(), caster);
        self
    }

    /// Registers the singleton accessor for implementation `I`.
    ///
    /// The accessor runs at most once for the lifetime of the container,
    /// on the first resolution that reaches `I`.
    pub fn provide<I, F>(&mut self, accessor: F) -> &mut Self
    where
        I: Send + Sync + 'static,
        F: Fn(&Ioc) -> I + Send + Sync + 'static,
    {
        let erased: ProvideFn = Arc::new(move |ioc| Ok(Arc::new(accessor(ioc)) as AnyArc));
        self.accessors.insert(Key::of::<I>(), erased);
        self
    }

    /// Fallible accessor variant for constructors that can fail.
    ///
    /// The error surfaces from [`Ioc::resolve`] as
    /// [`IocError::Construction`](crate::IocError::Construction) with the
    /// original fault attached, and nothing is cached for `I`.
    pub fn try_provide<I, F, E>(&mut self, accessor: F) -> &mut Self
    where
        I: Send + Sync + 'static,
        F: Fn(&Ioc) -> Result<I, E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let erased: ProvideFn = Arc::new(move |ioc| match accessor(ioc) {
            Ok(value) => Ok(Arc::new(value) as AnyArc),
            Err(err) => Err(Arc::new(err) as Cause),
        });
        self.accessors.insert(Key::of::<I>(), erased);
        self
    }

    /// Records `Child`'s direct parent for the ancestor walk.
    ///
    /// The walk follows these links upward until a companion is found or a
    /// type has no parent link, which is the chain's root.
    pub fn extends<Child: 'static, Parent: 'static>(&mut self) -> &mut Self {
        self.parents.insert(Key::of::<Child>(), Key::of::<Parent>());
        self
    }

    /// Declares `Companion` as the injector host for `Target`.
    pub fn companion<Target: 'static, Companion: 'static>(&mut self) -> &mut Self {
        self.companions
            .insert(Key::of::<Target>(), Key::of::<Companion>());
        self
    }

    /// Registers the injector routine hosted by `Companion`, accepting
    /// exactly one mutable `Target`.
    ///
    /// Invoking the routine with a value that is not a `Target` is an
    /// invocation fault, surfaced as
    /// [`IocError::Injection`](crate::IocError::Injection).
    pub fn routine<Companion, Target, F>(&mut self, routine: F) -> &mut Self
    where
        Companion: 'static,
        Target: 'static,
        F: Fn(&Ioc, &mut Target) -> IocResult<()> + Send + Sync + 'static,
    {
        let erased: InjectFn = Arc::new(move |ioc, any| {
            let target = any.downcast_mut::<Target>().ok_or_else(|| {
                Arc::new(IocError::ImplementationMismatch(std::any::type_name::<Target>()))
                    as Cause
            })?;
            routine(ioc, target).map_err(|err| Arc::new(err) as Cause)
        });
        self.routines.insert(Key::of::<Companion>(), erased);
        self
    }

    /// Raw routine registration for companions whose generated routine
    /// dispatches on the erased value itself, e.g. one routine serving
    /// several concrete descendants of the hosting type.
    pub fn routine_raw<Companion: 'static>(&mut self, routine: InjectFn) -> &mut Self {
        self.routines.insert(Key::of::<Companion>(), routine);
        self
    }
}
