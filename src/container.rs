//! The container: load gate, provider resolution, shared caches.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;

use crate::error::{IocError, IocResult};
use crate::key::Key;
use crate::metrics::{Counters, IocStats};
use crate::registration::{AnyArc, Bindings, InjectFn, RegistrationSource};
use crate::singletons::SingletonCache;

/// Resolution-and-caching core over a generated registration table.
///
/// An `Ioc` owns the provider mapping, the singleton cache, and the injector
/// caches. The registration source runs once, on the first `resolve` or
/// `inject`; after that the mapping is immutable and only the caches mutate.
///
/// # Thread safety
///
/// Every operation takes `&self`, the container is `Send + Sync`, and
/// cloning is cheap (`Arc` internally), so one container can be shared
/// across threads freely. Concurrent first resolutions of one key run its
/// accessor exactly once; concurrent first callers of the load gate block
/// until the single population run finishes.
///
/// # Examples
///
/// ```rust
/// use ioc_runtime::{Bindings, Ioc};
/// use std::sync::Arc;
///
/// struct Config {
///     url: String,
/// }
///
/// struct Repo {
///     config: Arc<Config>,
/// }
///
/// let ioc = Ioc::new(|b: &mut Bindings| {
///     b.bind::<Config, Config>().provide::<Config, _>(|_| Config {
///         url: "postgres://localhost".to_string(),
///     });
///     b.bind::<Repo, Repo>().provide::<Repo, _>(|ioc| Repo {
///         config: ioc.resolve::<Config>().unwrap(),
///     });
/// });
///
/// let repo = ioc.resolve::<Repo>().unwrap();
/// assert_eq!(repo.config.url, "postgres://localhost");
///
/// // Same instance on every resolution.
/// let again = ioc.resolve::<Repo>().unwrap();
/// assert!(Arc::ptr_eq(&repo, &again));
/// ```
pub struct Ioc {
    inner: Arc<IocInner>,
}

pub(crate) struct IocInner {
    source: Box<dyn RegistrationSource>,
    bindings: OnceCell<Bindings>,
    singletons: SingletonCache,
    pub(crate) injector_map: RwLock<HashMap<Key, Key>>,
    pub(crate) routine_cache: RwLock<HashMap<Key, InjectFn>>,
    pub(crate) counters: Counters,
}

impl Ioc {
    /// Creates a container over the given registration source.
    ///
    /// Nothing is loaded or constructed here; the source runs on the first
    /// resolution or injection.
    pub fn new<S: RegistrationSource + 'static>(source: S) -> Self {
        Self {
            inner: Arc::new(IocInner {
                source: Box::new(source),
                bindings: OnceCell::new(),
                singletons: SingletonCache::new(),
                injector_map: RwLock::new(HashMap::new()),
                routine_cache: RwLock::new(HashMap::new()),
                counters: Counters::default(),
            }),
        }
    }

    /// Forces the one-time registration load.
    ///
    /// Concurrent first callers block until the single population run
    /// finishes; every later call is a plain read.
    pub(crate) fn bindings(&self) -> &Bindings {
        self.inner.bindings.get_or_init(|| {
            let mut bindings = Bindings::new();
            self.inner.source.register(&mut bindings);
            bindings
        })
    }

    /// Resolves the shared instance registered for concrete type `T`.
    ///
    /// The requested key is looked up in the provider mapping; the singleton
    /// cache is keyed by the *implementation* it names, so several requested
    /// types bound to one implementation share a single instance and its
    /// accessor runs at most once regardless of call count.
    ///
    /// An accessor that resolves its own key deadlocks on its own holder;
    /// validating the generated mapping for cycles is out of scope here.
    ///
    /// # Errors
    ///
    /// [`IocError::NoProvider`] if `T` has no mapping,
    /// [`IocError::MissingAccessor`] if the mapped implementation has no
    /// registered accessor, [`IocError::Construction`] if the accessor
    /// fails, and [`IocError::ImplementationMismatch`] if the constructed
    /// value is not a `T`.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> IocResult<Arc<T>> {
        let requested = Key::of::<T>();
        let raw = self.resolve_key(requested)?;
        raw.downcast::<T>()
            .map_err(|_| IocError::ImplementationMismatch(requested.name()))
    }

    /// Resolves the shared instance registered for trait object `T`.
    ///
    /// Requires the binding to have been made with
    /// [`Bindings::bind_trait`], which captures the unsizing coercion.
    pub fn resolve_trait<T: ?Sized + Send + Sync + 'static>(&self) -> IocResult<Arc<T>> {
        let requested = Key::of::<T>();
        let raw = self.resolve_key(requested)?;
        let caster = self
            .bindings()
            .casters
            .get(&requested)
            .cloned()
            .ok_or(IocError::ImplementationMismatch(requested.name()))?;
        let wrapped = caster(raw).ok_or(IocError::ImplementationMismatch(requested.name()))?;
        let handle = wrapped
            .downcast::<Arc<T>>()
            .map_err(|_| IocError::ImplementationMismatch(requested.name()))?;
        Ok((*handle).clone())
    }

    /// Key-indexed resolution for generated code that works with erased
    /// keys. Returns the raw implementation instance.
    pub fn resolve_key(&self, requested: Key) -> IocResult<AnyArc> {
        let bindings = self.bindings();
        let impl_key = *bindings
            .providers
            .get(&requested)
            .ok_or(IocError::NoProvider(requested.name()))?;

        if let Some(cached) = self.inner.singletons.get(&impl_key) {
            self.inner.counters.singleton_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached);
        }

        let accessor = bindings
            .accessors
            .get(&impl_key)
            .cloned()
            .ok_or(IocError::MissingAccessor(impl_key.name()))?;

        let counters = &self.inner.counters;
        self.inner
            .singletons
            .get_or_try_init(impl_key, || {
                counters.constructions.fetch_add(1, Ordering::Relaxed);
                accessor(self)
            })
            .map_err(|cause| IocError::Construction(impl_key.name(), cause))
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> IocStats {
        IocStats {
            constructions: self.inner.counters.constructions.load(Ordering::Relaxed),
            singleton_hits: self.inner.counters.singleton_hits.load(Ordering::Relaxed),
            companion_walks: self.inner.counters.companion_walks.load(Ordering::Relaxed),
            routine_bindings: self.inner.counters.routine_bindings.load(Ordering::Relaxed),
            cached_singletons: self.inner.singletons.constructed_len(),
        }
    }

    pub(crate) fn inner(&self) -> &IocInner {
        &self.inner
    }
}

impl Clone for Ioc {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
