//! Injector lookup: ancestor walk, companion cache, routine cache.

use std::any::Any;
use std::sync::atomic::Ordering;

use crate::container::Ioc;
use crate::error::{IocError, IocResult};
use crate::key::Key;
use crate::registration::{Bindings, InjectFn};

impl Ioc {
    /// Runs the injector routine registered for `target`'s concrete type.
    ///
    /// The walk starts at the target's own type and follows the registered
    /// parent links upward until a companion is found. The companion is
    /// cached under the *original* concrete type, so each concrete type pays
    /// the walk at most once even when the match sits several levels up.
    /// The routine handle itself is cached per companion.
    ///
    /// On success the routine has mutated `target` in place; on any failure
    /// before the invocation no injection has happened.
    ///
    /// # Errors
    ///
    /// [`IocError::InjectorNotFound`] if the chain is exhausted without a
    /// companion, [`IocError::RoutineMissing`] if the companion hosts no
    /// routine, and [`IocError::Injection`] wrapping the cause if the
    /// routine itself fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ioc_runtime::{Bindings, Ioc};
    ///
    /// #[derive(Default)]
    /// struct Screen {
    ///     title: Option<String>,
    /// }
    ///
    /// struct ScreenInjector;
    ///
    /// let ioc = Ioc::new(|b: &mut Bindings| {
    ///     b.companion::<Screen, ScreenInjector>()
    ///         .routine::<ScreenInjector, Screen, _>(|_, screen| {
    ///             screen.title = Some("main".to_string());
    ///             Ok(())
    ///         });
    /// });
    ///
    /// let mut screen = Screen::default();
    /// ioc.inject(&mut screen).unwrap();
    /// assert_eq!(screen.title.as_deref(), Some("main"));
    /// ```
    pub fn inject<T: 'static>(&self, target: &mut T) -> IocResult<()> {
        let key = Key::of::<T>();
        let routine = self.injector_for(key)?;
        routine(self, target as &mut dyn Any)
            .map_err(|cause| IocError::Injection(key.name(), cause))
    }

    /// Locates the bound routine for a concrete target key, through both
    /// caches.
    fn injector_for(&self, target: Key) -> IocResult<InjectFn> {
        let bindings = self.bindings();

        let companion = self.inner().injector_map.read().unwrap().get(&target).copied();
        let companion = match companion {
            Some(companion) => companion,
            None => {
                let found = self.walk_ancestors(bindings, target)?;
                // A failed walk never reaches this insert, so failure is
                // not cached as success.
                self.inner()
                    .injector_map
                    .write()
                    .unwrap()
                    .insert(target, found);
                found
            }
        };

        if let Some(routine) = self.inner().routine_cache.read().unwrap().get(&companion) {
            return Ok(routine.clone());
        }

        let routine = bindings
            .routines
            .get(&companion)
            .cloned()
            .ok_or(IocError::RoutineMissing(target.name(), companion.name()))?;
        self.inner()
            .counters
            .routine_bindings
            .fetch_add(1, Ordering::Relaxed);
        self.inner()
            .routine_cache
            .write()
            .unwrap()
            .entry(companion)
            .or_insert_with(|| routine.clone());
        Ok(routine)
    }

    /// Walks the target's ancestor chain for the nearest companion.
    fn walk_ancestors(&self, bindings: &Bindings, target: Key) -> IocResult<Key> {
        self.inner()
            .counters
            .companion_walks
            .fetch_add(1, Ordering::Relaxed);
        let mut current = target;
        loop {
            if let Some(companion) = bindings.companions.get(&current) {
                return Ok(*companion);
            }
            match bindings.parents.get(&current) {
                Some(parent) => current = *parent,
                // No parent link: the chain's root, nothing matched.
                None => return Err(IocError::InjectorNotFound(target.name())),
            }
        }
    }
}
