//! Counters for cache effectiveness and discovery work.

use std::sync::atomic::AtomicU64;

/// Internal counters, bumped on the resolution and injection paths.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) constructions: AtomicU64,
    pub(crate) singleton_hits: AtomicU64,
    pub(crate) companion_walks: AtomicU64,
    pub(crate) routine_bindings: AtomicU64,
}

/// Snapshot of a container's cache counters, taken with
/// [`Ioc::stats`](crate::Ioc::stats).
///
/// The counters make the memoization contracts observable: after the first
/// resolution of a key, `constructions` stays flat while `singleton_hits`
/// grows, and a repeated injection for the same concrete type must not grow
/// `companion_walks`.
///
/// # Examples
///
/// ```rust
/// use ioc_runtime::{Bindings, Ioc};
///
/// struct Repo;
///
/// let ioc = Ioc::new(|b: &mut Bindings| {
///     b.bind::<Repo, Repo>().provide::<Repo, _>(|_| Repo);
/// });
///
/// let _ = ioc.resolve::<Repo>().unwrap();
/// let _ = ioc.resolve::<Repo>().unwrap();
///
/// let stats = ioc.stats();
/// assert_eq!(stats.constructions, 1);
/// assert_eq!(stats.singleton_hits, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IocStats {
    /// Singleton accessors run; exactly one per constructed implementation.
    pub constructions: u64,
    /// Resolutions served from an already constructed holder.
    pub singleton_hits: u64,
    /// Ancestor-chain walks performed by `inject`.
    pub companion_walks: u64,
    /// Routine handles bound into the routine cache.
    pub routine_bindings: u64,
    /// Implementation keys currently holding a constructed instance.
    pub cached_singletons: usize,
}

impl IocStats {
    /// Share of singleton resolutions served from the cache.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.constructions + self.singleton_hits;
        if total == 0 {
            0.0
        } else {
            self.singleton_hits as f64 / total as f64
        }
    }
}
