//! Type keys for registry and cache lookup.

use std::any::TypeId;
use std::fmt;

/// Identifies a type in the provider and injector tables.
///
/// A key pairs the `TypeId` used for lookup with the type's name, carried
/// only for diagnostics. Equality and hashing consider the `TypeId` alone,
/// so two keys for the same type always collide regardless of how they were
/// produced.
///
/// # Examples
///
/// ```rust
/// use ioc_runtime::Key;
///
/// struct Database;
///
/// let a = Key::of::<Database>();
/// let b = Key::of::<Database>();
/// assert_eq!(a, b);
/// assert!(a.name().ends_with("Database"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Key for `T`. `T: ?Sized` so trait objects can be requested types.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type name carried for error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// Hot path: TypeId-only comparison, the name is diagnostic payload.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
