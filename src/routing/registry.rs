//! Route registry and resolution.
//!
//! # Responsibilities
//! - Store, per method, the ordered route patterns with their adapters and mergers
//! - Resolve the deduplicated adapter set for a method and path
//! - Resolve the single merger for a method and path
//!
//! # Design Decisions
//! - Built once at startup, then shared read-only behind an `Arc` (no locks)
//! - Entries are only ever appended; registration order decides merger precedence
//! - A pattern registered twice shares one entry, compared by source string
//! - O(n) pattern scan per lookup (fine for typical route counts)

use std::collections::HashSet;

use crate::dispatch::{AdapterRef, MergerRef};
use crate::error::{DispatchError, RegistrationError};
use crate::routing::matcher::{Matcher, RoutePattern};
use crate::routing::Method;

/// A candidate for registration.
#[derive(Debug, Clone)]
pub enum Registration {
    Adapter(AdapterRef),
    Merger(MergerRef),
}

#[derive(Debug)]
struct RouteEntry<T> {
    pattern: RoutePattern,
    items: Vec<T>,
}

/// Per-method ordered list of route entries.
#[derive(Debug)]
struct MethodTable<T> {
    slots: [Vec<RouteEntry<T>>; 5],
}

impl<T> Default for MethodTable<T> {
    fn default() -> Self {
        Self {
            slots: Default::default(),
        }
    }
}

impl<T: Clone> MethodTable<T> {
    fn append(&mut self, method: Method, pattern: &RoutePattern, item: T) {
        let entries = &mut self.slots[method.index()];
        match entries.iter_mut().find(|e| e.pattern == *pattern) {
            Some(entry) => entry.items.push(item),
            None => entries.push(RouteEntry {
                pattern: pattern.clone(),
                items: vec![item],
            }),
        }
    }

    /// Entries for `method` whose pattern matches `path`, in registration order.
    fn matching<'a>(&'a self, method: Method, path: &'a str) -> impl Iterator<Item = &'a RouteEntry<T>> + 'a {
        self.slots[method.index()]
            .iter()
            .filter(move |e| e.pattern.matches(path))
    }

    fn len(&self) -> usize {
        self.slots
            .iter()
            .flat_map(|entries| entries.iter())
            .map(|e| e.items.len())
            .sum()
    }
}

/// Maps routes to the adapters and mergers registered for them.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    adapters: MethodTable<AdapterRef>,
    mergers: MethodTable<MergerRef>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter or merger for a regex route.
    ///
    /// An empty `methods` slice registers under every method. An invalid pattern
    /// fails with `InvalidRegistration` and leaves the registry unchanged.
    pub fn register(
        &mut self,
        registration: Registration,
        route: &str,
        methods: &[Method],
    ) -> Result<(), RegistrationError> {
        let pattern = RoutePattern::regex(route).map_err(|e| {
            RegistrationError::InvalidRegistration {
                route: route.to_string(),
                reason: e.to_string(),
            }
        })?;
        self.register_pattern(registration, &pattern, methods);
        Ok(())
    }

    fn register_pattern(
        &mut self,
        registration: Registration,
        pattern: &RoutePattern,
        methods: &[Method],
    ) {
        let methods = if methods.is_empty() {
            &Method::ALL[..]
        } else {
            methods
        };

        for &method in methods {
            match &registration {
                Registration::Adapter(a) => self.adapters.append(method, pattern, a.clone()),
                Registration::Merger(m) => self.mergers.append(method, pattern, m.clone()),
            }
        }
    }

    pub fn register_adapter(
        &mut self,
        adapter: AdapterRef,
        route: &str,
        methods: &[Method],
    ) -> Result<(), RegistrationError> {
        self.register(Registration::Adapter(adapter), route, methods)
    }

    pub fn register_merger(
        &mut self,
        merger: MergerRef,
        route: &str,
        methods: &[Method],
    ) -> Result<(), RegistrationError> {
        self.register(Registration::Merger(merger), route, methods)
    }

    /// Union of the adapters of every matching pattern, without duplicates.
    ///
    /// Returned in first-seen order, though callers must not rely on it.
    pub fn resolve_adapters(&self, method: Method, path: &str) -> Vec<AdapterRef> {
        let mut seen = HashSet::new();
        self.adapters
            .matching(method, path)
            .flat_map(|entry| entry.items.iter())
            .filter(|adapter| seen.insert((*adapter).clone()))
            .cloned()
            .collect()
    }

    /// First merger of the earliest registered matching pattern.
    pub fn resolve_merger(&self, method: Method, path: &str) -> Result<MergerRef, DispatchError> {
        self.mergers
            .matching(method, path)
            .next()
            .and_then(|entry| entry.items.first())
            .cloned()
            .ok_or_else(|| DispatchError::NoMergerFound {
                method,
                path: path.to_string(),
            })
    }

    /// Number of adapter registrations across all methods and routes.
    pub fn adapter_registrations(&self) -> usize {
        self.adapters.len()
    }

    pub fn merger_registrations(&self) -> usize {
        self.mergers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapter_registrations() == 0 && self.merger_registrations() == 0
    }
}
