//! Adapter and merger capabilities.
//!
//! # Responsibilities
//! - Define the `Adapter` and `Merger` contracts the registry accepts
//! - Give registered values an identity usable for deduplication and as map keys
//! - Offer closure-backed implementations for small, stateless capabilities
//!
//! # Design Decisions
//! - The capability check is the trait bound; there is nothing left to verify at runtime
//! - Adapters and mergers are built once at registration and shared behind `Arc`
//! - Identity is the allocation, not the name: two adapters with the same name stay distinct

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::http::{RequestEnvelope, ResponseTriple};

/// Turns a request envelope into one backend response.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Name used in logs, metrics and by mergers to find this adapter's responses.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn handle(&self, request: &RequestEnvelope) -> Result<ResponseTriple, BoxError>;
}

/// Composes the final response from the collected adapter responses.
#[async_trait]
pub trait Merger: Send + Sync + 'static {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn merge(
        &self,
        request: &RequestEnvelope,
        responses: ResponseCollection,
    ) -> Result<ResponseTriple, BoxError>;
}

/// Shared handle to a registered adapter. Equality and hashing follow the allocation.
#[derive(Clone)]
pub struct AdapterRef(Arc<dyn Adapter>);

impl AdapterRef {
    pub fn new<A: Adapter>(adapter: A) -> Self {
        Self(Arc::new(adapter))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub(crate) fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.0
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for AdapterRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for AdapterRef {}

impl Hash for AdapterRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for AdapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AdapterRef").field(&self.name()).finish()
    }
}

/// Shared handle to a registered merger.
#[derive(Clone)]
pub struct MergerRef(Arc<dyn Merger>);

impl MergerRef {
    pub fn new<M: Merger>(merger: M) -> Self {
        Self(Arc::new(merger))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub(crate) fn merger(&self) -> &Arc<dyn Merger> {
        &self.0
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for MergerRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for MergerRef {}

impl fmt::Debug for MergerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MergerRef").field(&self.name()).finish()
    }
}

/// Responses gathered during one dispatch, keyed by adapter.
///
/// Each resolved adapter runs exactly once per dispatch, so every value holds a
/// single response today. Entries keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct ResponseCollection {
    entries: Vec<(AdapterRef, Vec<ResponseTriple>)>,
    index: HashMap<AdapterRef, usize>,
}

impl ResponseCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a response to the adapter's sequence.
    pub fn push(&mut self, adapter: AdapterRef, response: ResponseTriple) {
        match self.index.get(&adapter) {
            Some(&slot) => self.entries[slot].1.push(response),
            None => {
                self.index.insert(adapter.clone(), self.entries.len());
                self.entries.push((adapter, vec![response]));
            }
        }
    }

    pub fn get(&self, adapter: &AdapterRef) -> Option<&[ResponseTriple]> {
        self.index
            .get(adapter)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Responses of every adapter registered under `name`.
    pub fn by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ResponseTriple> + 'a {
        self.entries
            .iter()
            .filter(move |(adapter, _)| adapter.name() == name)
            .flat_map(|(_, responses)| responses.iter())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&AdapterRef, &[ResponseTriple])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Entries sorted by adapter name, for mergers that need a stable order.
    /// Adapters sharing a name keep their insertion order.
    pub fn sorted_by_name(&self) -> Vec<(&AdapterRef, &[ResponseTriple])> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.name().cmp(b.0.name()));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Adapter backed by a closure.
///
/// The closure borrows the envelope only while building its future, so it clones
/// whatever the future needs.
pub struct FnAdapter<F> {
    name: String,
    handler: F,
}

impl<F, Fut> FnAdapter<F>
where
    F: Fn(&RequestEnvelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ResponseTriple, BoxError>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F, Fut> Adapter for FnAdapter<F>
where
    F: Fn(&RequestEnvelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ResponseTriple, BoxError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, request: &RequestEnvelope) -> Result<ResponseTriple, BoxError> {
        (self.handler)(request).await
    }
}

/// Merger backed by a closure.
pub struct FnMerger<F> {
    name: String,
    merger: F,
}

impl<F, Fut> FnMerger<F>
where
    F: Fn(&RequestEnvelope, ResponseCollection) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ResponseTriple, BoxError>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, merger: F) -> Self {
        Self {
            name: name.into(),
            merger,
        }
    }
}

#[async_trait]
impl<F, Fut> Merger for FnMerger<F>
where
    F: Fn(&RequestEnvelope, ResponseCollection) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ResponseTriple, BoxError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn merge(
        &self,
        request: &RequestEnvelope,
        responses: ResponseCollection,
    ) -> Result<ResponseTriple, BoxError> {
        (self.merger)(request, responses).await
    }
}
