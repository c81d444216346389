//! Diagnostic observers for resolution traceability.
//!
//! This module provides hooks for observing container events, enabling
//! structured tracing, performance monitoring, and debugging of resolution
//! behavior without coupling the core to any logging backend.

use std::sync::Arc;
use std::time::Duration;

use crate::key::ServiceKey;

/// Observer trait for container resolution events.
///
/// Observers track what is being resolved, timing information, construction
/// failures, and scope lifecycle. Calls are made synchronously during
/// resolution; keep implementations lightweight.
///
/// # Examples
///
/// ```rust
/// use forge_di::{DiObserver, ServiceKey};
/// use std::time::Duration;
///
/// struct TracingObserver {
///     trace_id: String,
/// }
///
/// impl DiObserver for TracingObserver {
///     fn resolving(&self, key: &ServiceKey) {
///         println!("[{}] Resolving: {}", self.trace_id, key);
///     }
///
///     fn resolved(&self, key: &ServiceKey, duration: Duration) {
///         println!("[{}] Resolved: {} in {:?}", self.trace_id, key, duration);
///     }
///
///     fn construction_failed(&self, key: &ServiceKey, message: &str) {
///         println!("[{}] FAILED {}: {}", self.trace_id, key, message);
///     }
/// }
/// ```
pub trait DiObserver: Send + Sync {
    /// Called when starting to resolve a service, before any construction.
    fn resolving(&self, key: &ServiceKey);

    /// Called when a service resolved successfully.
    ///
    /// `duration` is the time elapsed from `resolving`, including dependency
    /// resolution and construction (or nothing but a cache hit).
    fn resolved(&self, key: &ServiceKey, duration: Duration);

    /// Called when resolution failed; the error still propagates afterwards.
    fn construction_failed(&self, key: &ServiceKey, message: &str);

    /// Called when a scope is begun.
    fn scope_began(&self, scope_id: &str) {
        let _ = scope_id;
    }

    /// Called when a scope is disposed.
    fn scope_disposed(&self, scope_id: &str) {
        let _ = scope_id;
    }
}

/// Observer that writes container events to stderr.
///
/// # Examples
///
/// ```rust
/// use forge_di::{ConstructorRegistry, Container, LoggingObserver, Observers, ResolutionPlan};
/// use std::sync::Arc;
///
/// let mut observers = Observers::new();
/// observers.add(Arc::new(LoggingObserver::new()));
///
/// let container = Container::build_with_observers(
///     ResolutionPlan::build(Vec::new()).unwrap(),
///     ConstructorRegistry::new(),
///     observers,
/// ).unwrap();
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// An observer with the default `forge-di` prefix.
    pub fn new() -> Self {
        Self::with_prefix("forge-di")
    }

    /// An observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &ServiceKey) {
        eprintln!("[{}] Resolving: {}", self.prefix, key);
    }

    fn resolved(&self, key: &ServiceKey, duration: Duration) {
        eprintln!("[{}] Resolved: {} in {:?}", self.prefix, key, duration);
    }

    fn construction_failed(&self, key: &ServiceKey, message: &str) {
        eprintln!("[{}] Construction failed: {}: {}", self.prefix, key, message);
    }

    fn scope_began(&self, scope_id: &str) {
        eprintln!("[{}] Scope began: {}", self.prefix, scope_id);
    }

    fn scope_disposed(&self, scope_id: &str) {
        eprintln!("[{}] Scope disposed: {}", self.prefix, scope_id);
    }
}

/// The set of observers attached to a container.
#[derive(Clone, Default)]
pub struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    /// An empty observer set.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Attaches an observer.
    pub fn add(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.push(observer);
        self
    }

    /// Fast-path check so observer-free resolution pays nothing.
    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn resolving(&self, key: &ServiceKey) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    pub(crate) fn resolved(&self, key: &ServiceKey, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    pub(crate) fn construction_failed(&self, key: &ServiceKey, message: &str) {
        for observer in &self.observers {
            observer.construction_failed(key, message);
        }
    }

    pub(crate) fn scope_began(&self, scope_id: &str) {
        for observer in &self.observers {
            observer.scope_began(scope_id);
        }
    }

    pub(crate) fn scope_disposed(&self, scope_id: &str) {
        for observer in &self.observers {
            observer.scope_disposed(scope_id);
        }
    }
}
