//! Logical call contexts and scope handles.
//!
//! A [`CallContext`] is the explicit "current call context" threaded through
//! resolution: it owns the ordered stack of scopes its callers began.
//! Cloning a context shares the stack; that is how the active scope
//! propagates into child tasks and continuations of the same logical
//! context. Contexts created with
//! [`Container::new_context`](super::Container::new_context) are isolated
//! from one another.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::scope::{ScopeRef, ScopeState};
use super::ContainerCore;

/// A logical call context: the unit of scope-stack isolation.
///
/// All `resolve*` traffic goes through a context. Scoped services cache into
/// the context's innermost live scope; with no live scope the container's
/// root scope is used. The stack lock is held only for O(1) bookkeeping,
/// never across service construction.
///
/// # Examples
///
/// ```rust
/// use forge_di::{
///     ConstructorRegistry, Container, Lifetime, ResolutionPlan, Resolver,
///     ServiceDescriptor, TypeDescriptor,
/// };
/// use std::sync::Arc;
///
/// struct Session;
///
/// let session = TypeDescriptor::new("app.Session");
/// let plan = ResolutionPlan::build(vec![
///     ServiceDescriptor::new(session.clone(), session.clone(), Lifetime::Scoped),
/// ]).unwrap();
/// let mut ctors = ConstructorRegistry::new();
/// ctors.register::<Session, _>("app.Session", |_| Ok(Session));
/// let container = Container::build(plan, ctors).unwrap();
///
/// // Two isolated contexts never see each other's scopes.
/// let ctx_a = container.new_context();
/// let ctx_b = container.new_context();
///
/// let scope_a = ctx_a.begin_scope();
/// let in_a = ctx_a.resolve::<Session>(&session).unwrap().unwrap();
/// let in_b = ctx_b.resolve::<Session>(&session).unwrap().unwrap();
/// assert!(!Arc::ptr_eq(&in_a, &in_b)); // b resolved from the root scope
/// scope_a.dispose();
/// ```
#[derive(Clone)]
pub struct CallContext {
    pub(crate) core: Arc<ContainerCore>,
    pub(crate) stack: Arc<Mutex<Vec<Option<ScopeRef>>>>,
}

impl CallContext {
    pub(crate) fn new(core: Arc<ContainerCore>) -> Self {
        Self {
            core,
            stack: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Begins a new scope and pushes it onto this context's stack.
    ///
    /// The returned handle owns the scope; dropping it without calling
    /// [`ScopeHandle::dispose`] abandons the scope, which is pruned lazily
    /// by later active-scope lookups.
    pub fn begin_scope(&self) -> ScopeHandle {
        let state = Arc::new(ScopeState::fresh());
        let scope_ref = self.core.arena.insert(&state);
        let index = {
            let mut stack = self.stack.lock();
            stack.push(Some(scope_ref));
            stack.len() - 1
        };
        self.core.observers.scope_began(&state.id);
        ScopeHandle {
            ctx: self.clone(),
            state,
            scope_ref,
            index,
        }
    }

    /// The innermost live scope, falling back to the root scope.
    ///
    /// Scans most-recent-first, tombstoning dead entries encountered and
    /// popping tombstones off the top of the stack.
    pub(crate) fn active_scope(&self) -> Arc<ScopeState> {
        let mut found = None;
        {
            let mut stack = self.stack.lock();
            let mut i = stack.len();
            while i > 0 {
                i -= 1;
                if let Some(scope_ref) = stack[i] {
                    if let Some(scope) = self.core.arena.upgrade(scope_ref) {
                        found = Some(scope);
                        break;
                    }
                    stack[i] = None;
                }
            }
            while stack.last().map_or(false, Option::is_none) {
                stack.pop();
            }
        }
        found.unwrap_or_else(|| self.core.root.clone())
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallContext(depth {})", self.stack.lock().len())
    }
}

/// Disposal handle for a begun scope.
///
/// The handle owns the scope's state; its cache is torn down exactly once,
/// when the last reference drops after disposal. Disposal removes the stack
/// entry by its tracked index rather than scanning, and releasing the arena
/// slot is generation-checked, so disposing after the entry was already
/// pruned is a no-op.
pub struct ScopeHandle {
    ctx: CallContext,
    state: Arc<ScopeState>,
    scope_ref: ScopeRef,
    index: usize,
}

impl ScopeHandle {
    /// The scope's opaque unique id.
    pub fn id(&self) -> &str {
        &self.state.id
    }

    /// Ends the scope: removes it from the owning context's stack and
    /// releases its arena slot, restoring the enclosing scope as active.
    pub fn dispose(self) {
        self.ctx.core.observers.scope_disposed(&self.state.id);
        {
            let mut stack = self.ctx.stack.lock();
            if let Some(entry) = stack.get_mut(self.index) {
                if *entry == Some(self.scope_ref) {
                    *entry = None;
                }
            }
            while stack.last().map_or(false, Option::is_none) {
                stack.pop();
            }
        }
        self.ctx.core.arena.release(self.scope_ref);
    }
}

impl fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeHandle({})", self.state.id)
    }
}
