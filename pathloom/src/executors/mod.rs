//! Node executors: kind → behavior bindings.
//!
//! Binding a scope walks the graph's nodes and, for each one, asks the
//! registry's executors in discovery order whether they claim the node's
//! kind. The first that does installs producer and body closures on the
//! node's paths through [`Scope::data_path`](crate::scope::Scope::data_path)
//! and [`Scope::control_path`](crate::scope::Scope::control_path).
//!
//! Extensibility lives here: registering a custom executor ahead of the
//! built-ins overrides a kind without touching the model.

pub mod branch;
pub mod entry;
pub mod literal;
pub mod map;
pub mod math;
pub mod probe;
pub mod select;

pub use branch::BranchExecutor;
pub use entry::EntryExecutor;
pub use literal::LiteralExecutor;
pub use map::MapExecutor;
pub use math::MathExecutor;
pub use probe::ProbeExecutor;
pub use select::SelectExecutor;

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::model::{EdgeId, Node};
use crate::paths::PathError;
use crate::scope::Scope;

/// Errors that abort scope construction. No tasks launch after one of these.
#[derive(Debug, Error, Diagnostic)]
pub enum BindError {
    /// No registered executor claimed a node's kind.
    #[error("no executor for node kind {kind}")]
    #[diagnostic(
        code(pathloom::executors::no_executor),
        help("Register an executor for this kind, or remove the node from the graph.")
    )]
    NoExecutor { kind: String },

    /// An entry node's outgoing control path ended up with no declared body.
    #[error("entry control path {id} has no declared body")]
    #[diagnostic(
        code(pathloom::executors::entry_unbound),
        help("No node consumes this entry's outgoing control id.")
    )]
    EntryUnbound { id: EdgeId },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

/// Installs closures for one node kind.
///
/// `bind` returns `Ok(true)` when it handled the node and `Ok(false)` when
/// the kind is not its concern; structural faults (double binds) are errors.
pub trait NodeExecutor: Send + Sync {
    fn bind(&self, scope: &Scope, node: &Node) -> Result<bool, BindError>;
}

/// Ordered set of executors, first match wins.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: Vec<Arc<dyn NodeExecutor>>,
}

impl ExecutorRegistry {
    /// An empty registry. Useful for fully custom node sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in executor set in discovery order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(EntryExecutor);
        registry.register(BranchExecutor);
        registry.register(SelectExecutor);
        registry.register(MapExecutor);
        registry.register(MathExecutor);
        registry.register(LiteralExecutor);
        registry.register(ProbeExecutor);
        registry
    }

    /// Append an executor. Earlier registrations shadow later ones for the
    /// kinds they claim.
    pub fn register(&mut self, executor: impl NodeExecutor + 'static) {
        self.executors.push(Arc::new(executor));
    }

    /// Prepend an executor so it is consulted before everything already
    /// registered.
    pub fn register_first(&mut self, executor: impl NodeExecutor + 'static) {
        self.executors.insert(0, Arc::new(executor));
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    /// Bind one node with the first executor that claims it.
    pub fn bind_node(&self, scope: &Scope, node: &Node) -> Result<(), BindError> {
        for executor in &self.executors {
            if executor.bind(scope, node)? {
                return Ok(());
            }
        }
        Err(BindError::NoExecutor {
            kind: node.kind().to_string(),
        })
    }
}
