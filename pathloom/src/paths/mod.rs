//! Control and data paths: the two edge disciplines.
//!
//! Every edge id in a running scope is backed by exactly one path object.
//! A [`DataPath`] is *pull*: it holds at most one producer closure and
//! re-invokes it on every [`DataPath::pull`]. A [`ControlPath`] is *push*:
//! it holds at most one body closure, invoked eagerly and sequentially in
//! the caller's task. Both slots are write-once per scope: a second bind is
//! a graph-model bug and fails loudly rather than being silently replaced.

pub mod control;
pub mod data;
pub mod registry;

pub use control::ControlPath;
pub use data::DataPath;
pub use registry::PathRegistry;

use std::sync::Arc;

use futures_util::future::BoxFuture;
use miette::Diagnostic;
use thiserror::Error;

use crate::model::EdgeId;
use crate::value::{Value, ValueError};

/// Producer closure bound to a data path. Invoked once per pull.
pub type Producer = Arc<dyn Fn() -> BoxFuture<'static, Result<Value, EvalError>> + Send + Sync>;

/// Body closure declared on a control path.
pub type Body = Arc<dyn Fn() -> BoxFuture<'static, Result<(), EvalError>> + Send + Sync>;

/// Structural path faults: slot misuse.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum PathError {
    /// A path received a second producer or body.
    #[error("path {id} already bound")]
    #[diagnostic(
        code(pathloom::paths::double_bind),
        help("Two nodes claim the same output id; the graph document is malformed.")
    )]
    DoubleBind { id: EdgeId },

    /// A data path was pulled with no producer installed.
    #[error("data path {id} pulled with no producer")]
    #[diagnostic(
        code(pathloom::paths::unbound),
        help("A consumer reaches this id but no node output feeds it.")
    )]
    Unbound { id: EdgeId },
}

/// Failures raised while evaluating producers and bodies.
///
/// Propagates up the invoking control or data chain; terminates the task that
/// observes it, never the whole scope.
#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Value(#[from] ValueError),

    /// A failure raised from within one node's producer or body.
    #[error("{kind} node failed")]
    #[diagnostic(code(pathloom::paths::node_eval))]
    Node {
        kind: &'static str,
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// Wrap an inner failure with the node kind it surfaced from.
    pub fn in_node(kind: &'static str, source: EvalError) -> Self {
        EvalError::Node {
            kind,
            source: Box::new(source),
        }
    }
}
