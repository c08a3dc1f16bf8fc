//! Entry nodes.

use super::{BindError, NodeExecutor};
use crate::model::Node;
use crate::scope::Scope;

/// Entries have no behavior of their own: the body on their outgoing control
/// path is declared by whichever node consumes that id. Binding only
/// materializes the path so the post-bind entry check has a slot to inspect.
pub struct EntryExecutor;

impl NodeExecutor for EntryExecutor {
    fn bind(&self, scope: &Scope, node: &Node) -> Result<bool, BindError> {
        let Node::Entry { out } = node else {
            return Ok(false);
        };
        scope.control_path(*out);
        Ok(true)
    }
}
