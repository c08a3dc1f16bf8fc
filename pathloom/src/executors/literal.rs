//! Constant data sources.

use std::sync::Arc;

use super::{BindError, NodeExecutor};
use crate::model::Node;
use crate::scope::Scope;

/// Installs a producer that clones the document constant on every pull.
pub struct LiteralExecutor;

impl NodeExecutor for LiteralExecutor {
    fn bind(&self, scope: &Scope, node: &Node) -> Result<bool, BindError> {
        let Node::Literal { value, out } = node else {
            return Ok(false);
        };
        let value = value.clone();
        scope.data_path(*out).bind(Arc::new(move || {
            let value = value.clone();
            Box::pin(async move { Ok(value) })
        }))?;
        Ok(true)
    }
}
