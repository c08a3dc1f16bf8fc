//! Branch nodes: eager dispatch over a key table.

use std::sync::Arc;

use super::{BindError, NodeExecutor};
use crate::model::Node;
use crate::paths::EvalError;
use crate::scope::Scope;

/// Declares a body on the incoming control id. On invocation it pulls the
/// key, finds the arm whose key is value-equal to the pulled value and
/// invokes that arm's control path; with no match it invokes the fallback.
/// A fallback nobody declared is a legal no-op, so total branches may leave
/// it dangling.
pub struct BranchExecutor;

impl NodeExecutor for BranchExecutor {
    fn bind(&self, scope: &Scope, node: &Node) -> Result<bool, BindError> {
        let Node::Branch {
            input,
            key,
            arms,
            fallback,
        } = node
        else {
            return Ok(false);
        };
        let key = scope.data_path(*key);
        let arms: Vec<_> = arms
            .iter()
            .map(|(k, id)| (k.clone(), scope.control_path(*id)))
            .collect();
        let fallback = scope.control_path(*fallback);

        scope.control_path(*input).declare(Arc::new(move || {
            let key = Arc::clone(&key);
            let arms = arms.clone();
            let fallback = Arc::clone(&fallback);
            Box::pin(async move {
                let run = async {
                    let pulled = key.pull().await?;
                    let target = arms
                        .iter()
                        .find(|(k, _)| *k == pulled)
                        .map(|(_, path)| path)
                        .unwrap_or(&fallback);
                    target.invoke().await
                };
                run.await.map_err(|e| EvalError::in_node("Branch", e))
            })
        }))?;
        Ok(true)
    }
}
