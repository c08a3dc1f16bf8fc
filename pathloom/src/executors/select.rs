//! Select nodes: lazy dispatch over a source table.

use std::sync::Arc;

use super::{BindError, NodeExecutor};
use crate::model::Node;
use crate::paths::EvalError;
use crate::scope::Scope;

/// Installs a producer on `out` that pulls the key, picks the matching data
/// source (or the fallback) and forwards its pull. Pull semantics pass
/// straight through: a changed key on a later pull routes to a different
/// source, and nothing is cached in between.
pub struct SelectExecutor;

impl NodeExecutor for SelectExecutor {
    fn bind(&self, scope: &Scope, node: &Node) -> Result<bool, BindError> {
        let Node::Select {
            key,
            sources,
            fallback,
            out,
        } = node
        else {
            return Ok(false);
        };
        let key = scope.data_path(*key);
        let sources: Vec<_> = sources
            .iter()
            .map(|(k, id)| (k.clone(), scope.data_path(*id)))
            .collect();
        let fallback = scope.data_path(*fallback);

        scope.data_path(*out).bind(Arc::new(move || {
            let key = Arc::clone(&key);
            let sources = sources.clone();
            let fallback = Arc::clone(&fallback);
            Box::pin(async move {
                let run = async {
                    let pulled = key.pull().await?;
                    let source = sources
                        .iter()
                        .find(|(k, _)| *k == pulled)
                        .map(|(_, path)| path)
                        .unwrap_or(&fallback);
                    source.pull().await
                };
                run.await.map_err(|e| EvalError::in_node("Select", e))
            })
        }))?;
        Ok(true)
    }
}
