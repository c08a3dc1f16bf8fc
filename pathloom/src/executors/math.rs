//! Binary arithmetic nodes.

use std::sync::Arc;

use super::{BindError, NodeExecutor};
use crate::model::Node;
use crate::paths::EvalError;
use crate::scope::Scope;
use crate::value;

/// Installs a producer on `out` that pulls both operands and applies the
/// operator under numeric widening. Operands are pulled on every downstream
/// pull; nothing is cached.
pub struct MathExecutor;

impl NodeExecutor for MathExecutor {
    fn bind(&self, scope: &Scope, node: &Node) -> Result<bool, BindError> {
        let Node::Math { op, lhs, rhs, out } = node else {
            return Ok(false);
        };
        let op = *op;
        let lhs = scope.data_path(*lhs);
        let rhs = scope.data_path(*rhs);
        scope.data_path(*out).bind(Arc::new(move || {
            let lhs = Arc::clone(&lhs);
            let rhs = Arc::clone(&rhs);
            Box::pin(async move {
                let run = async {
                    let a = lhs.pull().await?;
                    let b = rhs.pull().await?;
                    value::apply_binary(op, &a, &b).map_err(EvalError::from)
                };
                run.await.map_err(|e| EvalError::in_node("Math", e))
            })
        }))?;
        Ok(true)
    }
}
