//! Probe nodes: control-triggered sinks.

use std::sync::Arc;

use super::{BindError, NodeExecutor};
use crate::model::Node;
use crate::paths::EvalError;
use crate::scope::Scope;
use crate::sink::ProbeEvent;

/// Declares a body on the incoming control id that pulls the value path and
/// records the result on the scope's probe sink.
pub struct ProbeExecutor;

impl NodeExecutor for ProbeExecutor {
    fn bind(&self, scope: &Scope, node: &Node) -> Result<bool, BindError> {
        let Node::Probe {
            input,
            value,
            label,
        } = node
        else {
            return Ok(false);
        };
        let value = scope.data_path(*value);
        let sink = Arc::clone(scope.sink());
        let scope_id = scope.id();
        let label = label.clone();

        scope.control_path(*input).declare(Arc::new(move || {
            let value = Arc::clone(&value);
            let sink = Arc::clone(&sink);
            let label = label.clone();
            Box::pin(async move {
                let run = async {
                    let pulled = value.pull().await?;
                    sink.record(ProbeEvent::observed(scope_id, label, pulled));
                    Ok(())
                };
                run.await.map_err(|e| EvalError::in_node("Probe", e))
            })
        }))?;
        Ok(true)
    }
}
