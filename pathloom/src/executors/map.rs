//! Map manipulation nodes.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{BindError, NodeExecutor};
use crate::model::Node;
use crate::paths::EvalError;
use crate::scope::Scope;
use crate::value::Value;

/// Handles both map kinds. Each producer pulls the input map, clones it and
/// applies the edit to the clone; upstream maps are never mutated, so a
/// second pull of the input observes the original.
pub struct MapExecutor;

impl NodeExecutor for MapExecutor {
    fn bind(&self, scope: &Scope, node: &Node) -> Result<bool, BindError> {
        match node {
            Node::MapRemove { map, key, out } => {
                let map = scope.data_path(*map);
                let key = scope.data_path(*key);
                scope.data_path(*out).bind(Arc::new(move || {
                    let map = Arc::clone(&map);
                    let key = Arc::clone(&key);
                    Box::pin(async move {
                        let run = async {
                            let mut entries: BTreeMap<String, Value> = map.pull_as().await?;
                            let key: String = key.pull_as().await?;
                            entries.remove(&key);
                            Ok(Value::Map(entries))
                        };
                        run.await.map_err(|e| EvalError::in_node("Map.Remove", e))
                    })
                }))?;
                Ok(true)
            }
            Node::MapPut {
                map,
                key,
                value,
                out,
            } => {
                let map = scope.data_path(*map);
                let key = scope.data_path(*key);
                let value = scope.data_path(*value);
                scope.data_path(*out).bind(Arc::new(move || {
                    let map = Arc::clone(&map);
                    let key = Arc::clone(&key);
                    let value = Arc::clone(&value);
                    Box::pin(async move {
                        let run = async {
                            let mut entries: BTreeMap<String, Value> = map.pull_as().await?;
                            let key: String = key.pull_as().await?;
                            let value = value.pull().await?;
                            entries.insert(key, value);
                            Ok(Value::Map(entries))
                        };
                        run.await.map_err(|e| EvalError::in_node("Map.Put", e))
                    })
                }))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
