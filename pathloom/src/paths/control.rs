//! Eager, push-driven side-effect paths.

use parking_lot::RwLock;

use super::{Body, EvalError, PathError};
use crate::model::EdgeId;

/// A control edge inside one scope.
///
/// Invocation runs the declared body synchronously in the caller's task;
/// an undeclared path is a legal no-op (dangling outputs such as a total
/// branch's fallback).
pub struct ControlPath {
    id: EdgeId,
    slot: RwLock<Option<Body>>,
}

impl ControlPath {
    pub fn new(id: EdgeId) -> Self {
        Self {
            id,
            slot: RwLock::new(None),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn is_declared(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Install the body. Write-once per scope.
    pub fn declare(&self, body: Body) -> Result<(), PathError> {
        let mut slot = self.slot.write();
        if slot.is_some() {
            return Err(PathError::DoubleBind { id: self.id });
        }
        *slot = Some(body);
        Ok(())
    }

    /// Run the declared body, or do nothing when none is declared.
    pub async fn invoke(&self) -> Result<(), EvalError> {
        let body = self.slot.read().clone();
        match body {
            Some(body) => body().await,
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ControlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPath")
            .field("id", &self.id)
            .field("declared", &self.is_declared())
            .finish()
    }
}
