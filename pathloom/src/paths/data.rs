//! Lazy, pull-driven value paths.

use parking_lot::RwLock;

use super::{EvalError, PathError, Producer};
use crate::model::EdgeId;
use crate::value::Value;

/// A data edge inside one scope.
///
/// Pure pull: every [`pull`](Self::pull) re-invokes the producer, so two
/// consumers reading at different times may observe different values when an
/// upstream side effect intervened. A producer that wants memoization caches
/// internally; the path never does.
pub struct DataPath {
    id: EdgeId,
    slot: RwLock<Option<Producer>>,
}

impl DataPath {
    pub fn new(id: EdgeId) -> Self {
        Self {
            id,
            slot: RwLock::new(None),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn is_bound(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Install the producer. Write-once per scope.
    pub fn bind(&self, producer: Producer) -> Result<(), PathError> {
        let mut slot = self.slot.write();
        if slot.is_some() {
            return Err(PathError::DoubleBind { id: self.id });
        }
        *slot = Some(producer);
        Ok(())
    }

    /// Invoke the producer and return its value.
    pub async fn pull(&self) -> Result<Value, EvalError> {
        let producer = self
            .slot
            .read()
            .clone()
            .ok_or(PathError::Unbound { id: self.id })?;
        producer().await
    }

    /// Pull and narrow to `T`, failing with a type mismatch when the runtime
    /// value does not convert.
    pub async fn pull_as<T>(&self) -> Result<T, EvalError>
    where
        T: TryFrom<Value, Error = crate::value::ValueError>,
    {
        let value = self.pull().await?;
        T::try_from(value).map_err(EvalError::from)
    }
}

impl std::fmt::Debug for DataPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataPath")
            .field("id", &self.id)
            .field("bound", &self.is_bound())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn constant(v: Value) -> Producer {
        Arc::new(move || {
            let v = v.clone();
            Box::pin(async move { Ok(v) })
        })
    }

    #[tokio::test]
    async fn pull_reinvokes_the_producer() {
        use std::sync::atomic::{AtomicU32, Ordering};
        let calls = Arc::new(AtomicU32::new(0));
        let path = DataPath::new(EdgeId(1));
        let counted = Arc::clone(&calls);
        path.bind(Arc::new(move || {
            let counted = Arc::clone(&counted);
            Box::pin(async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Int(5))
            })
        }))
        .unwrap();

        assert_eq!(path.pull().await.unwrap(), Value::Int(5));
        assert_eq!(path.pull().await.unwrap(), Value::Int(5));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_bind_is_rejected() {
        let path = DataPath::new(EdgeId(2));
        path.bind(constant(Value::Int(1))).unwrap();
        let err = path.bind(constant(Value::Int(2))).unwrap_err();
        assert_eq!(err, PathError::DoubleBind { id: EdgeId(2) });
        // The first producer stays in place.
        assert_eq!(path.pull().await.unwrap(), Value::Int(1));
    }

    #[tokio::test]
    async fn unbound_pull_fails() {
        let path = DataPath::new(EdgeId(3));
        let err = path.pull().await.unwrap_err();
        assert!(matches!(
            err,
            EvalError::Path(PathError::Unbound { id: EdgeId(3) })
        ));
    }

    #[tokio::test]
    async fn pull_as_narrows_or_mismatches() {
        let path = DataPath::new(EdgeId(4));
        path.bind(constant(Value::Int(12))).unwrap();
        assert_eq!(path.pull_as::<i32>().await.unwrap(), 12);
        assert!(matches!(
            path.pull_as::<String>().await.unwrap_err(),
            EvalError::Value(_)
        ));
    }
}
