//! One running instance of a graph.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::instrument;
use uuid::Uuid;

use crate::executors::{BindError, ExecutorRegistry};
use crate::host::{CancelFlag, RuntimeHost};
use crate::model::{EdgeId, Graph};
use crate::paths::{ControlPath, DataPath, PathRegistry};
use crate::sink::{ProbeEvent, ProbeSink, TracingSink};

/// Per-run container owning paths, tasks and lifetime.
///
/// Lifecycle: constructed → bound ([`Scope::bind`]) → running
/// ([`Scope::start`]) → stopped ([`Scope::stop`], cooperative) → collected
/// ([`Scope::join`] returns with no tasks outstanding). The graph document
/// is shared read-only and outlives the scope; the path registry, producer
/// closures and task set are owned exclusively.
pub struct Scope {
    id: Uuid,
    graph: Arc<Graph>,
    registry: PathRegistry,
    host: RuntimeHost,
    sink: Arc<dyn ProbeSink>,
    cancel: CancelFlag,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Scope {
    /// Construct and bind a scope over a graph.
    ///
    /// Walks every node and lets the first matching executor install its
    /// closures, then checks that each entry's outgoing control path got a
    /// declared body. Binding-time failures abort construction; no tasks
    /// have been launched at that point.
    #[instrument(skip_all, fields(graph = graph.name()), err)]
    pub fn bind(
        graph: Arc<Graph>,
        executors: &ExecutorRegistry,
        host: RuntimeHost,
        sink: Arc<dyn ProbeSink>,
    ) -> Result<Arc<Self>, BindError> {
        let cancel = host.cancel_flag();
        let scope = Self {
            id: Uuid::new_v4(),
            graph,
            registry: PathRegistry::new(),
            host,
            sink,
            cancel,
            tasks: Mutex::new(Vec::new()),
        };

        for node in scope.graph.nodes() {
            executors.bind_node(&scope, node)?;
        }

        for entry in scope.graph.entries() {
            if !scope.registry.control_path(entry).is_declared() {
                return Err(BindError::EntryUnbound { id: entry });
            }
        }

        tracing::debug!(
            scope = %scope.id,
            data_paths = scope.registry.data_len(),
            control_paths = scope.registry.control_len(),
            "scope bound"
        );
        Ok(Arc::new(scope))
    }

    /// Bind with the default sink (tracing).
    pub fn bind_default(
        graph: Arc<Graph>,
        executors: &ExecutorRegistry,
        host: RuntimeHost,
    ) -> Result<Arc<Self>, BindError> {
        Self::bind(graph, executors, host, Arc::new(TracingSink))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub fn sink(&self) -> &Arc<dyn ProbeSink> {
        &self.sink
    }

    /// The data path for `id`, materialized on first query.
    pub fn data_path(&self, id: EdgeId) -> Arc<DataPath> {
        self.registry.data_path(id)
    }

    /// The control path for `id`, materialized on first query.
    pub fn control_path(&self, id: EdgeId) -> Arc<ControlPath> {
        self.registry.control_path(id)
    }

    pub fn data_path_count(&self) -> usize {
        self.registry.data_len()
    }

    pub fn control_path_count(&self) -> usize {
        self.registry.control_len()
    }

    /// Launch one task per entry node.
    ///
    /// Entry tasks are mutually independent with no ordering between them.
    /// An `EvalError` escaping a body terminates that task only; the failure
    /// is logged and recorded on the probe sink while the scope and its
    /// sibling tasks keep running.
    #[instrument(skip(self), fields(scope = %self.id))]
    pub fn start(self: &Arc<Self>) {
        for entry in self.graph.entries() {
            let path = self.registry.control_path(entry);
            let scope = Arc::clone(self);
            let handle = self.host.launch(async move {
                if scope.cancelled() {
                    return;
                }
                if let Err(err) = path.invoke().await {
                    tracing::error!(
                        scope = %scope.id,
                        entry = %entry,
                        error = %err,
                        "entry task failed"
                    );
                    scope.sink.record(ProbeEvent::failed(
                        scope.id,
                        format!("entry {entry}"),
                        err.to_string(),
                    ));
                }
            });
            self.tasks.lock().push(handle);
        }
    }

    /// Flip the cooperative cancel flag. In-flight tasks finish naturally;
    /// they observe the stop only where they poll [`Scope::cancelled`].
    pub fn stop(&self) {
        self.cancel.cancel();
        tracing::debug!(scope = %self.id, "scope stopped");
    }

    pub fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Await every outstanding task. After this returns the scope is
    /// collected: nothing it launched is still running.
    pub async fn join(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for handle in handles {
            if let Err(err) = handle.await {
                tracing::error!(scope = %self.id, error = %err, "scope task panicked");
            }
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("graph", &self.graph.name())
            .field("cancelled", &self.cancelled())
            .finish_non_exhaustive()
    }
}
