//! The service facade: graph lifecycle over a scope table.

use std::sync::Arc;

use miette::Diagnostic;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogError};
use crate::executors::{BindError, ExecutorRegistry};
use crate::host::RuntimeHost;
use crate::model::{Graph, BUILTIN_KINDS};
use crate::scope::Scope;
use crate::sink::{ProbeSink, TracingSink};

#[derive(Debug, Error, Diagnostic)]
pub enum ServiceError {
    #[error("no graph named {name}")]
    #[diagnostic(code(pathloom::service::graph_not_found))]
    GraphNotFound { name: String },

    #[error("no running scope {id}")]
    #[diagnostic(code(pathloom::service::unknown_scope))]
    UnknownScope { id: Uuid },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),
}

/// Runs graphs from a catalog and tracks their scopes.
///
/// Scope ids cross the service boundary as canonical 36-character UUID
/// strings (`Uuid::to_string` / `Uuid::parse_str`); inside the process they
/// stay `Uuid`s.
pub struct GraphService {
    catalog: Arc<dyn Catalog>,
    executors: Arc<ExecutorRegistry>,
    host: RuntimeHost,
    sink: Arc<dyn ProbeSink>,
    scopes: Mutex<FxHashMap<Uuid, Arc<Scope>>>,
}

impl GraphService {
    /// Service over a catalog with the built-in executor set and the
    /// tracing probe sink.
    pub fn new(catalog: Arc<dyn Catalog>, host: RuntimeHost) -> Self {
        Self::with_parts(
            catalog,
            Arc::new(ExecutorRegistry::builtin()),
            host,
            Arc::new(TracingSink),
        )
    }

    pub fn with_parts(
        catalog: Arc<dyn Catalog>,
        executors: Arc<ExecutorRegistry>,
        host: RuntimeHost,
        sink: Arc<dyn ProbeSink>,
    ) -> Self {
        Self {
            catalog,
            executors,
            host,
            sink,
            scopes: Mutex::new(FxHashMap::default()),
        }
    }

    /// Look up a graph, bind a fresh scope over it, launch its entries and
    /// register the scope under its id.
    #[instrument(skip(self), err)]
    pub async fn run_graph(&self, name: &str) -> Result<Uuid, ServiceError> {
        let graph = self
            .catalog
            .lookup(name)
            .await?
            .ok_or_else(|| ServiceError::GraphNotFound {
                name: name.to_string(),
            })?;

        let scope = Scope::bind(
            graph,
            &self.executors,
            self.host.clone(),
            Arc::clone(&self.sink),
        )?;
        scope.start();

        let id = scope.id();
        self.scopes.lock().insert(id, scope);
        tracing::info!(%id, graph = name, "graph started");
        Ok(id)
    }

    /// Deregister a scope and stop it cooperatively. Tasks already running
    /// finish on their own; the removed entry keeps the scope alive until
    /// its last task settles.
    #[instrument(skip(self), err)]
    pub async fn stop_graph(&self, id: Uuid) -> Result<(), ServiceError> {
        let scope = self
            .scopes
            .lock()
            .remove(&id)
            .ok_or(ServiceError::UnknownScope { id })?;
        scope.stop();
        Ok(())
    }

    pub async fn list_graphs(&self) -> Result<Vec<Arc<Graph>>, ServiceError> {
        Ok(self.catalog.list().await?)
    }

    pub async fn update_graph(&self, graph: Graph) -> Result<(), ServiceError> {
        Ok(self.catalog.store(graph).await?)
    }

    pub async fn delete_graph(&self, name: &str) -> Result<(), ServiceError> {
        Ok(self.catalog.remove(name).await?)
    }

    /// Scope handle for an id still in the table.
    pub fn scope(&self, id: Uuid) -> Option<Arc<Scope>> {
        self.scopes.lock().get(&id).cloned()
    }

    /// Ids of every registered scope.
    pub fn running(&self) -> Vec<Uuid> {
        self.scopes.lock().keys().copied().collect()
    }

    /// The merged runtime spec document: crate identity plus the node kinds
    /// the built-in registry handles.
    pub fn spec(&self) -> serde_json::Value {
        serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "kinds": BUILTIN_KINDS,
        })
    }
}

impl std::fmt::Debug for GraphService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphService")
            .field("running", &self.scopes.lock().len())
            .finish_non_exhaustive()
    }
}
