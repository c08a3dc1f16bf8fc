//! Graph catalogs: where documents live between runs.
//!
//! The engine only ever sees in-memory [`Graph`]s; catalogs decide how they
//! persist. [`MemoryCatalog`] keeps them in a map for tests and embedding,
//! [`FileCatalog`] stores one gzip-compressed JSON document per graph.
//! Names compare case-insensitively: every catalog keys by the lowercase
//! graph name.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use miette::Diagnostic;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::model::Graph;

/// Environment variable naming the file catalog's root directory.
pub const CATALOG_DIR_ENV: &str = "PATHLOOM_CATALOG_DIR";

const DEFAULT_CATALOG_DIR: &str = "pathloom-catalog";

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("catalog io error: {0}")]
    #[diagnostic(code(pathloom::catalog::io))]
    Io(#[from] std::io::Error),

    #[error("catalog codec error: {0}")]
    #[diagnostic(code(pathloom::catalog::codec))]
    Codec(#[from] serde_json::Error),

    /// Removal of a graph the catalog does not hold.
    #[error("no graph named {name}")]
    #[diagnostic(code(pathloom::catalog::missing))]
    Missing { name: String },
}

/// Pluggable graph storage.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn lookup(&self, name: &str) -> Result<Option<Arc<Graph>>, CatalogError>;
    async fn list(&self) -> Result<Vec<Arc<Graph>>, CatalogError>;
    async fn store(&self, graph: Graph) -> Result<(), CatalogError>;
    async fn remove(&self, name: &str) -> Result<(), CatalogError>;
}

/// Volatile catalog for tests and embedding.
#[derive(Default)]
pub struct MemoryCatalog {
    graphs: RwLock<FxHashMap<String, Arc<Graph>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor preloaded with documents.
    pub fn with_graphs(graphs: impl IntoIterator<Item = Graph>) -> Self {
        let catalog = Self::new();
        {
            let mut table = catalog.graphs.write();
            for graph in graphs {
                table.insert(graph.name().to_lowercase(), Arc::new(graph));
            }
        }
        catalog
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn lookup(&self, name: &str) -> Result<Option<Arc<Graph>>, CatalogError> {
        Ok(self.graphs.read().get(&name.to_lowercase()).cloned())
    }

    async fn list(&self) -> Result<Vec<Arc<Graph>>, CatalogError> {
        let mut graphs: Vec<_> = self.graphs.read().values().cloned().collect();
        graphs.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(graphs)
    }

    async fn store(&self, graph: Graph) -> Result<(), CatalogError> {
        self.graphs
            .write()
            .insert(graph.name().to_lowercase(), Arc::new(graph));
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), CatalogError> {
        match self.graphs.write().remove(&name.to_lowercase()) {
            Some(_) => Ok(()),
            None => Err(CatalogError::Missing {
                name: name.to_string(),
            }),
        }
    }
}

/// Durable catalog: one `.gph` file per graph under a root directory.
///
/// The basename is the URL-safe base64 encoding of the lowercase graph name;
/// the body is the gzip-compressed serde_json document. The directory is
/// created on first store.
pub struct FileCatalog {
    root: PathBuf,
}

impl FileCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the root directory from the environment
    /// (`PATHLOOM_CATALOG_DIR`, `.env`-loadable), falling back to
    /// `pathloom-catalog` in the working directory.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let root =
            std::env::var(CATALOG_DIR_ENV).unwrap_or_else(|_| DEFAULT_CATALOG_DIR.to_string());
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File basename for a graph name: URL-safe base64 of the lowercase
    /// name, suffixed `.gph`.
    pub fn file_name(name: &str) -> String {
        format!("{}.gph", URL_SAFE.encode(name.to_lowercase()))
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(Self::file_name(name))
    }

    // The gzip codec works on in-memory buffers; only the file reads and
    // writes go through tokio so catalog IO never blocks an executor thread.

    fn decode_document(bytes: &[u8]) -> Result<Graph, CatalogError> {
        let mut decoder = GzDecoder::new(bytes);
        let mut body = Vec::new();
        decoder.read_to_end(&mut body)?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn encode_document(graph: &Graph) -> Result<Vec<u8>, CatalogError> {
        let body = serde_json::to_vec(graph)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&body)?;
        Ok(encoder.finish()?)
    }
}

#[async_trait]
impl Catalog for FileCatalog {
    async fn lookup(&self, name: &str) -> Result<Option<Arc<Graph>>, CatalogError> {
        let bytes = match tokio::fs::read(self.path_for(name)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(Arc::new(Self::decode_document(&bytes)?)))
    }

    async fn list(&self) -> Result<Vec<Arc<Graph>>, CatalogError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut graphs = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("gph") {
                let bytes = tokio::fs::read(&path).await?;
                graphs.push(Arc::new(Self::decode_document(&bytes)?));
            }
        }
        graphs.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(graphs)
    }

    async fn store(&self, graph: Graph) -> Result<(), CatalogError> {
        let encoded = Self::encode_document(&graph)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.path_for(graph.name()), encoded).await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), CatalogError> {
        match tokio::fs::remove_file(self.path_for(name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(CatalogError::Missing {
                name: name.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeId, Node};
    use base64::Engine as _;

    #[test]
    fn file_names_are_lowercased_then_encoded() {
        assert_eq!(
            FileCatalog::file_name("Orders"),
            FileCatalog::file_name("orders")
        );
        let encoded = FileCatalog::file_name("orders");
        assert!(encoded.ends_with(".gph"));
        let stem = encoded.trim_end_matches(".gph");
        assert_eq!(URL_SAFE.decode(stem).unwrap(), b"orders");
    }

    #[tokio::test]
    async fn memory_catalog_is_case_insensitive() {
        let catalog = MemoryCatalog::new();
        catalog
            .store(Graph::new("Orders", vec![Node::Entry { out: EdgeId(1) }]))
            .await
            .unwrap();
        let found = catalog.lookup("ORDERS").await.unwrap().unwrap();
        assert_eq!(found.name(), "Orders");
        catalog.remove("orders").await.unwrap();
        assert!(catalog.lookup("orders").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_catalog_remove_of_unknown_is_missing() {
        let catalog = MemoryCatalog::new();
        let err = catalog.remove("ghost").await.unwrap_err();
        assert!(matches!(err, CatalogError::Missing { .. }));
    }
}
