mod common;

use std::sync::Arc;

use common::*;
use pathloom::catalog::{Catalog, CatalogError, FileCatalog, MemoryCatalog};
use pathloom::host::RuntimeHost;
use pathloom::model::Graph;
use pathloom::service::{GraphService, ServiceError};
use pathloom::sink::MemorySink;
use pathloom::value::Value;
use uuid::Uuid;

fn service_over(graphs: Vec<Graph>) -> (GraphService, MemorySink) {
    let sink = MemorySink::new();
    let service = GraphService::with_parts(
        Arc::new(MemoryCatalog::with_graphs(graphs)),
        Arc::new(pathloom::executors::ExecutorRegistry::builtin()),
        RuntimeHost::current(),
        Arc::new(sink.clone()),
    );
    (service, sink)
}

#[tokio::test]
async fn run_graph_starts_a_scope_and_registers_it() {
    let (service, sink) = service_over(vec![entry_mul_probe()]);

    let id = service.run_graph("entry-mul-probe").await.unwrap();
    assert_eq!(id.to_string().len(), 36);
    assert_eq!(service.running(), vec![id]);

    let scope = service.scope(id).unwrap();
    scope.join().await;

    let events = sink.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].value(), Some(&Value::Int(12)));
    assert_eq!(events[0].scope, id);
}

#[tokio::test]
async fn run_graph_of_an_unknown_name_is_not_found() {
    let (service, _) = service_over(vec![]);
    let err = service.run_graph("ghost").await.unwrap_err();
    assert!(matches!(err, ServiceError::GraphNotFound { name } if name == "ghost"));
}

#[tokio::test]
async fn stop_graph_deregisters_and_later_stops_are_unknown() {
    let (service, _) = service_over(vec![entry_mul_probe()]);
    let id = service.run_graph("entry-mul-probe").await.unwrap();

    // Hold the scope so we can drain its tasks after the stop.
    let scope = service.scope(id).unwrap();
    service.stop_graph(id).await.unwrap();
    assert!(service.scope(id).is_none());
    assert!(scope.cancelled());
    scope.join().await;

    let err = service.stop_graph(id).await.unwrap_err();
    assert!(matches!(err, ServiceError::UnknownScope { id: unknown } if unknown == id));
}

#[tokio::test]
async fn stop_of_a_random_id_is_unknown() {
    let (service, _) = service_over(vec![]);
    let err = service.stop_graph(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::UnknownScope { .. }));
}

#[tokio::test]
async fn catalog_passthroughs_update_list_delete() {
    let (service, _) = service_over(vec![]);
    service.update_graph(entry_mul_probe()).await.unwrap();
    service.update_graph(two_entries()).await.unwrap();

    let names: Vec<String> = service
        .list_graphs()
        .await
        .unwrap()
        .iter()
        .map(|g| g.name().to_string())
        .collect();
    assert_eq!(names, vec!["entry-mul-probe", "two-entries"]);

    service.delete_graph("two-entries").await.unwrap();
    assert_eq!(service.list_graphs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn spec_document_names_the_builtin_kinds() {
    let (service, _) = service_over(vec![]);
    let spec = service.spec();
    assert_eq!(spec["name"], "pathloom");
    let kinds: Vec<&str> = spec["kinds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k.as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"Map.Remove"));
    assert!(kinds.contains(&"Entry"));
}

#[tokio::test]
async fn file_catalog_round_trips_gzipped_documents() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = FileCatalog::new(dir.path());

    let graph = entry_mul_probe();
    catalog.store(graph.clone()).await.unwrap();

    // One file, named by the URL-safe base64 of the lowercase name, with a
    // gzip body.
    let expected = dir.path().join(FileCatalog::file_name("Entry-Mul-Probe"));
    assert!(expected.exists());
    let bytes = std::fs::read(&expected).unwrap();
    assert!(bytes.starts_with(&[0x1f, 0x8b]));

    let found = catalog.lookup("ENTRY-MUL-PROBE").await.unwrap().unwrap();
    assert_eq!(*found, graph);

    let listed = catalog.list().await.unwrap();
    assert_eq!(listed.len(), 1);

    catalog.remove("entry-mul-probe").await.unwrap();
    assert!(catalog.lookup("entry-mul-probe").await.unwrap().is_none());
    let err = catalog.remove("entry-mul-probe").await.unwrap_err();
    assert!(matches!(err, CatalogError::Missing { .. }));
}

#[tokio::test]
async fn file_catalog_lists_nothing_for_a_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = FileCatalog::new(dir.path().join("never-created"));
    assert!(catalog.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn service_runs_from_a_file_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = FileCatalog::new(dir.path());
    catalog.store(two_entries()).await.unwrap();

    let sink = MemorySink::new();
    let service = GraphService::with_parts(
        Arc::new(catalog),
        Arc::new(pathloom::executors::ExecutorRegistry::builtin()),
        RuntimeHost::current(),
        Arc::new(sink.clone()),
    );

    let id = service.run_graph("two-entries").await.unwrap();
    service.scope(id).unwrap().join().await;
    assert_eq!(sink.snapshot().len(), 2);
}
