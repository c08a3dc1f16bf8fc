//! Build a small graph, store it in a catalog and run it through the
//! service facade, streaming probe events to a channel.
//!
//! Run with: cargo run --example run_graph

use std::sync::Arc;

use pathloom::catalog::MemoryCatalog;
use pathloom::executors::ExecutorRegistry;
use pathloom::host::RuntimeHost;
use pathloom::model::{EdgeId, Graph, Node};
use pathloom::service::GraphService;
use pathloom::sink::ChannelSink;
use pathloom::value::{MathOp, Value};

#[tokio::main]
async fn main() -> miette::Result<()> {
    pathloom::telemetry::init();

    let graph = Graph::new(
        "demo",
        vec![
            Node::Entry { out: EdgeId(1) },
            Node::Literal {
                value: Value::Int(3),
                out: EdgeId(2),
            },
            Node::Literal {
                value: Value::Int(4),
                out: EdgeId(3),
            },
            Node::Math {
                op: MathOp::Mul,
                lhs: EdgeId(2),
                rhs: EdgeId(3),
                out: EdgeId(4),
            },
            Node::Probe {
                input: EdgeId(1),
                value: EdgeId(4),
                label: "product".into(),
            },
        ],
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let service = GraphService::with_parts(
        Arc::new(MemoryCatalog::with_graphs([graph])),
        Arc::new(ExecutorRegistry::builtin()),
        RuntimeHost::current(),
        Arc::new(ChannelSink::new(tx)),
    );

    let id = service.run_graph("demo").await.map_err(miette::Report::new)?;
    println!("scope {id}");

    if let Some(scope) = service.scope(id) {
        scope.join().await;
    }
    service.stop_graph(id).await.map_err(miette::Report::new)?;

    while let Ok(event) = rx.try_recv() {
        println!("{} = {}", event.label, event.payload);
    }
    Ok(())
}
