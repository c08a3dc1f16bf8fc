//! ```text
//! Catalog ──► GraphService::run_graph ─► Scope::bind ─► ExecutorRegistry
//!                │                          │               │
//!                │                          │               ├─► DataPath (lazy pull)
//!                │                          │               └─► ControlPath (eager push)
//!                │                          │
//!                │                          └─► Scope::start ─► RuntimeHost tasks
//!                │                                              │
//!                └─► .gph files (gzip + base64)                 └─► ProbeSink (tracing / channel)
//! ```
//!
//! Pathloom is a dataflow graph runtime. A graph is a set of typed nodes wired
//! by integer edge ids; each edge is either a *control path* (an imperative,
//! eagerly invoked side effect) or a *data path* (a lazily pulled value).
//! Binding a graph produces a [`scope::Scope`]: every node's executor installs
//! producer and body closures on the paths it owns, then each entry node is
//! launched as an independent task on the [`host::RuntimeHost`].

pub mod catalog;
pub mod executors;
pub mod host;
pub mod model;
pub mod paths;
pub mod scope;
pub mod service;
pub mod sink;
pub mod telemetry;
pub mod value;
