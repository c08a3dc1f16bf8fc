//! Shared graph fixtures and small test helpers.

use std::sync::Arc;

use parking_lot::Mutex;
use pathloom::model::{EdgeId, Graph, Node};
use pathloom::paths::Body;
use pathloom::value::{MathOp, Value};

/// Entry -> Mul(3, 4) -> probe labelled "product".
///
/// Edge ids: control #1; literals on #2/#3; product on #4.
pub fn entry_mul_probe() -> Graph {
    Graph::new(
        "entry-mul-probe",
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
    )
}

/// Entry -> Branch over {"a" -> #10, "b" -> #11}, fallback #12.
///
/// The arm/fallback control ids dangle; tests declare recording bodies on
/// them before starting the scope.
pub fn branch_graph(key: &str) -> Graph {
    Graph::new(
        "branch",
        vec![
            Node::Entry { out: EdgeId(1) },
            Node::Literal {
                value: Value::Str(key.into()),
                out: EdgeId(2),
            },
            Node::Branch {
                input: EdgeId(1),
                key: EdgeId(2),
                arms: vec![
                    (Value::Str("a".into()), EdgeId(10)),
                    (Value::Str("b".into()), EdgeId(11)),
                ],
                fallback: EdgeId(12),
            },
        ],
    )
}

/// Select over {0 -> "A", 1 -> "B"}, fallback "D".
///
/// The key edge (#2) has no producing node; tests bind it by hand so they
/// can change the upstream value between pulls. Output on #3.
pub fn select_graph() -> Graph {
    Graph::new(
        "select",
        vec![
            Node::Literal {
                value: Value::Str("A".into()),
                out: EdgeId(10),
            },
            Node::Literal {
                value: Value::Str("B".into()),
                out: EdgeId(11),
            },
            Node::Literal {
                value: Value::Str("D".into()),
                out: EdgeId(12),
            },
            Node::Select {
                key: EdgeId(2),
                sources: vec![
                    (Value::Int(0), EdgeId(10)),
                    (Value::Int(1), EdgeId(11)),
                ],
                fallback: EdgeId(12),
                out: EdgeId(3),
            },
        ],
    )
}

/// Two independent entries, each feeding a labelled probe.
pub fn two_entries() -> Graph {
    Graph::new(
        "two-entries",
        vec![
            Node::Entry { out: EdgeId(1) },
            Node::Entry { out: EdgeId(2) },
            Node::Literal {
                value: Value::Str("left".into()),
                out: EdgeId(10),
            },
            Node::Literal {
                value: Value::Str("right".into()),
                out: EdgeId(11),
            },
            Node::Probe {
                input: EdgeId(1),
                value: EdgeId(10),
                label: "left".into(),
            },
            Node::Probe {
                input: EdgeId(2),
                value: EdgeId(11),
                label: "right".into(),
            },
        ],
    )
}

/// A two-entry map value for map-node tests.
pub fn xy_map() -> Value {
    Value::Map(
        [
            ("x".to_string(), Value::Int(1)),
            ("y".to_string(), Value::Int(2)),
        ]
        .into_iter()
        .collect(),
    )
}

/// A control body that appends `tag` to a shared log.
pub fn recording_body(log: Arc<Mutex<Vec<String>>>, tag: &str) -> Body {
    let tag = tag.to_string();
    Arc::new(move || {
        let log = Arc::clone(&log);
        let tag = tag.clone();
        Box::pin(async move {
            log.lock().push(tag);
            Ok(())
        })
    })
}
