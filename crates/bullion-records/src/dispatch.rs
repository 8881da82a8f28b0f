//! Function-name dispatch.
//!
//! Maps invocation names such as `createBar` or `queryAllSells` onto
//! [`RecordStore`] operations and turns every outcome into a [`Response`].

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

use bullion_records_core::{check_arity, RecordKind};
use bullion_records_ledger::Ledger;

use crate::error::Result;
use crate::id::{IdGenerator, UuidGenerator};
use crate::store::RecordStore;

/// Misspelled Trade range-query route still sent by deployed clients.
pub const LEGACY_TRADE_QUERY_ROUTE: &str = "queryAllTreades";

/// A store operation selected by function name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Instantiation hook. Does nothing.
    Init,
    /// Point lookup by key.
    Get(RecordKind),
    /// Create from positional field values.
    Create(RecordKind),
    /// Every record of the kind, as one JSON array.
    QueryAll(RecordKind),
}

impl Operation {
    /// The canonical function name for this operation.
    pub fn route(&self) -> String {
        match self {
            Operation::Init => "init".to_string(),
            Operation::Get(kind) => format!("get{}", kind.name()),
            Operation::Create(kind) => format!("create{}", kind.name()),
            Operation::QueryAll(kind) => format!("queryAll{}s", kind.name()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.route())
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// One of [`Response::OK`], [`Response::NOT_FOUND`] or [`Response::ERROR`].
    pub status: u16,
    /// Key, record bytes or JSON array on success; empty otherwise.
    pub payload: Bytes,
    /// Failure description; empty on success.
    pub message: String,
}

impl Response {
    /// The operation succeeded.
    pub const OK: u16 = 200;
    /// No record is stored under the requested key.
    pub const NOT_FOUND: u16 = 404;
    /// The operation failed; see `message`.
    pub const ERROR: u16 = 500;

    /// A successful response carrying `payload`.
    pub fn success(payload: impl Into<Bytes>) -> Self {
        Self {
            status: Self::OK,
            payload: payload.into(),
            message: String::new(),
        }
    }

    /// A not-found response.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: Self::NOT_FOUND,
            payload: Bytes::new(),
            message: message.into(),
        }
    }

    /// A failure response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Self::ERROR,
            payload: Bytes::new(),
            message: message.into(),
        }
    }

    /// Whether the status is [`Response::OK`].
    pub fn is_ok(&self) -> bool {
        self.status == Self::OK
    }
}

/// Routes named invocations to a record store.
///
/// The route table is built once, at construction.
pub struct Dispatcher<L: Ledger, G: IdGenerator = UuidGenerator> {
    store: RecordStore<L, G>,
    routes: HashMap<String, Operation>,
}

impl<L: Ledger, G: IdGenerator> Dispatcher<L, G> {
    /// Wrap `store` and build the route table.
    pub fn new(store: RecordStore<L, G>) -> Self {
        let mut routes = HashMap::new();
        routes.insert(Operation::Init.route(), Operation::Init);
        for kind in RecordKind::ALL {
            for op in [
                Operation::Get(kind),
                Operation::Create(kind),
                Operation::QueryAll(kind),
            ] {
                routes.insert(op.route(), op);
            }
        }
        routes.insert(
            LEGACY_TRADE_QUERY_ROUTE.to_string(),
            Operation::QueryAll(RecordKind::Trade),
        );

        Self { store, routes }
    }

    /// The wrapped store.
    pub fn store(&self) -> &RecordStore<L, G> {
        &self.store
    }

    /// Look up the operation for a function name.
    pub fn resolve(&self, function: &str) -> Option<Operation> {
        self.routes.get(function).copied()
    }

    /// All registered function names, sorted.
    pub fn routes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke `function` with positional string arguments.
    pub fn invoke<S: AsRef<str>>(&self, function: &str, args: &[S]) -> Response {
        let Some(op) = self.resolve(function) else {
            tracing::warn!(function, "invalid function name");
            return Response::error(format!("Invalid function name: {}", function));
        };

        match self.execute(op, args) {
            Ok(Some(payload)) => Response::success(payload),
            Ok(None) => Response::not_found(format!(
                "no record for key {:?}",
                args.first().map(|a| a.as_ref()).unwrap_or("")
            )),
            Err(e) => {
                tracing::warn!(function, error = %e, "invocation failed");
                Response::error(e.to_string())
            }
        }
    }

    fn execute<S: AsRef<str>>(&self, op: Operation, args: &[S]) -> Result<Option<Bytes>> {
        match op {
            Operation::Init => Ok(Some(Bytes::new())),
            Operation::Get(kind) => self.store.get(kind, args),
            Operation::Create(kind) => {
                let key = self.store.create(kind, args)?;
                Ok(Some(Bytes::from(key.into_string())))
            }
            Operation::QueryAll(kind) => {
                check_arity(&op.route(), 0, args.len())?;
                let body = self.store.query_all_json(kind)?;
                Ok(Some(Bytes::from(body)))
            }
        }
    }
}
