use crate::fields::{FieldKind, FieldSchema};
use crate::request::Operation;
use crate::response::Response;
use cellar_spec::{Error, Result, SecretPath, SecretStorage};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Whether a write landed on a fresh path or replaces an existing record.
///
/// Informational context only: both resolve to the same write handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDisposition {
    Create,
    Overwrite,
}

/// Per-invocation context handed to an operation handler.
pub struct HandlerContext<'a> {
    pub storage: &'a dyn SecretStorage,
    pub path: &'a SecretPath,
    pub fields: &'a BTreeMap<String, Value>,
    pub schema: &'a FieldSchema,
    /// Caller identity, present for every verb behind the auth gate.
    pub subject: Option<&'a str>,
    /// Resolved for write requests, `None` otherwise.
    pub disposition: Option<WriteDisposition>,
}

impl HandlerContext<'_> {
    /// Supplied fields the route schema does not declare: the secret
    /// payload on a write, the attribute selectors on a read.
    pub fn payload_fields(&self) -> BTreeMap<String, Value> {
        self.fields
            .iter()
            .filter(|(name, _)| !self.schema.declares(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// One registered operation handler.
pub trait OperationHandler: Send + Sync {
    fn handle(&self, ctx: HandlerContext<'_>) -> Result<Option<Response>>;
}

impl<F> OperationHandler for F
where
    F: Fn(HandlerContext<'_>) -> Result<Option<Response>> + Send + Sync,
{
    fn handle(&self, ctx: HandlerContext<'_>) -> Result<Option<Response>> {
        self(ctx)
    }
}

/// Predicate deciding whether a record currently exists at a path.
pub type ExistenceCheck =
    Arc<dyn Fn(&dyn SecretStorage, &SecretPath) -> Result<bool> + Send + Sync>;

/// One routable path pattern and its verb bindings.
///
/// Built once at backend-construction time and never mutated afterwards.
pub struct Route {
    pattern: Regex,
    pub(crate) schema: FieldSchema,
    read: Option<Arc<dyn OperationHandler>>,
    write: Option<Arc<dyn OperationHandler>>,
    delete: Option<Arc<dyn OperationHandler>>,
    list: Option<Arc<dyn OperationHandler>>,
    pub(crate) existence: Option<ExistenceCheck>,
}

impl Route {
    pub fn builder(pattern: impl Into<String>) -> RouteBuilder {
        RouteBuilder {
            pattern: pattern.into(),
            schema: FieldSchema::new(),
            read: None,
            write: None,
            delete: None,
            list: None,
            existence: None,
        }
    }

    /// Unanchored match against the full request path.
    pub(crate) fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    pub(crate) fn handler(&self, operation: Operation) -> Option<&Arc<dyn OperationHandler>> {
        match operation {
            Operation::Read => self.read.as_ref(),
            Operation::Write => self.write.as_ref(),
            Operation::Delete => self.delete.as_ref(),
            Operation::List => self.list.as_ref(),
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("schema", &self.schema)
            .field("read", &self.read.is_some())
            .field("write", &self.write.is_some())
            .field("delete", &self.delete.is_some())
            .field("list", &self.list.is_some())
            .field("existence", &self.existence.is_some())
            .finish()
    }
}

pub struct RouteBuilder {
    pattern: String,
    schema: FieldSchema,
    read: Option<Arc<dyn OperationHandler>>,
    write: Option<Arc<dyn OperationHandler>>,
    delete: Option<Arc<dyn OperationHandler>>,
    list: Option<Arc<dyn OperationHandler>>,
    existence: Option<ExistenceCheck>,
}

impl RouteBuilder {
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.schema = self.schema.field(name, kind);
        self
    }

    pub fn read(mut self, handler: impl OperationHandler + 'static) -> Self {
        self.read = Some(Arc::new(handler));
        self
    }

    pub fn write(mut self, handler: impl OperationHandler + 'static) -> Self {
        self.write = Some(Arc::new(handler));
        self
    }

    pub fn delete(mut self, handler: impl OperationHandler + 'static) -> Self {
        self.delete = Some(Arc::new(handler));
        self
    }

    pub fn list(mut self, handler: impl OperationHandler + 'static) -> Self {
        self.list = Some(Arc::new(handler));
        self
    }

    pub fn existence_check(
        mut self,
        check: impl Fn(&dyn SecretStorage, &SecretPath) -> Result<bool> + Send + Sync + 'static,
    ) -> Self {
        self.existence = Some(Arc::new(check));
        self
    }

    pub fn build(self) -> Result<Route> {
        if self.pattern.trim().is_empty() {
            return Err(Error::Configuration("route pattern must not be empty".into()));
        }

        let pattern = Regex::new(&self.pattern)
            .map_err(|err| Error::Configuration(format!("invalid route pattern: {err}")))?;

        // Combined create/update semantics cannot be resolved without a
        // discriminator.
        if self.write.is_some() && self.existence.is_none() {
            return Err(Error::Configuration(
                "a write handler requires an existence check".into(),
            ));
        }

        Ok(Route {
            pattern,
            schema: self.schema,
            read: self.read,
            write: self.write,
            delete: self.delete,
            list: self.list,
            existence: self.existence,
        })
    }
}
