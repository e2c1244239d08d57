use crate::request::{Operation, Request};
use crate::response::Response;
use crate::route::{HandlerContext, Route, WriteDisposition};
use cellar_spec::{DynSecretStorage, Error, Result, SecretPath, SecretStorage};
use tracing::{debug, debug_span};

/// Stateless dispatcher: an immutable route table plus a handle to the
/// storage collaborator. Safe to share across concurrent requests; all
/// mutation happens inside the collaborator.
pub struct Router {
    routes: Vec<Route>,
    storage: DynSecretStorage,
}

impl Router {
    pub fn builder(storage: DynSecretStorage) -> RouterBuilder {
        RouterBuilder {
            routes: Vec::new(),
            storage,
        }
    }

    /// Routes a request to the operation handler bound for its verb.
    ///
    /// `Ok(None)` signals success without a payload (writes, deletes with
    /// nothing to report).
    pub fn dispatch(&self, request: &Request) -> Result<Option<Response>> {
        let span = debug_span!(
            "dispatch",
            operation = %request.operation,
            path = %request.path
        );
        let _guard = span.enter();

        let route = self.match_route(&request.path)?;

        // Every verb behind the dispatch surface requires a caller
        // identity; only the existence probe is exempt.
        let subject = request.token().ok_or(Error::Authentication {
            operation: request.operation.as_str(),
        })?;

        route.schema.validate(&request.fields)?;
        let path = SecretPath::parse(&request.path)?;

        let handler = route
            .handler(request.operation)
            .ok_or(Error::UnsupportedOperation {
                operation: request.operation.as_str(),
            })?;

        let disposition = match request.operation {
            Operation::Write => Some(self.resolve_disposition(route, &path)?),
            _ => None,
        };

        debug!(operation = %request.operation, path = %path, "invoking handler");

        handler.handle(HandlerContext {
            storage: self.storage.as_ref(),
            path: &path,
            fields: &request.fields,
            schema: &route.schema,
            subject: Some(subject),
            disposition,
        })
    }

    /// Existence probe. The host invokes this before authentication
    /// context is available, so it never consults the client token.
    pub fn exists(&self, request: &Request) -> Result<bool> {
        let route = self.match_route(&request.path)?;
        let path = SecretPath::parse(&request.path)?;

        match &route.existence {
            Some(check) => (check.as_ref())(self.storage.as_ref(), &path),
            None => probe_storage(self.storage.as_ref(), &path),
        }
    }

    fn match_route(&self, path: &str) -> Result<&Route> {
        self.routes
            .iter()
            .find(|route| route.matches(path))
            .ok_or_else(|| Error::UnroutedPath {
                path: path.to_string(),
            })
    }

    fn resolve_disposition(&self, route: &Route, path: &SecretPath) -> Result<WriteDisposition> {
        let check = route.existence.as_ref().ok_or_else(|| {
            Error::Configuration("write route is missing its existence check".into())
        })?;

        let exists = (check.as_ref())(self.storage.as_ref(), path)?;
        debug!(path = %path, exists, "resolved write disposition");

        Ok(if exists {
            WriteDisposition::Overwrite
        } else {
            WriteDisposition::Create
        })
    }
}

fn probe_storage(storage: &dyn SecretStorage, path: &SecretPath) -> Result<bool> {
    Ok(storage.get(path)?.is_some())
}

pub struct RouterBuilder {
    routes: Vec<Route>,
    storage: DynSecretStorage,
}

impl RouterBuilder {
    /// Registers a route. Routes match in registration order; the first
    /// pattern that matches the request path wins.
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn build(self) -> Router {
        Router {
            routes: self.routes,
            storage: self.storage,
        }
    }
}
