use crate::handlers;
use cellar_router::{FieldKind, Request, Response, Route, Router};
use cellar_spec::{DynSecretStorage, Result, SecretStorage};

/// Help text surfaced to operators mounting the backend.
pub const BACKEND_HELP: &str = "\
The cellar key/value backend stores opaque secret records under a
path-addressed namespace. Reads return the record's fields, writes replace
the record wholesale, and lists enumerate keys under a path prefix.";

/// Reference key/value backend: one catch-all route over an injected
/// storage collaborator.
pub struct KvBackend {
    router: Router,
}

impl KvBackend {
    pub fn new(storage: DynSecretStorage) -> Result<Self> {
        let route = Route::builder(".*")
            .field("path", FieldKind::String)
            .read(handlers::handle_read)
            .write(handlers::handle_write)
            .delete(handlers::handle_delete)
            .list(handlers::handle_list)
            .existence_check(|storage, path| Ok(storage.get(path)?.is_some()))
            .build()?;

        let router = Router::builder(storage).route(route).build();
        Ok(Self { router })
    }

    /// Routes one host request to the matching operation handler.
    pub fn handle(&self, request: &Request) -> Result<Option<Response>> {
        self.router.dispatch(request)
    }

    /// Existence probe the host runs before routing an upsert.
    pub fn exists(&self, request: &Request) -> Result<bool> {
        self.router.exists(request)
    }
}
