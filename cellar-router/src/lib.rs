//! Path-pattern request router.
//!
//! Matches an inbound request's path against a registered route table,
//! validates declared fields, resolves create-versus-update semantics via
//! an existence predicate, and dispatches to the operation handler bound
//! for the request's verb. The router holds no mutable state; all mutation
//! happens inside the storage collaborator the handlers are given.

pub mod fields;
pub mod request;
pub mod response;
pub mod route;
pub mod router;

pub use fields::{FieldKind, FieldSchema};
pub use request::{Operation, Request};
pub use response::Response;
pub use route::{
    ExistenceCheck, HandlerContext, OperationHandler, Route, RouteBuilder, WriteDisposition,
};
pub use router::{Router, RouterBuilder};
