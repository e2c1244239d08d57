//! Domain contract shared by the router, backends, and storage providers.

pub mod error;
pub mod path;
pub mod record;
pub mod storage;

pub use error::{Error, Result};
pub use path::SecretPath;
pub use record::SecretRecord;
pub use storage::{DynSecretStorage, SecretStorage};

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::path::SecretPath;
    pub use crate::record::SecretRecord;
    pub use crate::storage::{DynSecretStorage, SecretStorage};
}
