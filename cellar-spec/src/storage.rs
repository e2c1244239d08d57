use crate::error::Result;
use crate::path::SecretPath;
use crate::record::SecretRecord;
use std::sync::Arc;

/// Storage collaborator contract consumed by the router and its handlers.
///
/// Each call is individually atomic; there is no cross-call transaction
/// guarantee. Implementations own all mutable state and all concurrency
/// coordination.
pub trait SecretStorage: Send + Sync {
    fn get(&self, path: &SecretPath) -> Result<Option<SecretRecord>>;
    fn put(&self, record: SecretRecord) -> Result<()>;
    /// Removes the record, returning what was stored there, if anything.
    fn delete(&self, path: &SecretPath) -> Result<Option<SecretRecord>>;
    /// Keys reachable under the prefix, sorted.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    fn exists(&self, path: &SecretPath) -> Result<bool> {
        Ok(self.get(path)?.is_some())
    }
}

pub type DynSecretStorage = Arc<dyn SecretStorage + Send + Sync>;

impl<T> SecretStorage for Arc<T>
where
    T: SecretStorage + ?Sized,
{
    fn get(&self, path: &SecretPath) -> Result<Option<SecretRecord>> {
        (**self).get(path)
    }

    fn put(&self, record: SecretRecord) -> Result<()> {
        (**self).put(record)
    }

    fn delete(&self, path: &SecretPath) -> Result<Option<SecretRecord>> {
        (**self).delete(path)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).list(prefix)
    }

    fn exists(&self, path: &SecretPath) -> Result<bool> {
        (**self).exists(path)
    }
}

impl<T> SecretStorage for Box<T>
where
    T: SecretStorage + ?Sized,
{
    fn get(&self, path: &SecretPath) -> Result<Option<SecretRecord>> {
        (**self).get(path)
    }

    fn put(&self, record: SecretRecord) -> Result<()> {
        (**self).put(record)
    }

    fn delete(&self, path: &SecretPath) -> Result<Option<SecretRecord>> {
        (**self).delete(path)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).list(prefix)
    }

    fn exists(&self, path: &SecretPath) -> Result<bool> {
        (**self).exists(path)
    }
}
