use cellar_kv::{telemetry, KvBackend};
use cellar_memory::MemoryStore;
use cellar_router::Request;
use cellar_spec::DynSecretStorage;
use serde_json::json;
use std::process;
use std::sync::Arc;

fn main() {
    if let Err(err) = run_example() {
        eprintln!("embedded example failed: {err:#}");
        process::exit(1);
    }
}

fn run_example() -> anyhow::Result<()> {
    telemetry::init()?;

    let storage: DynSecretStorage = Arc::new(MemoryStore::from_env()?);
    let backend = KvBackend::new(storage)?;

    let write = Request::write("configs/db_password")
        .with_field("secret_key", json!("secret_value"))
        .with_token("example_token");
    backend.handle(&write)?;

    let read = Request::read("configs/db_password").with_token("example_token");
    if let Some(response) = backend.handle(&read)? {
        // Avoid logging the secret value; report success with metadata only.
        println!("db_password retrieved ({} fields)", response.data.len());
    } else {
        println!("db_password secret not found");
    }

    let list = Request::list("configs/").with_token("example_token");
    if let Some(response) = backend.handle(&list)? {
        println!("configs: {:?}", response.keys().unwrap_or_default());
    }

    Ok(())
}
