use cellar_router::{HandlerContext, Response, WriteDisposition};
use cellar_spec::{Result, SecretRecord, SecretStorage};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Response entry echoing the path the record lives at.
pub const SECRET_PATH_FIELD: &str = "secretPath";

/// Response entry listing every attribute name on the record; present when
/// the read carried field selectors.
pub const ALL_KEYS_FIELD: &str = "all_secrets_keys";

/// Fetches the record at the path and projects it into a response payload.
///
/// Extra request fields act as attribute selectors: the returned attribute
/// set is narrowed to the selected names and the full attribute-name list
/// rides along under `all_secrets_keys`.
pub fn handle_read(ctx: HandlerContext<'_>) -> Result<Option<Response>> {
    let record = match ctx.storage.get(ctx.path)? {
        Some(record) => record,
        None => {
            debug!(path = %ctx.path, "read miss");
            return Ok(Some(Response::not_found(format!(
                "no value at path {}",
                ctx.path
            ))));
        }
    };

    let selectors = ctx.payload_fields();
    let mut data: BTreeMap<String, Value> = if selectors.is_empty() {
        record.attributes().clone()
    } else {
        record
            .attributes()
            .iter()
            .filter(|(name, _)| selectors.contains_key(name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    };

    if !selectors.is_empty() {
        data.insert(
            ALL_KEYS_FIELD.to_string(),
            Value::from(record.attribute_names()),
        );
    }
    data.insert(
        SECRET_PATH_FIELD.to_string(),
        Value::from(ctx.path.as_str()),
    );

    Ok(Some(Response::with_data(data)))
}

/// Replaces (or creates) the record at the path. Success carries no
/// payload.
pub fn handle_write(ctx: HandlerContext<'_>) -> Result<Option<Response>> {
    // Validation happens before the storage call: an empty payload must
    // leave storage untouched.
    let record = SecretRecord::new(ctx.path.clone(), ctx.payload_fields())?;

    match ctx.disposition {
        Some(WriteDisposition::Overwrite) => debug!(path = %ctx.path, "overwriting record"),
        _ => debug!(path = %ctx.path, "creating record"),
    }

    ctx.storage.put(record)?;
    Ok(None)
}

/// Removes the record at the path, reporting what was removed when there
/// was anything. Deleting an absent path is success.
pub fn handle_delete(ctx: HandlerContext<'_>) -> Result<Option<Response>> {
    match ctx.storage.delete(ctx.path)? {
        Some(record) => Ok(Some(Response::with_data(record.into_attributes()))),
        None => Ok(None),
    }
}

/// Enumerates keys under the request path, relative to it.
pub fn handle_list(ctx: HandlerContext<'_>) -> Result<Option<Response>> {
    let prefix = ctx.path.as_str();
    let keys = ctx
        .storage
        .list(prefix)?
        .into_iter()
        .map(|key| match key.strip_prefix(prefix) {
            Some(relative) if !relative.is_empty() => relative.to_string(),
            _ => key,
        })
        .collect();

    Ok(Some(Response::with_keys(keys)))
}
