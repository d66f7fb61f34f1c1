//! Cache Operation Handlers
//!
//! The remotely callable operations the cache server registers, each
//! working against the process-wide namespace registry. Arguments arrive
//! positionally with keyword overrides, matching the client wrappers.

use serde_json::Value;

use crate::cache::{NamespaceRegistry, NamespaceUpdate};
use crate::error::{Error, Result};
use crate::protocol::{CallParams, Lookup};

/// `create_namespace(name, max_items, global_expiry, autoclean, unlimited)`
///
/// Fails if the name is already present; omitted settings take the
/// server defaults.
pub(crate) async fn create_namespace(
    namespaces: &NamespaceRegistry,
    params: CallParams,
) -> Result<Value> {
    let name = params.str_arg(0, "name")?;

    let mut settings = namespaces.defaults();
    if let Some(max_items) = params.opt_u64_arg(1, "max_items")? {
        settings.max_items = max_items as usize;
    }
    if let Some(global_expiry) = params.opt_u64_arg(2, "global_expiry")? {
        settings.global_expiry = global_expiry;
    }
    if let Some(autoclean) = params.opt_bool_arg(3, "autoclean")? {
        settings.autoclean = autoclean;
    }
    if let Some(unlimited) = params.opt_bool_arg(4, "unlimited")? {
        settings.unlimited = unlimited;
    }

    namespaces.create(&name, settings).await?;
    Ok(Value::Null)
}

/// `configure_namespace(name, ...)` — creates with defaults if absent,
/// else mutates only the provided fields.
pub(crate) async fn configure_namespace(
    namespaces: &NamespaceRegistry,
    params: CallParams,
) -> Result<Value> {
    let name = params.str_arg(0, "name")?;

    let update = NamespaceUpdate {
        max_items: params.opt_u64_arg(1, "max_items")?.map(|v| v as usize),
        global_expiry: params.opt_u64_arg(2, "global_expiry")?,
        autoclean: params.opt_bool_arg(3, "autoclean")?,
        unlimited: params.opt_bool_arg(4, "unlimited")?,
    };

    namespaces.configure(&name, update).await;
    Ok(Value::Null)
}

/// `put(namespace, key, value, expiry)` — lazily creates a
/// default-configured namespace on first use.
pub(crate) async fn put(
    namespaces: &NamespaceRegistry,
    default_item_expiry: u64,
    params: CallParams,
) -> Result<Value> {
    let name = params.str_arg(0, "namespace")?;
    let key = params.str_arg(1, "key")?;
    let value = params.value_arg(2, "value")?;
    let expiry = params
        .opt_u64_arg(3, "expiry")?
        .unwrap_or(default_item_expiry);

    let namespace = namespaces.get_or_create(&name).await;
    namespace.lock().await.put(&key, value, expiry);
    Ok(Value::Null)
}

/// `get(namespace, key)` — a tagged lookup record; absence of the key or
/// of the whole namespace both report a miss.
pub(crate) async fn get(namespaces: &NamespaceRegistry, params: CallParams) -> Result<Value> {
    let name = params.str_arg(0, "namespace")?;
    let key = params.str_arg(1, "key")?;

    let lookup = match namespaces.lookup(&name).await {
        None => Lookup::miss(),
        Some(namespace) => match namespace.lock().await.get(&key) {
            Ok(value) => Lookup::hit(value),
            Err(Error::NotFound(_)) => Lookup::miss(),
            Err(e) => return Err(e),
        },
    };
    Ok(serde_json::to_value(lookup)?)
}

/// `invalidate(namespace)` — clears all entries; a no-op when the
/// namespace does not exist.
pub(crate) async fn invalidate(
    namespaces: &NamespaceRegistry,
    params: CallParams,
) -> Result<Value> {
    let name = params.str_arg(0, "namespace")?;

    if let Some(namespace) = namespaces.lookup(&name).await {
        namespace.lock().await.invalidate();
    }
    Ok(Value::Null)
}

/// `get_stats(namespace)` — the counters, or nil when the namespace does
/// not exist.
pub(crate) async fn get_stats(
    namespaces: &NamespaceRegistry,
    params: CallParams,
) -> Result<Value> {
    let name = params.str_arg(0, "namespace")?;

    match namespaces.lookup(&name).await {
        None => Ok(Value::Null),
        Some(namespace) => {
            let stats = namespace.lock().await.stats();
            Ok(serde_json::to_value(stats)?)
        }
    }
}

/// `reset_stats(namespace)` — zeroes the counters; reports whether the
/// namespace existed.
pub(crate) async fn reset_stats(
    namespaces: &NamespaceRegistry,
    params: CallParams,
) -> Result<Value> {
    let name = params.str_arg(0, "namespace")?;

    match namespaces.lookup(&name).await {
        None => Ok(Value::Bool(false)),
        Some(namespace) => {
            namespace.lock().await.reset_stats();
            Ok(Value::Bool(true))
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NamespaceSettings;
    use serde_json::json;
    use std::collections::HashMap;

    fn registry() -> NamespaceRegistry {
        NamespaceRegistry::new(NamespaceSettings::default())
    }

    fn params(args: Vec<Value>) -> CallParams {
        CallParams::new(args, HashMap::new())
    }

    #[tokio::test]
    async fn test_create_namespace_and_duplicate() {
        let namespaces = registry();

        create_namespace(&namespaces, params(vec![json!("ns"), json!(10)]))
            .await
            .unwrap();
        let settings = namespaces
            .lookup("ns")
            .await
            .unwrap()
            .lock()
            .await
            .settings();
        assert_eq!(settings.max_items, 10);

        let result = create_namespace(&namespaces, params(vec![json!("ns")])).await;
        assert!(matches!(result, Err(Error::Registry(_))));
    }

    #[tokio::test]
    async fn test_put_creates_namespace_lazily() {
        let namespaces = registry();

        put(
            &namespaces,
            86400,
            params(vec![json!("ns"), json!("k"), json!("v")]),
        )
        .await
        .unwrap();

        assert_eq!(namespaces.len().await, 1);
        let result = get(&namespaces, params(vec![json!("ns"), json!("k")]))
            .await
            .unwrap();
        assert_eq!(result, json!({"found": true, "value": "v"}));
    }

    #[tokio::test]
    async fn test_get_reports_misses() {
        let namespaces = registry();

        // Namespace missing entirely.
        let result = get(&namespaces, params(vec![json!("nope"), json!("k")]))
            .await
            .unwrap();
        assert_eq!(result, json!({"found": false, "value": null}));

        // Namespace present, key missing.
        create_namespace(&namespaces, params(vec![json!("ns")]))
            .await
            .unwrap();
        let result = get(&namespaces, params(vec![json!("ns"), json!("k")]))
            .await
            .unwrap();
        assert_eq!(result, json!({"found": false, "value": null}));
    }

    #[tokio::test]
    async fn test_cached_null_is_still_a_hit() {
        let namespaces = registry();

        put(
            &namespaces,
            86400,
            params(vec![json!("ns"), json!("k"), Value::Null]),
        )
        .await
        .unwrap();

        let result = get(&namespaces, params(vec![json!("ns"), json!("k")]))
            .await
            .unwrap();
        assert_eq!(result, json!({"found": true, "value": null}));
    }

    #[tokio::test]
    async fn test_invalidate_is_noop_for_missing_namespace() {
        let namespaces = registry();
        invalidate(&namespaces, params(vec![json!("nope")]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stats_roundtrip_and_reset() {
        let namespaces = registry();

        put(
            &namespaces,
            86400,
            params(vec![json!("ns"), json!("k"), json!("v")]),
        )
        .await
        .unwrap();
        get(&namespaces, params(vec![json!("ns"), json!("k")]))
            .await
            .unwrap();

        let stats = get_stats(&namespaces, params(vec![json!("ns")]))
            .await
            .unwrap();
        assert_eq!(stats, json!({"hits": 1, "gets": 1, "puts": 1}));

        assert_eq!(
            reset_stats(&namespaces, params(vec![json!("ns")]))
                .await
                .unwrap(),
            json!(true)
        );
        let stats = get_stats(&namespaces, params(vec![json!("ns")]))
            .await
            .unwrap();
        assert_eq!(stats, json!({"hits": 0, "gets": 0, "puts": 0}));

        // Absent namespaces answer with nil / false.
        assert_eq!(
            get_stats(&namespaces, params(vec![json!("nope")]))
                .await
                .unwrap(),
            Value::Null
        );
        assert_eq!(
            reset_stats(&namespaces, params(vec![json!("nope")]))
                .await
                .unwrap(),
            json!(false)
        );
    }

    #[tokio::test]
    async fn test_configure_namespace_overrides_by_keyword() {
        let namespaces = registry();

        let mut kwargs = HashMap::new();
        kwargs.insert("unlimited".to_string(), json!(true));
        configure_namespace(&namespaces, CallParams::new(vec![json!("ns")], kwargs))
            .await
            .unwrap();

        let settings = namespaces
            .lookup("ns")
            .await
            .unwrap()
            .lock()
            .await
            .settings();
        assert!(settings.unlimited);
    }
}
