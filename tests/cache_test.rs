//! Tests for [`CacheRegistry`] and the cache backends.

use std::sync::Arc;
use std::time::Duration;

use rpc_cachetools::{
    BoundedCache, BoundedCacheConfig, CacheBackend, CacheKey, CacheRegistry, CachedServiceProxy,
    CachetoolsError, CallArgs, MemoryCache, MethodRouter,
};
use serde_json::json;

fn key(n: u32) -> CacheKey {
    CacheKey::for_call(&CallArgs::new().arg(n))
}

#[test]
fn cache_miss_returns_none() {
    let registry = CacheRegistry::new();
    assert!(registry.for_service("svc").get(&key(1)).is_none());
}

#[test]
fn overwrite_replaces_entry() {
    let cache = CacheRegistry::new().for_service("svc");
    cache.insert(key(1), json!("first"));
    cache.insert(key(1), json!("second"));

    assert_eq!(cache.get(&key(1)), Some(json!("second")));
    assert_eq!(cache.len(), 1);
}

#[test]
fn remove_reverts_one_key_to_cold() {
    let cache = CacheRegistry::new().for_service("svc");
    cache.insert(key(1), json!("one"));
    cache.insert(key(2), json!("two"));

    assert_eq!(cache.remove(&key(1)), Some(json!("one")));
    assert!(cache.get(&key(1)).is_none());
    assert_eq!(cache.get(&key(2)), Some(json!("two")));
    assert_eq!(cache.len(), 1);
    assert!(cache.remove(&key(1)).is_none());
}

#[test]
fn lookup_without_registration_is_none() {
    let registry = CacheRegistry::new();
    assert!(registry.get("never_called").is_none());

    registry.for_service("called");
    assert!(registry.get("called").is_some());
    assert_eq!(registry.services(), vec!["called".to_string()]);
}

#[test]
fn custom_factory_is_used_for_new_services() {
    let registry = CacheRegistry::with_factory(Arc::new(|| {
        Arc::new(BoundedCache::new(&BoundedCacheConfig::new().max_entries(5)))
            as Arc<dyn CacheBackend>
    }));
    let cache = registry.for_service("svc");
    cache.insert(key(1), json!(1));
    assert_eq!(cache.get(&key(1)), Some(json!(1)));
}

#[test]
fn replace_returns_previous_backend() {
    let cache = CacheRegistry::new().for_service("svc");
    cache.insert(key(1), json!("old"));

    let previous = cache.replace(Arc::new(MemoryCache::new()));
    assert_eq!(previous.get(&key(1)), Some(json!("old")));
    assert!(cache.get(&key(1)).is_none());
}

#[test]
fn reset_keeps_backend_kind() {
    let registry = CacheRegistry::bounded(BoundedCacheConfig::new().max_entries(100));
    let cache = registry.for_service("svc");
    let before = cache.backend();
    cache.insert(key(1), json!(1));

    cache.reset();

    assert!(cache.is_empty());
    assert!(Arc::ptr_eq(&before, &cache.backend()));
}

#[test]
fn bounded_cache_evicts_beyond_capacity() {
    let cache = BoundedCache::new(&BoundedCacheConfig::new().max_entries(10));
    for n in 0..100 {
        cache.insert(key(n), json!(n));
    }
    cache.run_pending_tasks();
    assert!(cache.len() <= 10);
}

#[test]
fn thread_safety() {
    use std::thread;

    let registry = CacheRegistry::new();
    let mut handles = Vec::new();

    // Writers race to register the same service.
    for i in 0..10 {
        let registry = registry.clone();
        handles.push(thread::spawn(move || {
            registry.for_service("svc").insert(key(i), json!(i));
        }));
    }

    // Readers may or may not see entries yet; they must not panic.
    for i in 0..10 {
        let registry = registry.clone();
        handles.push(thread::spawn(move || {
            let _ = registry.for_service("svc").get(&key(i));
        }));
    }

    for h in handles {
        h.join().expect("thread panicked");
    }

    assert_eq!(registry.services().len(), 1);
    assert_eq!(registry.for_service("svc").len(), 10);
}

// ============================================================================
// Gateways over a shared registry
// ============================================================================

fn echo_router() -> Arc<MethodRouter> {
    Arc::new(
        MethodRouter::new("svc").route("echo", |call: CallArgs| async move {
            Ok::<_, CachetoolsError>(call.args[0].clone())
        }),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_for_one_key_leave_one_entry() {
    let proxy = Arc::new(CachedServiceProxy::builder(echo_router()).build());

    let calls = (0..32).map(|_| {
        let proxy = Arc::clone(&proxy);
        async move { proxy.call("echo", CallArgs::new().arg("hi")).await }
    });
    let results = futures_util::future::join_all(calls).await;

    assert!(results.iter().all(|r| matches!(r, Ok(v) if v == &json!("hi"))));
    assert_eq!(proxy.cache().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_for_distinct_keys_each_get_an_entry() {
    let proxy = Arc::new(CachedServiceProxy::builder(echo_router()).build());

    let calls = (0..32).map(|n| {
        let proxy = Arc::clone(&proxy);
        tokio::spawn(async move { proxy.call("echo", CallArgs::new().arg(n)).await })
    });
    for handle in futures_util::future::join_all(calls).await {
        handle.unwrap().unwrap();
    }

    assert_eq!(proxy.cache().len(), 32);
}

#[tokio::test]
async fn expired_entry_behaves_as_cold() {
    let registry =
        CacheRegistry::bounded(BoundedCacheConfig::new().ttl(Duration::from_millis(50)));
    let warm = CachedServiceProxy::builder(echo_router())
        .cache_registry(registry.clone())
        .build();
    warm.call("echo", CallArgs::new().arg("hi")).await.unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;

    let broken = MethodRouter::new("svc").route("echo", |_call: CallArgs| async move {
        Err::<serde_json::Value, _>(CachetoolsError::remote("echo", "down"))
    });
    let proxy = CachedServiceProxy::builder(Arc::new(broken))
        .cache_registry(registry)
        .build();

    let err = proxy
        .call("echo", CallArgs::new().arg("hi"))
        .await
        .unwrap_err();
    assert!(err.is_remote());
}
