//! Integration Tests for the Typed Cache
//!
//! Exercises the public surface end to end: typed keys, expiration, limits,
//! the eviction delegate and the background tasks.

use std::any::Any;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use memory_cache::{
    spawn_pressure_task, CacheConfig, Expiration, HashKey, KeyType, MemoryCache,
    MemoryCacheDelegate, MemoryCacheError, MemoryPressure, StringKey,
};

// == Fixtures ==

#[derive(Debug, Clone, PartialEq)]
struct Dog {
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Cat {
    name: String,
}

fn dog_key() -> StringKey<Dog> {
    StringKey::new("dog")
}

fn cat_key() -> StringKey<Cat> {
    StringKey::new("cat")
}

fn dog() -> Dog {
    Dog {
        name: "DOG".to_string(),
    }
}

fn cat() -> Cat {
    Cat {
        name: "CAT".to_string(),
    }
}

fn unbounded() -> MemoryCache {
    MemoryCache::with_limits(0, 0)
}

#[derive(Default)]
struct EvictionLog {
    values: Mutex<Vec<String>>,
}

impl MemoryCacheDelegate for EvictionLog {
    fn will_evict(&self, value: &(dyn Any + Send + Sync)) {
        let name = value
            .downcast_ref::<Dog>()
            .map(|d| d.name.clone())
            .or_else(|| value.downcast_ref::<Cat>().map(|c| c.name.clone()))
            .unwrap_or_default();
        self.values.lock().unwrap().push(name);
    }
}

// == Limit Scenarios ==

#[test]
fn test_count_limit_evicts_least_recent() {
    let cache = MemoryCache::with_limits(0, 1);

    cache.set(Some(dog()), &dog_key(), Expiration::Never, 1);
    cache.set(Some(cat()), &cat_key(), Expiration::Never, 1);

    assert!(cache.get(&dog_key()).is_none());
    assert_eq!(cache.get(&cat_key()).map(|c| c.name.clone()), Some("CAT".to_string()));
}

#[test]
fn test_cost_limit_keeps_most_recent_and_notifies_once() {
    let cache = MemoryCache::with_limits(1, 0);
    let log = Arc::new(EvictionLog::default());
    cache.set_delegate(&log);

    cache.set(Some(dog()), &dog_key(), Expiration::Never, 1);
    cache.set(Some(cat()), &cat_key(), Expiration::Never, 1);

    assert!(cache.get(&dog_key()).is_none());
    assert!(cache.get(&cat_key()).is_some());
    assert_eq!(*log.values.lock().unwrap(), vec!["DOG".to_string()]);
}

#[test]
fn test_read_protects_entry_from_eviction() {
    let cache = MemoryCache::with_limits(0, 2);
    let first = HashKey::<Dog>::new(1);
    let second = HashKey::<Dog>::new(2);
    let third = HashKey::<Dog>::new(3);

    cache.put(&first, Some(dog()));
    cache.put(&second, Some(dog()));
    assert!(cache.get(&first).is_some());
    cache.put(&third, Some(dog()));

    assert!(cache.get(&first).is_some());
    assert!(cache.get(&second).is_none());
    assert!(cache.get(&third).is_some());
}

#[test]
fn test_total_cost_and_clear() {
    let cache = unbounded();
    cache.set(Some(dog()), &dog_key(), Expiration::Never, 4);
    cache.set(Some(cat()), &cat_key(), Expiration::Never, 6);
    assert_eq!(cache.total_cost(), 10);
    assert_eq!(cache.count(), 2);

    cache.remove_all();
    cache.remove_all();

    assert_eq!(cache.count(), 0);
    assert_eq!(cache.total_cost(), 0);
    assert!(cache.is_empty());
}

// == Typed Lookup ==

#[test]
fn test_type_mismatch_on_shared_raw_key() {
    let cache = unbounded();
    cache.put(&StringKey::<Cat>::new("pet"), Some(cat()));

    let result = cache.value(&StringKey::<Dog>::new("pet"));
    assert!(matches!(result, Err(MemoryCacheError::UnexpectedType(_))));
}

#[test]
fn test_expired_read_purges_entry() {
    let cache = unbounded();
    let past = Utc::now() - chrono::Duration::seconds(60);
    cache.set(Some(dog()), &dog_key(), Expiration::At(past), 0);

    assert!(matches!(cache.value(&dog_key()), Err(MemoryCacheError::Expired(at)) if at == past));
    assert!(matches!(cache.value(&dog_key()), Err(MemoryCacheError::NotFound)));
}

#[test]
fn test_never_expiring_value_survives() {
    let cache = unbounded();
    cache.set(Some(dog()), &dog_key(), Expiration::Never, 0);

    thread::sleep(Duration::from_millis(50));

    let entry = cache.value(&dog_key()).unwrap();
    assert_eq!(*entry.value, dog());
}

#[test]
fn test_set_none_is_remove() {
    let cache = unbounded();
    cache.put(&dog_key(), Some(dog()));
    cache.put(&dog_key(), None);

    assert!(matches!(cache.value(&dog_key()), Err(MemoryCacheError::NotFound)));
}

#[test]
fn test_from_config() {
    let config = CacheConfig {
        total_cost_limit: 2,
        count_limit: 0,
        sweep_interval: 60,
    };
    let cache = MemoryCache::from_config(&config);

    for i in 0..5 {
        cache.set(Some(dog()), &HashKey::<Dog>::new(i), Expiration::Never, 1);
    }
    assert_eq!(cache.count(), 2);
    assert_eq!(cache.total_cost(), 2);
}

// == Concurrency ==

#[test]
fn test_shared_cache_across_threads() {
    let cache = Arc::new(MemoryCache::with_limits(100, 50));
    let mut handles = Vec::new();

    for t in 0..8i64 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..500i64 {
                let key = HashKey::<i64>::new((t * 500 + i) % 120);
                cache.set(Some(*key.element()), &key, Expiration::Never, 1);
                if let Some(value) = cache.get(&key) {
                    assert_eq!(*value, *key.element());
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.count() <= 50);
    assert!(cache.total_cost() <= 100);
    assert_eq!(cache.total_cost(), cache.count());
}

// == Background Tasks ==

#[tokio::test]
async fn test_memory_pressure_clears_shared_cache() {
    let cache = Arc::new(unbounded());
    cache.put(&dog_key(), Some(dog()));
    cache.put(&cat_key(), Some(cat()));

    let (tx, rx) = tokio::sync::mpsc::channel(1);
    let handle = spawn_pressure_task(cache.clone(), rx);

    tx.send(MemoryPressure).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    assert!(cache.is_empty());
}
