use memory_store::KeyedStore;
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_merges_on_one_key_are_serialized() {
    let store: KeyedStore<&'static str, u64> = KeyedStore::new();
    store.put("counter", 0).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    store.merge(&"counter", |v| *v += 1).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(store.get(&"counter"), Some(8_000));
}

#[test]
fn concurrent_puts_on_one_key_have_a_single_winner() {
    let store: Arc<KeyedStore<u32, usize>> = Arc::new(KeyedStore::new());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.put(42, i).is_ok())
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn distinct_keys_proceed_independently() {
    let store: KeyedStore<u32, Vec<u32>> = KeyedStore::new();

    let tasks: Vec<_> = (0..32u32)
        .map(|key| {
            let store = store.clone();
            tokio::spawn(async move {
                store.put(key, Vec::new()).unwrap();
                for n in 0..10 {
                    store.merge(&key, |v| v.push(n)).unwrap();
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.len(), 32);
    for key in 0..32 {
        assert_eq!(store.get(&key).unwrap(), (0..10).collect::<Vec<_>>());
    }
}
