use super::*;

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_starts_empty() {
    let store = MemoryStore::new();
    assert!(store.is_empty());
    assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
}

#[test]
fn memory_store_set_then_get() {
    let store = MemoryStore::new();
    store.set(AUTH_TOKEN_KEY, "tok").unwrap();
    assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("tok"));
    assert_eq!(store.len(), 1);
}

#[test]
fn memory_store_set_overwrites() {
    let store = MemoryStore::new();
    store.set(USER_ID_KEY, "1").unwrap();
    store.set(USER_ID_KEY, "2").unwrap();
    assert_eq!(store.get(USER_ID_KEY).unwrap().as_deref(), Some("2"));
    assert_eq!(store.len(), 1);
}

#[test]
fn memory_store_remove_absent_is_ok() {
    let store = MemoryStore::new();
    store.remove(FAVORITES_KEY).unwrap();
    assert!(store.is_empty());
}

#[test]
fn memory_store_remove_leaves_other_keys() {
    let store = MemoryStore::new();
    store.set(AUTH_TOKEN_KEY, "tok").unwrap();
    store.set(FAVORITES_KEY, "[]").unwrap();
    store.remove(AUTH_TOKEN_KEY).unwrap();
    assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
    assert_eq!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some("[]"));
}

#[test]
fn storage_keys_match_browser_names() {
    assert_eq!(AUTH_TOKEN_KEY, "authToken");
    assert_eq!(USER_ID_KEY, "userId");
    assert_eq!(FAVORITES_KEY, "canteen-favorites");
}
