use super::*;
use crate::net::types::{Category, ProductImage};
use crate::storage::{MemoryStore, StorageError};

// =============================================================
// Helpers
// =============================================================

fn product(id: &str) -> Product {
    Product {
        id: id.to_owned(),
        canteen_id: "c-1".to_owned(),
        name: format!("Product {id}"),
        price: 4.5,
        active: true,
        image: ProductImage::default(),
        category: Category::Doce,
        popular: false,
    }
}

fn store() -> (Arc<MemoryStore>, FavoritesStore) {
    let storage = Arc::new(MemoryStore::new());
    let favorites = FavoritesStore::load(storage.clone());
    (storage, favorites)
}

fn persisted(storage: &MemoryStore) -> Vec<Product> {
    let raw = storage.get(FAVORITES_KEY).unwrap().unwrap_or_else(|| "[]".to_owned());
    serde_json::from_str(&raw).unwrap()
}

fn ids(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}

/// Storage whose every operation fails.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Corrupt("broken".into()))
    }
    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }
    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }
}

// =============================================================
// add / remove / toggle
// =============================================================

#[test]
fn starts_empty_without_persisted_data() {
    let (_, favorites) = store();
    assert_eq!(favorites.favorites_count(), 0);
    assert!(!favorites.is_favorite("p-1"));
}

#[test]
fn add_twice_keeps_one_entry() {
    let (storage, favorites) = store();
    assert!(favorites.add_favorite(product("p-1")));
    assert!(!favorites.add_favorite(product("p-1")));
    assert_eq!(ids(&favorites.favorites()), vec!["p-1"]);
    assert_eq!(ids(&persisted(&storage)), vec!["p-1"]);
}

#[test]
fn add_preserves_insertion_order() {
    let (_, favorites) = store();
    favorites.add_favorite(product("b"));
    favorites.add_favorite(product("a"));
    favorites.add_favorite(product("c"));
    assert_eq!(ids(&favorites.favorites()), vec!["b", "a", "c"]);
}

#[test]
fn remove_absent_id_is_noop() {
    let (storage, favorites) = store();
    favorites.add_favorite(product("p-1"));
    let before = favorites.favorites();
    assert!(!favorites.remove_favorite("missing"));
    assert_eq!(favorites.favorites(), before);
    assert_eq!(persisted(&storage), before);
}

#[test]
fn remove_present_id() {
    let (storage, favorites) = store();
    favorites.add_favorite(product("p-1"));
    favorites.add_favorite(product("p-2"));
    assert!(favorites.remove_favorite("p-1"));
    assert_eq!(ids(&favorites.favorites()), vec!["p-2"]);
    assert_eq!(ids(&persisted(&storage)), vec!["p-2"]);
}

#[test]
fn toggle_twice_restores_original() {
    let (storage, favorites) = store();
    favorites.add_favorite(product("p-1"));
    let original = favorites.favorites();

    assert!(favorites.toggle_favorite(product("p-2")));
    assert!(favorites.is_favorite("p-2"));
    assert!(!favorites.toggle_favorite(product("p-2")));

    assert_eq!(favorites.favorites(), original);
    assert_eq!(persisted(&storage), original);
}

#[test]
fn toggle_removes_existing_favorite() {
    let (_, favorites) = store();
    favorites.add_favorite(product("p-1"));
    assert!(!favorites.toggle_favorite(product("p-1")));
    assert_eq!(favorites.favorites_count(), 0);
}

#[test]
fn persisted_copy_tracks_every_mutation() {
    let (storage, favorites) = store();
    let ops: [(&str, bool); 8] = [
        ("a", true),
        ("b", true),
        ("a", true),
        ("c", true),
        ("b", false),
        ("x", false),
        ("a", false),
        ("b", true),
    ];
    for (id, add) in ops {
        if add {
            favorites.add_favorite(product(id));
        } else {
            favorites.remove_favorite(id);
        }
        assert_eq!(persisted(&storage), favorites.favorites(), "after op on {id}");
    }
    assert_eq!(ids(&favorites.favorites()), vec!["c", "b"]);
}

// =============================================================
// load / reload
// =============================================================

#[test]
fn load_reads_persisted_favorites() {
    let storage = Arc::new(MemoryStore::new());
    let body = serde_json::to_string(&vec![product("p-1"), product("p-2")]).unwrap();
    storage.set(FAVORITES_KEY, &body).unwrap();

    let favorites = FavoritesStore::load(storage);
    assert_eq!(ids(&favorites.favorites()), vec!["p-1", "p-2"]);
}

#[test]
fn load_drops_duplicate_ids() {
    let storage = Arc::new(MemoryStore::new());
    let body = serde_json::to_string(&vec![product("p-1"), product("p-1"), product("p-2")]).unwrap();
    storage.set(FAVORITES_KEY, &body).unwrap();

    let favorites = FavoritesStore::load(storage);
    assert_eq!(ids(&favorites.favorites()), vec!["p-1", "p-2"]);
}

#[test]
fn unparseable_favorites_load_as_empty() {
    let storage = Arc::new(MemoryStore::new());
    storage.set(FAVORITES_KEY, "{oops").unwrap();
    let favorites = FavoritesStore::load(storage.clone());
    assert_eq!(favorites.favorites_count(), 0);

    favorites.add_favorite(product("p-1"));
    assert_eq!(ids(&persisted(&storage)), vec!["p-1"]);
}

#[test]
fn reload_picks_up_external_writes() {
    let (storage, favorites) = store();
    favorites.add_favorite(product("p-1"));
    let body = serde_json::to_string(&vec![product("p-9")]).unwrap();
    storage.set(FAVORITES_KEY, &body).unwrap();

    favorites.reload();
    assert_eq!(ids(&favorites.favorites()), vec!["p-9"]);
}

#[test]
fn browser_written_favorites_load() {
    let storage = Arc::new(MemoryStore::new());
    storage
        .set(
            FAVORITES_KEY,
            r#"[{"id":"1","canteenId":"2","name":"Suco","price":5,"ativo":true,
                 "image":{"id":"i","imageUrl":"u","imageHint":"h","description":"d"},
                 "category":"Bebida","popular":false}]"#,
        )
        .unwrap();
    let favorites = FavoritesStore::load(storage);
    assert!(favorites.is_favorite("1"));
    assert_eq!(favorites.favorites()[0].category, Category::Bebida);
}

#[test]
fn unknown_category_survives_load_and_save() {
    let storage = Arc::new(MemoryStore::new());
    storage
        .set(
            FAVORITES_KEY,
            r#"[{"id":"1","name":"Suco","price":5,"category":"Bebida"},
                {"id":"2","name":"Wrap","price":9,"category":"Lanche"}]"#,
        )
        .unwrap();
    let favorites = FavoritesStore::load(storage.clone());
    assert_eq!(ids(&favorites.favorites()), vec!["1", "2"]);
    assert_eq!(favorites.favorites()[1].category, Category::Other("Lanche".into()));

    favorites.add_favorite(product("3"));
    let raw: serde_json::Value = serde_json::from_str(&storage.get(FAVORITES_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(raw[1]["category"], "Lanche");
    assert_eq!(ids(&persisted(&storage)), vec!["1", "2", "3"]);
}

#[test]
fn unreadable_entry_is_dropped_alone() {
    let storage = Arc::new(MemoryStore::new());
    storage
        .set(
            FAVORITES_KEY,
            r#"[{"id":"1","name":"Suco","price":5,"category":"Bebida"},
                {"name":"no id"},
                {"id":"3"}]"#,
        )
        .unwrap();
    let favorites = FavoritesStore::load(storage);
    assert_eq!(ids(&favorites.favorites()), vec!["1", "3"]);
}

// =============================================================
// storage failures
// =============================================================

#[test]
fn broken_storage_never_panics() {
    let favorites = FavoritesStore::load(Arc::new(BrokenStore));
    assert_eq!(favorites.favorites_count(), 0);
    assert!(favorites.add_favorite(product("p-1")));
    assert!(favorites.is_favorite("p-1"));
    assert!(favorites.remove_favorite("p-1"));
    assert!(favorites.toggle_favorite(product("p-2")));
    assert_eq!(favorites.favorites_count(), 1);
}
