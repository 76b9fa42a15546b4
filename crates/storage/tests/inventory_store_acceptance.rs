use std::num::NonZeroU32;

use shared::domain::ItemName;
use storage::{InventoryStore, SqliteInventoryStore};

#[tokio::test]
async fn documents_survive_reopening_the_database_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("pantry.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let rice = ItemName::parse("rice").expect("name");
    let beans = ItemName::parse("beans").expect("name");

    {
        let store = SqliteInventoryStore::new(&database_url, "inventory")
            .await
            .expect("open");
        store
            .put(&rice, NonZeroU32::new(2).expect("non-zero"))
            .await
            .expect("put rice");
        store
            .put(&beans, NonZeroU32::new(1).expect("non-zero"))
            .await
            .expect("put beans");
        store.delete(&beans).await.expect("delete beans");
        store.pool().close().await;
    }

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let reopened = SqliteInventoryStore::new(&database_url, "inventory")
        .await
        .expect("reopen");
    let items = reopened.list().await.expect("list");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, rice);
    assert_eq!(items[0].quantity.get(), 2);
}
