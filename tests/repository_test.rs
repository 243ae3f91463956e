//! Integration tests for the generic repository
//!
//! Derived models are driven through `DocHaus` over the in-memory backend.

use dochaus::prelude::*;
use std::sync::Arc;

#[model]
#[collection(name = "widgets")]
pub struct Widget {
    pub document: Document,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// Record keyed by its own code instead of the store id
#[model]
#[collection(name = "parts", connection = "inventory")]
pub struct Part {
    #[document]
    pub audit: Document,
    pub code: String,
    pub stock: i64,
}

/// Record without audit fields
#[model]
#[collection(name = "events")]
pub struct Event {
    pub kind: String,
}

fn widget(name: &str, color: &str) -> Widget {
    Widget {
        name: name.to_string(),
        color: color.to_string(),
        ..Default::default()
    }
}

fn haus() -> DocHaus {
    let source = MapSource::new()
        .with("database.mongo.default.host", "localhost")
        .with("database.mongo.default.port", "27017")
        .with("database.mongo.default.database", "shop")
        .with("database.mongo.inventory.host", "warehouse")
        .with("database.mongo.inventory.database", "stock");
    DocHaus::new(source, MemoryConnector::new())
}

async fn widgets() -> (MemoryStore, Repository<Widget>) {
    let store = MemoryStore::new();
    let haus = haus();
    haus.register_client("default", Arc::new(store.clone())).await;
    (store, haus.repository::<Widget>().await.unwrap())
}

#[tokio::test]
async fn test_deleted_widget_scenario() {
    let (_store, repo) = widgets().await;

    let mut original = widget("a", "red");
    let id = repo.insert(&mut original).await.unwrap();

    assert_eq!(repo.delete(&id).await.unwrap(), 1);

    let mut target = Widget::default();
    assert!(!repo.find(&mut target, &id).await.unwrap());
    assert_eq!(target, Widget::default());

    let mut trashed = Widget::default();
    assert!(repo.find_one(&mut trashed, Filter::new().trashed()).await.unwrap());
    assert_eq!(trashed.name, "a");
    assert!(trashed.document.deleted_at().is_some());
    assert!(!trashed.document.is_live());
}

#[tokio::test]
async fn test_soft_deleted_records_leave_default_queries() {
    let (store, repo) = widgets().await;
    let mut batch = vec![widget("a", "red"), widget("b", "red")];
    let ids = repo.insert_many(&mut batch).await.unwrap();

    repo.delete(&ids[0]).await.unwrap();

    let mut one = Widget::default();
    assert!(!repo.find_one(&mut one, Filter::new().eq("name", "a")).await.unwrap());

    let mut listed: Vec<Widget> = Vec::new();
    repo.get(&mut listed, Filter::new()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "b");

    assert_eq!(repo.count(Filter::new()).await.unwrap(), 1);
    assert_eq!(repo.count(Filter::new().trashed()).await.unwrap(), 1);

    // a caller supplied soft-delete predicate never survives composition
    let sneaky = Filter::new().eq("deleted_at", bson::doc! { "$ne": bson::Bson::Null });
    assert_eq!(repo.count(sneaky).await.unwrap(), 1);

    // updates skip the soft-deleted record too
    let mut patch = widget("a", "blue");
    assert_eq!(repo.update(&ids[0], &mut patch).await.unwrap(), 0);

    assert_eq!(store.documents("shop", "widgets").len(), 2);
}

#[tokio::test]
async fn test_insert_then_find_round_trip() {
    let (_store, repo) = widgets().await;
    let input = widget("sprocket", "green");

    let mut record = input.clone();
    let id = repo.insert(&mut record).await.unwrap();

    let mut loaded = Widget::default();
    assert!(repo.find(&mut loaded, &id).await.unwrap());

    assert_eq!(loaded.name, input.name);
    assert_eq!(loaded.color, input.color);
    assert_eq!(loaded.document.id().map(|oid| oid.to_hex()), Some(id));
    assert!(loaded.document.created_at().is_some());
    assert!(loaded.document.updated_at().is_some());
    assert!(loaded.document.is_live());
    assert_eq!(loaded, record);
}

#[tokio::test]
async fn test_insert_many_assigns_distinct_ids() {
    let (_store, repo) = widgets().await;
    let mut batch = vec![widget("r1", ""), widget("r2", "")];

    let ids = repo.insert_many(&mut batch).await.unwrap();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    for (id, expected) in ids.iter().zip(["r1", "r2"]) {
        assert!(bson::oid::ObjectId::parse_str(id).is_ok());
        let mut loaded = Widget::default();
        assert!(repo.find(&mut loaded, id).await.unwrap());
        assert_eq!(loaded.name, expected);
    }
}

#[tokio::test]
async fn test_get_into_values_and_boxes() {
    let (_store, repo) = widgets().await;
    let mut batch = vec![widget("c", "x"), widget("a", "x"), widget("b", "y")];
    repo.insert_many(&mut batch).await.unwrap();

    let filter = Filter::new().eq("color", "x").sort("name", SortOrder::Asc);
    let mut values: Vec<Widget> = Vec::new();
    let mut boxes: Vec<Box<Widget>> = Vec::new();
    repo.get(&mut values, filter.clone()).await.unwrap();
    repo.get(&mut boxes, filter).await.unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values[0].name, "a");
    assert_eq!(values.len(), boxes.len());
    for (value, boxed) in values.iter().zip(boxes.iter()) {
        assert_eq!(value, boxed.as_ref());
    }
}

#[tokio::test]
async fn test_get_appends_to_existing_target() {
    let (_store, repo) = widgets().await;
    let mut batch = vec![widget("a", ""), widget("b", "")];
    repo.insert_many(&mut batch).await.unwrap();

    let mut target = vec![widget("existing", "")];
    let appended = repo.get(&mut target, Filter::new()).await.unwrap();

    assert_eq!(appended, 2);
    assert_eq!(target.len(), 3);
    assert_eq!(target[0].name, "existing");
}

#[tokio::test]
async fn test_update_one_without_match_is_zero() {
    let (_store, repo) = widgets().await;
    let mut record = widget("nobody", "");

    let modified = repo
        .update_one(Filter::new().eq("name", "missing"), &mut record)
        .await
        .unwrap();
    assert_eq!(modified, 0);
}

#[tokio::test]
async fn test_save_stamps_update_and_keeps_creation_time() {
    let (_store, repo) = widgets().await;
    let mut record = widget("w", "red");
    let id = repo.insert(&mut record).await.unwrap();
    let created = record.document.created_at();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    record.color = "blue".to_string();
    assert!(repo.save(&mut record).await.unwrap());

    let mut loaded = Widget::default();
    repo.find(&mut loaded, &id).await.unwrap();
    assert_eq!(loaded.color, "blue");
    assert_eq!(loaded.document.created_at(), created);
    assert!(loaded.document.updated_at() > created);
}

#[tokio::test]
async fn test_regex_filter_is_case_insensitive() {
    let (_store, repo) = widgets().await;
    let mut batch = vec![widget("Gear", ""), widget("gearbox", ""), widget("cog", "")];
    repo.insert_many(&mut batch).await.unwrap();

    let filter = Filter::new().eq("name", "cog").regex("name", "^GEAR");
    let composed = filter.clone().merge();
    assert!(matches!(
        composed.filter.get("name"),
        Some(bson::Bson::RegularExpression(re)) if re.options == "i"
    ));
    assert_eq!(repo.count(filter).await.unwrap(), 2);
}

#[tokio::test]
async fn test_filtered_soft_and_force_deletes() {
    let (store, repo) = widgets().await;
    let mut batch = vec![widget("a", "red"), widget("b", "red"), widget("c", "blue")];
    let ids = repo.insert_many(&mut batch).await.unwrap();

    assert_eq!(repo.delete_many(Filter::new().eq("color", "red")).await.unwrap(), 2);
    assert_eq!(repo.delete_one(Filter::new().eq("color", "red")).await.unwrap(), 0);
    assert_eq!(repo.force_delete(&ids[0]).await.unwrap(), 1);
    assert_eq!(
        repo.force_delete_many(Filter::new().trashed()).await.unwrap(),
        1
    );
    assert_eq!(
        repo.force_delete_one(Filter::new().eq("name", "c")).await.unwrap(),
        1
    );
    assert!(store.documents("shop", "widgets").is_empty());
}

#[tokio::test]
async fn test_custom_primary_key() {
    let haus = haus();
    let repo = haus
        .repository::<Part>()
        .await
        .unwrap()
        .with_pk("Code", "code");
    assert_eq!(repo.pk(), ("Code", "code"));

    let mut part = Part {
        code: "P-100".to_string(),
        stock: 4,
        ..Default::default()
    };
    repo.insert(&mut part).await.unwrap();

    let mut slot: Option<Part> = None;
    assert!(repo.find(ensure_initialized(&mut slot), "P-100").await.unwrap());
    let mut loaded = slot.unwrap();
    assert_eq!(loaded.stock, 4);

    loaded.stock = 7;
    assert!(repo.save(&mut loaded).await.unwrap());
    assert_eq!(repo.count(Filter::new().eq("stock", 7i64)).await.unwrap(), 1);

    assert_eq!(repo.delete("P-100").await.unwrap(), 1);
    assert_eq!(repo.force_delete("P-100").await.unwrap(), 1);
}

#[tokio::test]
async fn test_custom_primary_key_that_looks_like_an_object_id() {
    let haus = haus();
    let repo = haus
        .repository::<Part>()
        .await
        .unwrap()
        .with_pk("Code", "code");
    let code = "507f1f77bcf86cd799439011";

    let mut part = Part {
        code: code.to_string(),
        stock: 2,
        ..Default::default()
    };
    repo.insert(&mut part).await.unwrap();

    let mut loaded = Part::default();
    assert!(repo.find(&mut loaded, code).await.unwrap());
    assert_eq!(loaded.stock, 2);

    let mut patch = Part {
        code: code.to_string(),
        stock: 9,
        ..Default::default()
    };
    assert_eq!(repo.update(code, &mut patch).await.unwrap(), 1);
    assert_eq!(repo.delete(code).await.unwrap(), 1);
    assert_eq!(repo.force_delete(code).await.unwrap(), 1);
}

#[tokio::test]
async fn test_records_without_audit_fields() {
    let haus = haus();
    let repo = haus.repository::<Event>().await.unwrap();

    let mut event = Event {
        kind: "login".to_string(),
    };
    let id = repo.insert(&mut event).await.unwrap();

    let mut loaded = Event::default();
    assert!(repo.find(&mut loaded, &id).await.unwrap());
    assert_eq!(loaded, event);

    assert_eq!(repo.delete(&id).await.unwrap(), 1);
    assert!(!repo.find(&mut loaded, &id).await.unwrap());
}

#[tokio::test]
async fn test_malformed_ids_are_errors() {
    let (_store, repo) = widgets().await;
    let mut record = Widget::default();

    assert!(matches!(
        repo.find(&mut record, "zzz").await,
        Err(StoreError::InvalidId(_))
    ));
    assert!(matches!(
        repo.delete("").await,
        Err(StoreError::InvalidId(_))
    ));
}
