//! # Widgets Walkthrough
//!
//! This demo shows the repository life cycle end to end:
//! - Defining records with the `#[model]` macro
//! - Resolving connections from TOML configuration through `DocHaus`
//! - Inserting, querying, updating and soft-deleting records
//! - Reaching soft-deleted records again and removing them for good
//!
//! It runs against the in-memory backend, so no database is needed.

use anyhow::Context;
use dochaus::prelude::*;

const CONFIG: &str = r#"
[database.mongo.default]
host = "localhost"
port = 27017
database = "shop"
"#;

/// A widget with audit fields
#[model]
#[collection(name = "widgets")]
pub struct Widget {
    pub document: Document,
    pub name: String,
    pub color: String,
    pub stock: i64,
}

fn widget(name: &str, color: &str, stock: i64) -> Widget {
    Widget {
        name: name.to_string(),
        color: color.to_string(),
        stock,
        ..Default::default()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("DocHaus widgets walkthrough");
    println!("===========================\n");

    let source = TomlSource::from_toml_str(CONFIG).context("parsing demo configuration")?;
    let haus = DocHaus::new(source, MemoryConnector::new());
    let widgets = haus
        .repository::<Widget>()
        .await
        .context("binding the widget repository")?;
    println!("Bound repository: {:?}", widgets);

    // Create
    let mut sprocket = widget("sprocket", "red", 10);
    let id = widgets.insert(&mut sprocket).await?;
    println!("\nInserted sprocket with id {}", id);

    let mut batch = vec![
        widget("gear", "red", 3),
        widget("gearbox", "blue", 0),
        widget("cog", "green", 12),
    ];
    let ids = widgets.insert_many(&mut batch).await?;
    println!("Inserted {} more widgets", ids.len());

    // Read
    let mut loaded = Widget::default();
    if widgets.find(&mut loaded, &id).await? {
        println!("\nFound {} created at {:?}", loaded.name, loaded.document.created_at());
    }

    let mut gears: Vec<Widget> = Vec::new();
    widgets
        .get(
            &mut gears,
            Filter::new().regex("name", "^GEAR").sort("name", SortOrder::Asc),
        )
        .await?;
    for gear in &gears {
        println!("  matched {} ({} in stock)", gear.name, gear.stock);
    }

    // Update
    loaded.stock = 8;
    widgets.save(&mut loaded).await?;
    let restocked = widgets
        .update_many(Filter::new().eq("stock", 0i64), &mut widget("gearbox", "blue", 5))
        .await?;
    println!("\nRestocked {} widget(s)", restocked);

    // Soft delete
    let removed = widgets.delete_many(Filter::new().eq("color", "red")).await?;
    println!("\nSoft-deleted {} red widget(s)", removed);
    println!("Live widgets: {}", widgets.count(Filter::new()).await?);

    let mut trashed: Vec<Widget> = Vec::new();
    widgets.get(&mut trashed, Filter::new().trashed()).await?;
    for widget in &trashed {
        println!("  in trash: {} since {:?}", widget.name, widget.document.deleted_at());
    }

    // Force delete
    let purged = widgets.force_delete_many(Filter::new().trashed()).await?;
    println!("\nPurged {} widget(s) from the trash", purged);
    println!("Widgets left: {}", widgets.count(Filter::new()).await?);

    Ok(())
}
