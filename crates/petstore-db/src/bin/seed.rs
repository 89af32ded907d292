//! # Seed Data Generator
//!
//! Populates the database with the demo pet store catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./petstore.db (or $PETSTORE_DB_PATH)
//! cargo run -p petstore-db --bin seed
//!
//! # Specify database path
//! cargo run -p petstore-db --bin seed -- --db ./data/petstore.db
//!
//! # Wipe customers, catalog and id counters first
//! cargo run -p petstore-db --bin seed -- --reset
//! ```
//!
//! ## Generated Catalog
//! Five categories (Fish, Dogs, Reptiles, Cats, Birds), each with a few
//! products and their items. Records go through `CatalogService`, so ids
//! come from the per-kind counters.

use std::env;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use petstore_core::{Category, Item, Product};
use petstore_db::{CatalogService, CustomerService, Database, DbConfig, DbError};

/// Record kinds whose counters `--reset` removes.
const COUNTERS: &[&str] = &["Category", "Product", "Item", "Customer", "Order", "OrderLine"];

/// Item name, unit cost in cents, image.
type ItemSeed = (&'static str, i64, &'static str);

/// Product name, description, items.
type ProductSeed = (&'static str, &'static str, &'static [ItemSeed]);

/// Category name, description, products.
const CATALOG: &[(&str, &str, &[ProductSeed])] = &[
    (
        "Fish",
        "Any of numerous cold-blooded aquatic vertebrates",
        &[
            (
                "Angelfish",
                "Saltwater fish from Australia",
                &[
                    ("Large Angelfish", 1650, "fish1.jpg"),
                    ("Small Angelfish", 1650, "fish1.jpg"),
                ],
            ),
            (
                "Tiger Shark",
                "Saltwater fish from Australia",
                &[("Toothless Tiger Shark", 1850, "fish4.jpg")],
            ),
            (
                "Koi",
                "Freshwater fish from Japan",
                &[
                    ("Spotted Koi", 1850, "fish3.jpg"),
                    ("Spotless Koi", 1850, "fish3.jpg"),
                ],
            ),
            (
                "Goldfish",
                "Freshwater fish from China",
                &[
                    ("Adult Male Goldfish", 550, "fish2.jpg"),
                    ("Adult Female Goldfish", 529, "fish2.jpg"),
                ],
            ),
        ],
    ),
    (
        "Dogs",
        "Domesticated carnivorous mammals kept as pets",
        &[
            (
                "Bulldog",
                "Friendly dog from England",
                &[
                    ("Male Adult Bulldog", 1850, "dog2.jpg"),
                    ("Female Puppy Bulldog", 1850, "dog2.jpg"),
                ],
            ),
            (
                "Poodle",
                "Cute dog from France",
                &[("Male Puppy Poodle", 1850, "dog6.jpg")],
            ),
            (
                "Dalmation",
                "Great dog for a fire station",
                &[
                    ("Spotless Male Puppy Dalmation", 1850, "dog5.jpg"),
                    ("Spotted Adult Female Dalmation", 1850, "dog5.jpg"),
                ],
            ),
            (
                "Golden Retriever",
                "Great family dog",
                &[("Adult Female Golden Retriever", 15529, "dog1.jpg")],
            ),
            (
                "Chihuahua",
                "Great companion dog",
                &[
                    ("Adult Male Chihuahua", 12529, "dog4.jpg"),
                    ("Adult Female Chihuahua", 15529, "dog4.jpg"),
                ],
            ),
        ],
    ),
    (
        "Reptiles",
        "Cold-blooded vertebrates covered with scales",
        &[
            (
                "Rattlesnake",
                "Doubles as a watch dog",
                &[
                    ("Venomless Rattlesnake", 1850, "snake1.jpg"),
                    ("Rattleless Rattlesnake", 1850, "snake1.jpg"),
                ],
            ),
            (
                "Iguana",
                "Friendly green friend",
                &[("Green Adult Iguana", 1850, "lizard1.jpg")],
            ),
        ],
    ),
    (
        "Cats",
        "Small carnivorous mammals domesticated since early times",
        &[
            (
                "Manx",
                "Great for reducing mouse populations",
                &[
                    ("Tailless Manx", 5850, "cat1.jpg"),
                    ("With tail Manx", 2350, "cat1.jpg"),
                ],
            ),
            (
                "Persian",
                "Friendly house cat, doubles as a princess",
                &[
                    ("Adult Female Persian", 9350, "cat2.jpg"),
                    ("Adult Male Persian", 9350, "cat2.jpg"),
                ],
            ),
        ],
    ),
    (
        "Birds",
        "Warm-blooded egg-laying vertebrates with feathers",
        &[
            (
                "Amazon Parrot",
                "Great companion for up to 75 years",
                &[("Adult Male Amazon Parrot", 19350, "bird2.jpg")],
            ),
            (
                "Finch",
                "Great stress reliever",
                &[("Adult Male Finch", 1550, "bird1.jpg")],
            ),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut config = DbConfig::from_env();
    let mut reset = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--reset" => reset = true,
            "--help" | "-h" => {
                println!("Pet Store Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./petstore.db)");
                println!("      --reset        Remove customers, catalog and id counters first");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    println!("Pet Store Seed Data Generator");
    println!("=============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config).await?;
    let catalog = CatalogService::new(db.clone());

    if reset {
        reset_data(&db, &catalog).await?;
    } else {
        let existing = db.categories().count().await?;
        if existing > 0 {
            println!("Database already has {} categories", existing);
            println!("  Skipping seed to avoid duplicates.");
            println!("  Run with --reset to regenerate.");
            return Ok(());
        }
    }

    let start = std::time::Instant::now();
    let (mut products, mut items) = (0, 0);

    for (name, description, product_seeds) in CATALOG {
        let category = catalog
            .create_category(Category::new(*name, *description))
            .await?;
        let category_id = category.id.unwrap_or_default();

        for (product_name, product_description, item_seeds) in product_seeds.iter() {
            let product = catalog
                .create_product(Product::new(
                    *product_name,
                    *product_description,
                    category_id.as_str(),
                ))
                .await?;
            let product_id = product.id.unwrap_or_default();
            products += 1;

            for (item_name, unit_cost_cents, image) in item_seeds.iter() {
                catalog
                    .create_item(
                        Item::new(*item_name, *unit_cost_cents, product_id.as_str())
                            .with_image(*image),
                    )
                    .await?;
                items += 1;
            }
        }

        info!(category = %name, id = %category_id, "Category seeded");
    }

    println!();
    println!(
        "Seeded {} categories, {} products, {} items in {:?}",
        CATALOG.len(),
        products,
        items,
        start.elapsed()
    );

    // Verify search
    let found = catalog.search_items("koi").await?;
    println!("  Search 'koi': {} results", found.len());

    db.close().await;
    Ok(())
}

/// Removes every customer (and their orders), every category (and its
/// products and items) and the id counters.
async fn reset_data(db: &Database, catalog: &CatalogService) -> Result<(), DbError> {
    let customers = CustomerService::new(db.clone());
    match customers.find_all().await {
        Ok(all) => {
            for customer in all {
                customers
                    .delete(customer.id.as_deref().unwrap_or_default())
                    .await?;
            }
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    match catalog.find_categories().await {
        Ok(all) => {
            for category in all {
                catalog
                    .delete_category(category.id.as_deref().unwrap_or_default())
                    .await?;
            }
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    let ids = db.id_generator();
    for counter in COUNTERS {
        match ids.remove(counter).await {
            Ok(()) | Err(DbError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    println!("Reset customers, catalog and id counters");
    Ok(())
}
