use anyhow::{Context, Result};

use crate::catalog::{lookup_objects, CatalogObject, SimbadTap};
use crate::config::Config;
use crate::coordinates::Coordinates;
use crate::utils::truncate_string;

/// Run only the catalog stage and print what it keeps.
pub fn list_catalog_objects(config: &Config, coords: Coordinates, format: &str) -> Result<()> {
    let catalog = SimbadTap::new(&config.catalog)?;
    let objects = lookup_objects(&catalog, coords)
        .with_context(|| format!("Catalog lookup failed for {}", coords))?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&objects)?),
        _ => output_table(coords, &objects),
    }

    Ok(())
}

fn output_table(coords: Coordinates, objects: &[CatalogObject]) {
    println!("Objects of interest near {}", coords);
    println!("{:<32} {:<8} {:<35}", "Identifier", "Type", "Description");
    println!("{:-<78}", "");

    for object in objects {
        println!(
            "{:<32} {:<8} {:<35}",
            truncate_string(&object.identifier, 32),
            object.type_code,
            truncate_string(object.type_label(), 35)
        );
    }

    println!("\nTotal: {} objects", objects.len());
}
