use anyhow::Result;

use crate::config::Config;
use crate::coordinates::Coordinates;
use crate::pipeline::{DescriptionResult, Pipeline};

/// Run the full pipeline once and print the result.
pub fn describe_coordinates(config: &Config, coords: Coordinates, format: &str) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let result = pipeline.process_coordinates(coords)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text(&result),
    }

    Ok(())
}

fn print_text(result: &DescriptionResult) {
    println!("Field: {}", result.coordinates);
    println!("Annotated image: {}", result.annotated_image.display());
    println!(
        "Generated: {}",
        result.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if result.objects.is_empty() {
        println!("\nNo catalog objects of interest in this field.");
    } else {
        println!("\nKnown objects:");
        for object in &result.objects {
            println!("  - {}", object);
        }
    }

    println!("\n{}", result.description);
}
