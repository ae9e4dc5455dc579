use anyhow::Result;

use crate::coordinates::{Place, PRESET_PLACES};
use crate::utils::truncate_string;

pub fn list_places(format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(PRESET_PLACES)?),
        _ => print_table(PRESET_PLACES),
    }
    Ok(())
}

fn print_table(places: &[Place]) {
    println!("{:<28} {:<15} {:<15}", "Name", "RA", "Dec");
    println!("{:-<60}", "");

    for place in places {
        println!(
            "{:<28} {:<15.6} {:<15.6}",
            truncate_string(place.name, 28),
            place.ra,
            place.dec
        );
    }
}
