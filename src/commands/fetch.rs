use anyhow::{Context, Result};

use crate::artifacts::ArtifactStore;
use crate::config::Config;
use crate::coordinates::Coordinates;
use crate::imaging::{acquire_image, SkyServerImaging};

/// Download the cutout for `coords` into the raw artifact slot.
pub fn fetch_cutout(config: &Config, coords: Coordinates) -> Result<()> {
    let imaging = SkyServerImaging::new(&config.imaging)?;
    let store = ArtifactStore::new(&config.artifacts);

    let image = acquire_image(&imaging, coords, &store)
        .with_context(|| format!("Could not fetch a cutout for {}", coords))?;

    println!(
        "Saved {}x{} cutout to {}",
        image.width(),
        image.height(),
        store.raw_path().display()
    );
    Ok(())
}
