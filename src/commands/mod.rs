pub mod catalog;
pub mod describe;
pub mod fetch;
pub mod places;

pub use catalog::list_catalog_objects;
pub use describe::describe_coordinates;
pub use fetch::fetch_cutout;
pub use places::list_places;
