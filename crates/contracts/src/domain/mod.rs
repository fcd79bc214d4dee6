pub mod a001_material;
pub mod a002_storage_hierarchy;
pub mod a003_stock_location;
pub mod a004_material_movement;
pub mod common;
