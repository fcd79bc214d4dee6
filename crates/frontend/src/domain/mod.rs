pub mod a004_material_movement;
