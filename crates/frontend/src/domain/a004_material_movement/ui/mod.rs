pub mod details;
pub mod locations;
