pub mod api;
pub mod assembler;
pub mod cascade;
pub mod resolver;
pub mod stock;
pub mod ui;
