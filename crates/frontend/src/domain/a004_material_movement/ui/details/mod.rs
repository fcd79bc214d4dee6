//! Material movement form
//!
//! MVVM split:
//! - view_model.rs: form state, cascade commands, submission
//! - view.rs: Leptos components (pure UI)

mod view;
mod view_model;

pub use view::MaterialMovementDetails;
pub use view_model::MaterialMovementDetailsVm;
