/// Handler modules for Discord component interactions
mod custom_id;
mod interaction;
mod movies;
mod setup;
mod tasks;
mod verification;

// Re-export main handler functions
pub use custom_id::ComponentAction;
pub use interaction::handle_interaction;
pub use setup::{task_setup_components, task_setup_summary};
pub use verification::review_buttons;
