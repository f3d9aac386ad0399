//! Application wiring: builds the collaborators from the configuration and
//! runs a session until it stops.

pub mod controller_handler;

pub use controller_handler::Controller;
