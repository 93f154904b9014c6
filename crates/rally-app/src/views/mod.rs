//! View-state primitives shared by screen controllers.

pub mod load_state;

pub use load_state::{spawn_action, ActionState, LoadState, Loadable};
