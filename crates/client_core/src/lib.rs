//! Client side of the pantry tracker: the HTTP adapter for the remote collection and
//! the controller that mirrors it.

mod controller;
pub mod dialog;
pub mod filter;
mod remote;

pub use controller::{ControllerError, InventoryAction, InventoryController};
pub use dialog::{AddDialog, DialogState};
pub use remote::HttpInventoryStore;

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod controller_tests;

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod remote_tests;
