pub mod cli;
pub mod config;
pub mod controller;
pub mod entity;
pub mod error;
pub mod panel;
pub mod protocol;
pub mod storage;
pub mod surface;
pub mod theme;

pub use controller::StoreController;
pub use error::{PostitError, Result};
pub use panel::PanelManager;
pub use surface::Surface;
