pub mod icon;
pub mod tray_app;

pub use tray_app::{MenuCallback, TrayApp};
