pub mod api;
pub mod essay;
