// Export Controller: formatted report + metadata → downloadable document.

pub mod document;
pub mod font_metrics;
pub mod handlers;
