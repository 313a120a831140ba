// Presentation layer - Shapes served to the dashboard
pub mod endpoints;
