pub mod clipboard;
pub mod effects;
pub mod fill;
pub mod shapes;
pub mod text;
