pub mod labeled;
pub mod point;
