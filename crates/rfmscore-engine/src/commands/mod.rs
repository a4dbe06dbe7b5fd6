pub mod score;
pub mod segments;
