pub mod generate;
pub mod optimize;
pub mod score;
