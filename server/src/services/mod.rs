pub mod games;
pub mod images;
pub mod players;
pub mod stats;
