pub mod capacity;
pub mod hide;
pub mod layers;
pub mod password;
pub mod unveil;
