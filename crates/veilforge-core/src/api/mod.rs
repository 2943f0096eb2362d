pub mod hide;
pub mod layers;
pub mod shared;
pub mod unveil;

pub use shared::Password;
