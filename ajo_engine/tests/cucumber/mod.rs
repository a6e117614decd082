pub mod ajo_world;
pub mod setups;
pub mod steps;

pub use ajo_world::AjoWorld;
