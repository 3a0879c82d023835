pub mod discovery;
pub mod sandbox;

pub use sandbox::Sandbox;
