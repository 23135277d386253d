pub mod project;
pub mod entry;
pub mod material;
pub mod staff;
pub mod config;

pub use project::*;
pub use entry::*;
pub use material::*;
pub use staff::*;
pub use config::*;
