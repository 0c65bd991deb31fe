pub mod buildings;
pub mod project;

pub use buildings::*;
pub use project::*;
