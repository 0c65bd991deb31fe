pub mod building;
pub mod field;
pub mod highlight;
pub mod session;

pub use building::*;
pub use field::*;
pub use highlight::*;
pub use session::*;
