pub mod analysis;
pub mod engine;
pub mod filter;
pub mod merge;
pub mod resolve;
pub mod summary;

pub use analysis::*;
pub use engine::*;
pub use filter::*;
pub use merge::*;
pub use resolve::*;
pub use summary::*;
