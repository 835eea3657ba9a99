pub mod common;
pub mod enriched;
pub mod load;
pub mod operator;
pub mod rider;
pub mod route;
pub mod snapshot;
pub mod vehicle;

pub use common::*;
pub use enriched::*;
pub use load::*;
pub use operator::*;
pub use rider::*;
pub use route::*;
pub use snapshot::*;
pub use vehicle::*;
