pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use error::*;
pub use http::*;
pub use memory::*;
pub use traits::*;
