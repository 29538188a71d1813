mod http;
mod reveal;
mod task;

pub use http::*;
pub use reveal::*;
pub use task::*;
