pub mod apply;
pub mod batch;
pub mod cell;
pub mod error;
pub mod host;
pub mod io;
pub mod logging;
pub mod model;
pub mod report;
pub mod sanitize;

pub use error::{Result, ToolError};
