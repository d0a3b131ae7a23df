pub mod cow;
pub mod fd_reader;
pub mod interleave;
pub mod limits;
pub mod process;
pub mod recursion;
pub mod runner;
pub mod sink;
pub mod stream_reader;

pub use crate::domain::model::{DemoOutcome, Line};
pub use crate::domain::ports::{Demo, LineSource};
pub use crate::utils::error::Result;
