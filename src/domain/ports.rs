use crate::core::sink::FdSink;
use crate::domain::model::{DemoOutcome, Line};
use crate::utils::error::Result;

pub trait LineSource {
    /// Returns `None` once the source is exhausted.
    fn next_line(&mut self) -> Result<Option<Line>>;
}

pub trait Demo {
    fn name(&self) -> &'static str;
    fn run(&mut self, out: &mut FdSink) -> Result<DemoOutcome>;
}
