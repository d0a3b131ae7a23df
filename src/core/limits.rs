use crate::core::sink::FdSink;
use crate::domain::model::{Limit, LimitReport};
use crate::utils::error::{LabError, Result};
use nix::sys::resource::{getrlimit, setrlimit, Resource};
use std::io::Write;

/// The limits shown before recursing, in print order.
pub const REPORTED: [(&str, Resource); 3] = [
    ("RLIMIT_STACK", Resource::RLIMIT_STACK),
    ("RLIMIT_AS", Resource::RLIMIT_AS),
    ("RLIMIT_RSS", Resource::RLIMIT_RSS),
];

pub fn get_limit(name: &str, resource: Resource) -> Result<LimitReport> {
    let (soft, hard) = getrlimit(resource)
        .map_err(|e| LabError::sys(format!("getrlimit error for {}", name), e))?;
    Ok(LimitReport {
        name: name.to_string(),
        soft: Limit::from_raw(soft),
        hard: Limit::from_raw(hard),
    })
}

/// Lowers (or raises) only the soft limit; the hard limit is kept.
pub fn set_soft_limit(name: &str, resource: Resource, bytes: u64) -> Result<()> {
    let (_, hard) = getrlimit(resource)
        .map_err(|e| LabError::sys(format!("getrlimit error for {}", name), e))?;
    setrlimit(resource, bytes as libc::rlim_t, hard)
        .map_err(|e| LabError::sys("setrlimit failed", e))
}

pub fn format_limit_line(report: &LimitReport) -> String {
    let mut line = format!("{:<14}  ", report.name);
    match report.soft {
        Limit::Infinite => line.push_str("(infinite)  "),
        Limit::Finite(n) => line.push_str(&format!("{:>10}  ", n)),
    }
    match report.hard {
        Limit::Infinite => line.push_str("(infinite)"),
        Limit::Finite(n) => line.push_str(&format!("{:>10}", n)),
    }
    line
}

pub fn print_limits(out: &mut FdSink) -> Result<Vec<LimitReport>> {
    let mut reports = Vec::with_capacity(REPORTED.len());
    for (name, resource) in REPORTED {
        let report = get_limit(name, resource)?;
        writeln!(out, "{}", format_limit_line(&report))?;
        reports.push(report);
    }
    Ok(reports)
}
