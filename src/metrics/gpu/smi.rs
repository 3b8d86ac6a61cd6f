//! NVIDIA readings through the `nvidia-smi` management tool.
//!
//! The proprietary driver exposes nothing useful in sysfs, so the tool is
//! spawned once per metric and its CSV output parsed. Process execution sits
//! behind [`CommandRunner`] so tests never touch a real executable.

use crate::error::{Result, SystemError};
use std::process::Command;

/// Name of the NVIDIA management executable.
pub const NVIDIA_SMI: &str = "nvidia-smi";

const FORMAT_ARG: &str = "--format=csv,noheader,nounits";

/// Capability to look up and run external programs.
pub trait CommandRunner {
    /// Whether `program` resolves on the executable search path.
    fn resolve(&self, program: &str) -> bool;

    /// Run `program` to completion and return its combined stdout and stderr.
    ///
    /// A program that cannot be spawned yields [`SystemError::ToolUnavailable`];
    /// a non-zero exit yields [`SystemError::ToolFailed`].
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn resolve(&self, program: &str) -> bool {
        (**self).resolve(program)
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        (**self).run(program, args)
    }
}

/// Runs real processes with [`std::process::Command`].
///
/// No timeout is applied: a hung tool blocks the caller until it exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn resolve(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|_| SystemError::ToolUnavailable {
                tool: program.to_string(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(SystemError::ToolFailed {
                tool: program.to_string(),
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            });
        }

        Ok(combined)
    }
}

/// The three fixed queries issued against the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmiQuery {
    Utilization,
    Memory,
    Temperature,
}

impl SmiQuery {
    pub fn fields(self) -> &'static str {
        match self {
            Self::Utilization => "utilization.gpu",
            Self::Memory => "memory.used,memory.total",
            Self::Temperature => "temperature.gpu",
        }
    }

    /// Argument list passed to `nvidia-smi`.
    pub fn args(self) -> [String; 2] {
        [format!("--query-gpu={}", self.fields()), FORMAT_ARG.to_string()]
    }

    fn field_count(self) -> usize {
        self.fields().split(',').count()
    }
}

/// Typed access to `nvidia-smi` queries over some [`CommandRunner`].
pub struct NvidiaSmi<'a, R: ?Sized> {
    runner: &'a R,
}

impl<'a, R: CommandRunner + ?Sized> NvidiaSmi<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Raw text output of `query`.
    pub fn query(&self, query: SmiQuery) -> Result<String> {
        let args = query.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run(NVIDIA_SMI, &args)
    }

    /// Output of `query` parsed into one integer per requested field.
    pub fn query_values(&self, query: SmiQuery) -> Result<Vec<i64>> {
        let output = self.query(query)?;
        Ok(parse_fields(&output, query.field_count()))
    }

    /// Utilization percentage as reported.
    pub fn utilization(&self) -> Result<i64> {
        Ok(self
            .query_values(SmiQuery::Utilization)?
            .first()
            .copied()
            .unwrap_or(0))
    }

    /// `(used, total)` framebuffer memory in MiB.
    pub fn memory(&self) -> Result<(i64, i64)> {
        let values = self.query_values(SmiQuery::Memory)?;
        match values[..] {
            [used, total] => Ok((used, total)),
            _ => Ok((0, 0)),
        }
    }

    /// Core temperature in whole degrees Celsius.
    pub fn temperature(&self) -> Result<i64> {
        Ok(self
            .query_values(SmiQuery::Temperature)?
            .first()
            .copied()
            .unwrap_or(0))
    }
}

/// Parse one CSV record of `expected` fields.
///
/// Only the first line is considered (GPU 0). Each field may carry a unit
/// suffix such as `" MiB"`. A field that does not parse becomes 0, and a
/// record with the wrong number of fields becomes all zeros; callers range
/// check the numbers afterwards.
pub fn parse_fields(output: &str, expected: usize) -> Vec<i64> {
    let record = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    let fields: Vec<&str> = record.split(", ").collect();
    if fields.len() != expected {
        return vec![0; expected];
    }

    fields.iter().map(|field| parse_field(field)).collect()
}

fn parse_field(field: &str) -> i64 {
    field
        .split_whitespace()
        .next()
        .and_then(|number| number.parse().ok())
        .unwrap_or(0)
}
