#![deny(missing_docs)]
//! String programs executed by the gossi guest module.
//!
//! Every program appends [`SIGN`] to its output, including the fallback for
//! unknown program names, so callers can always tell the guest answered.

pub mod abi;

use std::fmt;
use std::str::FromStr;

/// Suffix appended to every program result.
pub const SIGN: &str = " by gossi";

/// Programs understood by [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    /// Returns the input unchanged.
    Echo,
    /// Upper-cases the input.
    Uppercase,
    /// Lower-cases the input.
    Lowercase,
    /// Any unrecognised program name; produces only the sign.
    Unknown,
}

impl Program {
    /// Programs with a defined transformation, in display order.
    pub const KNOWN: [Program; 3] = [Program::Echo, Program::Uppercase, Program::Lowercase];

    /// Wire name of the program, `None` for [`Program::Unknown`].
    pub fn name(self) -> Option<&'static str> {
        match self {
            Program::Echo => Some("echo"),
            Program::Uppercase => Some("uppercase"),
            Program::Lowercase => Some("lowercase"),
            Program::Unknown => None,
        }
    }

    /// Applies the program to `data`, appending [`SIGN`].
    pub fn apply(self, data: &str) -> String {
        let body = match self {
            Program::Echo => data.to_owned(),
            Program::Uppercase => data.to_uppercase(),
            Program::Lowercase => data.to_lowercase(),
            Program::Unknown => String::new(),
        };
        body + SIGN
    }
}

impl FromStr for Program {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "echo" => Program::Echo,
            "uppercase" => Program::Uppercase,
            "lowercase" => Program::Lowercase,
            _ => Program::Unknown,
        })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("unknown"))
    }
}

/// Runs `program` against `data`.
///
/// Program names are matched exactly (case-sensitive); anything else falls
/// back to an empty body.
pub fn run(program: &str, data: &str) -> String {
    program
        .parse::<Program>()
        .unwrap_or(Program::Unknown)
        .apply(data)
}
