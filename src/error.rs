// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Faults raised by the interpreter and errors raised when parsing program source

use std::num::ParseIntError;
use thiserror::Error;

/// A terminal error that aborted a run. Every variant carries `ip`, the instruction pointer of
/// the instruction that faulted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The low two digits of the instruction are not a known opcode
    #[error("unrecognized opcode {opcode} at {ip}")]
    InvalidOpcode { opcode: i64, ip: i64 },

    /// A source parameter used a mode digit other than `0` or `1`
    #[error("unknown parameter mode {mode} at {ip}")]
    InvalidMode { mode: i64, ip: i64 },

    /// A parameter resolved to an address outside memory
    #[error("address {address} out of range (instruction at {ip})")]
    AddressOutOfRange { address: i64, ip: i64 },

    /// An `IN` instruction ran with no input left
    #[error("input exhausted at {ip}")]
    InputExhausted { ip: i64 },

    /// The instruction pointer left memory without reaching `HALT`
    #[error("ran off the end of the program at {ip}")]
    UnexpectedEndOfProgram { ip: i64 },

    /// The configured step budget ran out
    #[error("step limit of {limit} exceeded at {ip}")]
    StepLimitExceeded { limit: u64, ip: i64 },
}

/// The kind of a [`Fault`], without its location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    InvalidOpcode,
    InvalidMode,
    AddressOutOfRange,
    InputExhausted,
    UnexpectedEndOfProgram,
    StepLimitExceeded,
}

impl Fault {
    /// Instruction pointer at which the fault occured
    pub fn ip(&self) -> i64 {
        match *self {
            Self::InvalidOpcode { ip, .. }
            | Self::InvalidMode { ip, .. }
            | Self::AddressOutOfRange { ip, .. }
            | Self::InputExhausted { ip }
            | Self::UnexpectedEndOfProgram { ip }
            | Self::StepLimitExceeded { ip, .. } => ip,
        }
    }

    pub fn kind(&self) -> FaultKind {
        match self {
            Self::InvalidOpcode { .. } => FaultKind::InvalidOpcode,
            Self::InvalidMode { .. } => FaultKind::InvalidMode,
            Self::AddressOutOfRange { .. } => FaultKind::AddressOutOfRange,
            Self::InputExhausted { .. } => FaultKind::InputExhausted,
            Self::UnexpectedEndOfProgram { .. } => FaultKind::UnexpectedEndOfProgram,
            Self::StepLimitExceeded { .. } => FaultKind::StepLimitExceeded,
        }
    }
}

/// Failure to turn comma-separated source text into a program
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("program source is empty")]
    Empty,

    #[error("field {index} ({field:?}) is not a valid integer: {source}")]
    InvalidInt {
        index: usize,
        field: String,
        #[source]
        source: ParseIntError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Fault::InvalidOpcode { opcode: 42, ip: 7 }.to_string(),
            "unrecognized opcode 42 at 7"
        );
        assert_eq!(
            Fault::AddressOutOfRange { address: -1, ip: 0 }.to_string(),
            "address -1 out of range (instruction at 0)"
        );
        assert_eq!(
            Fault::StepLimitExceeded { limit: 10, ip: 3 }.to_string(),
            "step limit of 10 exceeded at 3"
        );
    }

    #[test]
    fn kind_and_location() {
        let fault = Fault::InputExhausted { ip: 12 };
        assert_eq!(fault.kind(), FaultKind::InputExhausted);
        assert_eq!(fault.ip(), 12);
        let fault = Fault::InvalidMode { mode: 2, ip: 4 };
        assert_eq!(fault.kind(), FaultKind::InvalidMode);
        assert_eq!(fault.ip(), 4);
    }
}
