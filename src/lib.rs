// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Library providing a bounded Intcode interpreter
//!
//! The interpreter implements the [Opcodes] and the positional and immediate [Parameter Modes]
//! of the Intcode computer as completed for [Day 5]. Memory is a fixed-length buffer, and any
//! access outside of it is a [Fault] rather than an implicit extension.
//!
//! # Example
//!
//! ```rust
//! use intcomputer::prelude::*;
//! let mut interpreter = Interpreter::new(vec![4, 3, 99, 1024]);
//!
//! assert_eq!(interpreter.run_through_inputs(empty()), Ok(vec![1024]));
//! ```
//!
//! The [`run`] function wraps the whole thing into a single call that never touches the
//! caller's buffer:
//!
//! ```rust
//! let program = [1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50];
//! let result = intcomputer::run(&program, []).unwrap();
//! assert_eq!(result.memory[0], 3500);
//! assert_eq!(program[0], 1);
//! ```
//!
//! [Opcodes]: https://esolangs.org/wiki/Intcode#Opcodes
//! [Parameter Modes]: https://esolangs.org/wiki/Intcode#Parameter_Modes
//! [Day 5]: https://adventofcode.com/2019/day/5

use std::fmt::{self, Display};
use std::ops::{Index, IndexMut};

use tracing::{debug, warn};

pub mod error;
mod internals;
pub mod memory;
pub mod parse;
pub mod search;
pub mod trace;

pub use error::{Fault, FaultKind, ParseError};
pub use memory::Memory;

use internals::Io;
use trace::Trace;

/// A small module that re-exports items needed when working with the Intcode interpreter
pub mod prelude {
    pub use crate::{Fault, Interpreter, RunConfig, StepOutcome};
    pub use std::iter::empty;
}

/// The result of executing a single instruction
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StepOutcome {
    /// More instructions remain
    Running,
    /// A `HALT` instruction was reached. The instruction pointer stays on it, so further steps
    /// keep returning `Halted`.
    Halted,
}

/// Parameter mode for Intcode instruction
///
/// When executing an intcode instruction, each source parameter is interpreted in accordance
/// with its mode. Destination parameters are always addresses, whatever their mode digit says.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ParamMode {
    /// A parameter in positional mode evaluates to the value at the address specified by the
    /// parameter.
    Positional = 0,
    /// A parameter in immediate mode evaluates directly to the value specified.
    #[doc(alias = "#")]
    Immediate = 1,
}

impl Display for ParamMode {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamMode::Positional => Ok(()),
            ParamMode::Immediate => write!(fmt, "#"),
        }
    }
}

impl TryFrom<i64> for ParamMode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(ParamMode::Positional),
            1 => Ok(ParamMode::Immediate),
            _ => Err(i),
        }
    }
}

/// An Intcode opcode, as stored in the low two digits of an instruction
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
pub enum OpCode {
    Add = 1,
    Mul = 2,
    In = 3,
    Out = 4,
    Jnz = 5,
    Jz = 6,
    Lt = 7,
    Eq = 8,
    Halt = 99,
}

impl OpCode {
    /// Every opcode, in numeric order
    pub const ALL: [OpCode; 9] = [
        Self::Add,
        Self::Mul,
        Self::In,
        Self::Out,
        Self::Jnz,
        Self::Jz,
        Self::Lt,
        Self::Eq,
        Self::Halt,
    ];

    /// Number of parameters following the opcode
    pub const fn param_count(self) -> usize {
        match self {
            Self::Add | Self::Mul | Self::Lt | Self::Eq => 3,
            Self::Jnz | Self::Jz => 2,
            Self::In | Self::Out => 1,
            Self::Halt => 0,
        }
    }

    /// The index of the parameter this opcode writes to, if any
    pub const fn dest_param(self) -> Option<usize> {
        match self {
            Self::Add | Self::Mul | Self::Lt | Self::Eq => Some(2),
            Self::In => Some(0),
            Self::Out | Self::Jnz | Self::Jz | Self::Halt => None,
        }
    }

    /// Whether this opcode stores a value into memory
    pub const fn writes_memory(self) -> bool {
        self.dest_param().is_some()
    }

    /// Width of the whole instruction, including the opcode itself
    pub const fn width(self) -> i64 {
        1 + self.param_count() as i64
    }
}

impl TryFrom<i64> for OpCode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            1 => Ok(Self::Add),
            2 => Ok(Self::Mul),
            3 => Ok(Self::In),
            4 => Ok(Self::Out),
            5 => Ok(Self::Jnz),
            6 => Ok(Self::Jz),
            7 => Ok(Self::Lt),
            8 => Ok(Self::Eq),
            99 => Ok(Self::Halt),
            n => Err(n),
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "ADD",
            Self::Mul => "MUL",
            Self::In => "IN",
            Self::Out => "OUT",
            Self::Jnz => "JNZ",
            Self::Jz => "JZ",
            Self::Lt => "LT",
            Self::Eq => "EQ",
            Self::Halt => "HALT",
        })
    }
}

/// Run-time knobs for an [Interpreter]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Fault with [`Fault::StepLimitExceeded`] once this many instructions have run
    pub max_steps: Option<u64>,
    /// Record a [Trace] of every executed instruction
    pub trace: bool,
}

impl RunConfig {
    pub fn max_steps(mut self, limit: u64) -> Self {
        self.max_steps = Some(limit);
        self
    }

    pub fn trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }
}

/// Everything a finished run leaves behind
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Memory as it was when `HALT` was reached
    pub memory: Vec<i64>,
    /// Values produced by `OUT`, in order
    pub outputs: Vec<i64>,
    /// Number of instructions executed, counting the final `HALT`
    pub steps: u64,
    /// The instruction trace, if [`RunConfig::trace`] was set
    pub trace: Option<Trace>,
}

/// An intcode interpreter with an exclusively-owned, fixed-length memory.
///
/// Cloning an interpreter gives a fully independent copy, so a template can be cloned once per
/// candidate when probing many initial states, including from multiple threads.
#[derive(Clone)]
pub struct Interpreter {
    index: i64,
    code: Memory,
    steps: u64,
    step_limit: Option<u64>,
    poisoned: Option<Fault>,
    trace: Option<Trace>,
}

// ignore the trace
impl PartialEq for Interpreter {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.code == other.code
            && self.steps == other.steps
            && self.step_limit == other.step_limit
            && self.poisoned == other.poisoned
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Interpreter")
            .field("code", &self.code)
            .field("ip", &self.index)
            .field("steps", &self.steps)
            .field("step_limit", &self.step_limit)
            .field("poisoned", &self.poisoned)
            .field("tracing", &self.trace.is_some())
            .finish()
    }
}

impl Index<i64> for Interpreter {
    type Output = i64;

    fn index(&self, i: i64) -> &Self::Output {
        self.code.index(i)
    }
}

impl IndexMut<i64> for Interpreter {
    fn index_mut(&mut self, i: i64) -> &mut Self::Output {
        self.code.index_mut(i)
    }
}

impl Interpreter {
    /// Create a new interpreter. Collects `code` into its own starting memory.
    pub fn new(code: impl IntoIterator<Item = i64>) -> Self {
        Self {
            index: 0,
            code: code.into_iter().collect(),
            steps: 0,
            step_limit: None,
            poisoned: None,
            trace: None,
        }
    }

    /// Create a new interpreter configured by `config`
    pub fn from_config(code: impl IntoIterator<Item = i64>, config: &RunConfig) -> Self {
        let mut interp = Self::new(code);
        interp.step_limit = config.max_steps;
        if config.trace {
            interp.start_trace();
        }
        interp
    }

    /// Fault with [`Fault::StepLimitExceeded`] once `limit` instructions have been executed
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Manually set a memory location, returning the previous value, or `None` if `address` is
    /// out of range
    #[doc(alias("poke", "write"))]
    pub fn mem_override(&mut self, address: i64, value: i64) -> Option<i64> {
        self.code
            .get_mut(address)
            .map(|cell| std::mem::replace(cell, value))
    }

    /// Get the memory at `address`, or `None` if `address` is out of range
    #[doc(alias = "peek")]
    pub fn mem_get(&self, address: i64) -> Option<i64> {
        self.code.get(address)
    }

    /// View the whole memory
    pub fn memory(&self) -> &[i64] {
        self.code.as_slice()
    }

    /// Consume the interpreter, returning its memory
    pub fn into_memory(self) -> Vec<i64> {
        self.code.into_vec()
    }

    /// The current instruction pointer
    pub fn instr_ptr(&self) -> i64 {
        self.index
    }

    /// The number of instructions executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The fault that stopped this interpreter, if one did
    pub fn fault(&self) -> Option<&Fault> {
        self.poisoned.as_ref()
    }

    /// Execute a single instruction, reading from `inputs` and writing to `outputs` as needed.
    ///
    /// Once a fault has been returned, the interpreter is poisoned, and every later call returns
    /// the same fault without executing anything.
    pub fn exec_instruction(
        &mut self,
        inputs: &mut impl Iterator<Item = i64>,
        outputs: &mut Vec<i64>,
    ) -> Result<StepOutcome, Fault> {
        if let Some(fault) = &self.poisoned {
            return Err(fault.clone());
        }
        let result = self.dispatch(&mut Io { inputs, outputs });
        if let Err(fault) = &result {
            warn!(%fault, steps = self.steps, "interpreter faulted");
            self.poisoned = Some(fault.clone());
        }
        result
    }

    fn dispatch(&mut self, io: &mut Io<'_>) -> Result<StepOutcome, Fault> {
        if let Some(limit) = self.step_limit
            && self.steps >= limit
        {
            return Err(Fault::StepLimitExceeded {
                limit,
                ip: self.index,
            });
        }
        let Some(op_int) = self.code.get(self.index) else {
            return Err(Fault::UnexpectedEndOfProgram { ip: self.index });
        };
        let decoded = Self::parse_op(op_int, self.index)?;
        tracing::trace!(ip = self.index, op_int, opcode = %decoded.opcode, "executing");
        let outcome = (decoded.opcode.handler())(self, &decoded, io)?;
        self.steps += 1;
        Ok(outcome)
    }

    /// Execute until the program halts, returning every output produced along the way.
    ///
    /// Running out of input is a [`Fault::InputExhausted`], not a pause.
    pub fn run_through_inputs(
        &mut self,
        inputs: impl IntoIterator<Item = i64>,
    ) -> Result<Vec<i64>, Fault> {
        self.run_collecting(inputs).map_err(|(fault, _)| fault)
    }

    /// Like [`Interpreter::run_through_inputs`], but on a fault also returns whatever was output
    /// before it occured
    pub fn run_collecting(
        &mut self,
        inputs: impl IntoIterator<Item = i64>,
    ) -> Result<Vec<i64>, (Fault, Vec<i64>)> {
        let mut outputs = Vec::new();
        let mut inputs = inputs.into_iter();
        loop {
            match self.exec_instruction(&mut inputs, &mut outputs) {
                Ok(StepOutcome::Running) => (),
                Ok(StepOutcome::Halted) => {
                    debug!(steps = self.steps, outputs = outputs.len(), "halted");
                    break Ok(outputs);
                }
                Err(fault) => break Err((fault, outputs)),
            }
        }
    }

    /// Pre-compute as much as possible - that is, run every instruction up to, but not including,
    /// the first `IN`, `OUT`, or `HALT` instruction, bubbling up any errors that occur.
    pub fn precompute(&mut self) -> Result<(), Fault> {
        while let Some(op_int) = self.code.get(self.index)
            && OpCode::try_from(op_int % 100)
                .is_ok_and(|opcode| !matches!(opcode, OpCode::In | OpCode::Out | OpCode::Halt))
        {
            self.exec_instruction(&mut std::iter::empty(), &mut Vec::new())?;
        }
        Ok(())
    }
}

/// Run `initial` to completion on a private copy of it, feeding it `inputs`.
///
/// ```
/// let result = intcomputer::run(&[3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8], [8]).unwrap();
/// assert_eq!(result.outputs, vec![1]);
/// ```
pub fn run(initial: &[i64], inputs: impl IntoIterator<Item = i64>) -> Result<RunResult, Fault> {
    run_with(initial, inputs, &RunConfig::default())
}

/// [`run`], configured by `config`
pub fn run_with(
    initial: &[i64],
    inputs: impl IntoIterator<Item = i64>,
    config: &RunConfig,
) -> Result<RunResult, Fault> {
    let mut interp = Interpreter::from_config(initial.iter().copied(), config);
    let outputs = interp.run_through_inputs(inputs)?;
    let trace = interp.end_trace();
    Ok(RunResult {
        steps: interp.steps(),
        memory: interp.into_memory(),
        outputs,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter::empty;

    #[test]
    fn interpreter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Interpreter>();
    }

    #[test]
    fn halt_at_start_leaves_memory_alone() {
        let code = vec![99, 7, -3, 1, 1, 1];
        let result = run(&code, empty()).unwrap();
        assert_eq!(result.memory, code);
        assert_eq!(result.steps, 1);
        assert!(result.outputs.is_empty());
    }

    #[test]
    fn halted_interpreter_stays_halted() {
        let mut interp = Interpreter::new([1101, 1, 1, 5, 99, 0]);
        assert_eq!(interp.run_through_inputs(empty()), Ok(vec![]));
        let before = interp.clone();
        let mut outputs = vec![];
        assert_eq!(
            interp.exec_instruction(&mut empty(), &mut outputs),
            Ok(StepOutcome::Halted)
        );
        assert_eq!(interp.memory(), before.memory());
        assert_eq!(interp.instr_ptr(), 4);
    }

    #[test]
    fn fault_poisons_interpreter() {
        let mut interp = Interpreter::new([3, 0, 99]);
        let fault = interp.run_through_inputs(empty()).unwrap_err();
        assert_eq!(fault, Fault::InputExhausted { ip: 0 });
        assert_eq!(interp.fault(), Some(&fault));
        // later input doesn't revive it
        assert_eq!(interp.run_through_inputs([5]), Err(fault));
        assert_eq!(interp.memory(), &[3, 0, 99]);
    }

    #[test]
    fn running_off_the_end() {
        let mut interp = Interpreter::new([1101, 1, 1, 0]);
        assert_eq!(
            interp.run_through_inputs(empty()),
            Err(Fault::UnexpectedEndOfProgram { ip: 4 })
        );
        assert_eq!(interp.mem_get(0), Some(2));
    }

    #[test]
    fn empty_program_faults() {
        assert_eq!(
            run(&[], empty()).unwrap_err(),
            Fault::UnexpectedEndOfProgram { ip: 0 }
        );
    }

    #[test]
    fn step_limit() {
        let mut interp = Interpreter::new([1105, 1, 0]).with_step_limit(10);
        assert_eq!(
            interp.run_through_inputs(empty()),
            Err(Fault::StepLimitExceeded { limit: 10, ip: 0 })
        );
        assert_eq!(interp.steps(), 10);

        // halting right at the limit is fine
        let config = RunConfig::default().max_steps(2);
        assert!(run_with(&[1, 0, 0, 0, 99], empty(), &config).is_ok());
        let config = RunConfig::default().max_steps(1);
        assert_eq!(
            run_with(&[1, 0, 0, 0, 99], empty(), &config).unwrap_err(),
            Fault::StepLimitExceeded { limit: 1, ip: 4 }
        );
    }

    #[test]
    fn outputs_before_fault_are_kept() {
        let mut interp = Interpreter::new([104, 7, 104, 8, 42]);
        assert_eq!(
            interp.run_collecting(empty()),
            Err((Fault::InvalidOpcode { opcode: 42, ip: 4 }, vec![7, 8]))
        );
    }

    #[test]
    fn precompute_stops_before_io() {
        let mut interp = Interpreter::new([1101, 2, 3, 9, 1002, 9, 2, 9, 4, 9, 99]);
        interp.precompute().unwrap();
        assert_eq!(interp.instr_ptr(), 8);
        assert_eq!(interp.mem_get(9), Some(10));
        assert_eq!(interp.run_through_inputs(empty()), Ok(vec![10]));
    }

    #[test]
    fn mem_override_bounds() {
        let mut interp = Interpreter::new([1, 0, 0, 0, 99]);
        assert_eq!(interp.mem_override(1, 12), Some(0));
        assert_eq!(interp.mem_override(5, 12), None);
        assert_eq!(interp.mem_get(1), Some(12));
        assert_eq!(interp.mem_get(-1), None);
    }

    #[test]
    fn opcode_metadata() {
        for opcode in OpCode::ALL {
            assert_eq!(OpCode::try_from(opcode as i64), Ok(opcode));
            assert_eq!(opcode.width(), 1 + opcode.param_count() as i64);
            if let Some(dest) = opcode.dest_param() {
                assert!(dest < opcode.param_count());
            }
        }
        assert_eq!(OpCode::try_from(9), Err(9));
        assert_eq!(OpCode::Jnz.to_string(), "JNZ");
        assert!(!OpCode::Out.writes_memory());
    }
}
