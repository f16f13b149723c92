// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Structured tracing of executed instructions
use std::fmt::{self, Debug, Display};

use super::internals::Decoded;
use super::{Interpreter, OpCode, ParamMode};

#[derive(Clone, Copy, PartialEq, Eq)]
struct PackedModes(u8);
impl PackedModes {
    const fn pack(modes: [ParamMode; 3]) -> Self {
        Self(modes[0] as u8 | ((modes[1] as u8) << 1) | ((modes[2] as u8) << 2))
    }
    const fn unpack(self) -> [ParamMode; 3] {
        const fn unpack_bit(bit: u8) -> ParamMode {
            if bit == 0 {
                ParamMode::Positional
            } else {
                ParamMode::Immediate
            }
        }
        [
            unpack_bit(self.0 & 0b001),
            unpack_bit(self.0 & 0b010),
            unpack_bit(self.0 & 0b100),
        ]
    }
}

/// Each parameter is recorded as `(raw int, resolved value)`. For destinations, the resolved
/// value is the value that was stored.
#[derive(Clone, Copy, PartialEq, Eq)]
enum TracedOp {
    Add((i64, i64), (i64, i64), (i64, i64)),
    Mul((i64, i64), (i64, i64), (i64, i64)),
    In((i64, i64)),
    Out((i64, i64)),
    Jnz((i64, i64), (i64, i64)),
    Jz((i64, i64), (i64, i64)),
    Lt((i64, i64), (i64, i64), (i64, i64)),
    Eq((i64, i64), (i64, i64), (i64, i64)),
    Halt,
}

#[derive(Clone, PartialEq, Eq)]
/// An opaque type containing information about what instruction was executed, which can be queried
/// with its various methods, or converted into a [String] using its [Display] impl.
pub struct TracedInstr {
    op: TracedOp,
    op_int: i64,
    instr_ptr: i64,
    packed_modes: PackedModes,
    opcode: OpCode,
}

impl TracedInstr {
    /// Return the instruction pointer's position when the traced instruction was executed
    pub fn instr_ptr(&self) -> i64 {
        self.instr_ptr
    }

    /// Return the actual integer of the traced instruction
    pub fn op_int(&self) -> i64 {
        self.op_int
    }

    /// Return the opcode of the traced instruction
    pub fn op_code(&self) -> OpCode {
        self.opcode
    }

    /// If the instruction stored a value, return that value
    pub fn stored_val(&self) -> Option<i64> {
        match self.op {
            TracedOp::Add(_, _, (_, v))
            | TracedOp::Mul(_, _, (_, v))
            | TracedOp::Lt(_, _, (_, v))
            | TracedOp::Eq(_, _, (_, v))
            | TracedOp::In((_, v)) => Some(v),
            TracedOp::Out(_) | TracedOp::Jnz(..) | TracedOp::Jz(..) | TracedOp::Halt => None,
        }
    }

    /// If the instruction was a jump, return whether it was taken
    pub fn jumped(&self) -> Option<bool> {
        match self.op {
            TracedOp::Jnz((_, v), _) => Some(v != 0),
            TracedOp::Jz((_, v), _) => Some(v == 0),
            _ => None,
        }
    }

    /// Return an array of the parameter modes of the traced instruction. Destinations and unused
    /// parameters are always [ParamMode::Positional].
    pub fn param_modes(&self) -> [ParamMode; 3] {
        self.packed_modes.unpack()
    }

    pub(super) fn build(decoded: &Decoded, instr_ptr: i64, resolved_params: &[(i64, i64)]) -> Self {
        macro_rules! op {
            {$id: ident(_, _, _)} => {{
                debug_assert_eq!(resolved_params.len(), 3);
                TracedOp::$id(resolved_params[0], resolved_params[1], resolved_params[2])
            }};
            {$id: ident(_, _)} => {{
                debug_assert_eq!(resolved_params.len(), 2);
                TracedOp::$id(resolved_params[0], resolved_params[1])
            }};
            {$id: ident(_)} => {{
                debug_assert_eq!(resolved_params.len(), 1);
                TracedOp::$id(resolved_params[0])
            }};
            {$id: ident} => {{
                debug_assert_eq!(resolved_params.len(), 0);
                TracedOp::$id
            }}
        }

        let op = match decoded.opcode {
            OpCode::Add => op! { Add(_, _, _) },
            OpCode::Mul => op! { Mul(_, _, _) },
            OpCode::In => op! { In(_) },
            OpCode::Out => op! { Out(_) },
            OpCode::Jnz => op! { Jnz(_, _) },
            OpCode::Jz => op! { Jz(_, _) },
            OpCode::Lt => op! { Lt(_, _, _) },
            OpCode::Eq => op! { Eq(_, _, _) },
            OpCode::Halt => op! { Halt },
        };
        Self {
            op,
            op_int: decoded.op_int,
            instr_ptr,
            packed_modes: PackedModes::pack(decoded.modes),
            opcode: decoded.opcode,
        }
    }
}

impl Interpreter {
    /// Begin a [Trace] of executed instructions. If a trace is already running, this replaces that
    /// trace and returns in a [`Some`], otherwise, it returns [`None`].
    ///
    /// # Example
    /// ```
    ///# use intcomputer::prelude::*;
    /// let mut interp = Interpreter::new([1101, 90, 9, 4, 99]);
    /// assert!(interp.start_trace().is_none());
    /// interp.run_through_inputs(empty()).unwrap();
    /// let trace = interp.end_trace().unwrap();
    /// assert_eq!(trace.0.len(), 2);
    /// assert_eq!(trace.0[0].stored_val(), Some(99));
    /// ```
    pub fn start_trace(&mut self) -> Option<Trace> {
        self.trace.replace(Trace::new())
    }

    /// Stop tracing executed instructions into a [Trace]. If no trace was active, returns [`None`]
    ///
    /// see [Interpreter::start_trace]
    pub fn end_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    /// Get a view of the current trace
    pub fn show_trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// A log of instructions that an [Interpreter] has executed since a call to
/// [Interpreter::start_trace]
///
/// see [Interpreter::start_trace]
pub struct Trace(pub Vec<TracedInstr>);

impl Trace {
    pub(crate) fn push(&mut self, decoded: &Decoded, instr_ptr: i64, resolved_params: &[(i64, i64)]) {
        self.0
            .push(TracedInstr::build(decoded, instr_ptr, resolved_params))
    }

    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }
}

impl Debug for TracedOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! arg {
            ($arg: ident) => {
                format_args!("{} => {}", $arg.0, $arg.1)
            };
        }
        macro_rules! variant {
            ($name: literal, ($($arg: ident),*)) => {
                f.debug_tuple($name)
                $(.field(&arg!($arg) ))*
                .finish()
            }
        }
        match self {
            Self::Add(a0, a1, a2) => variant!("Add", (a0, a1, a2)),
            Self::Mul(a0, a1, a2) => variant!("Mul", (a0, a1, a2)),
            Self::In(a0) => variant!("In", (a0)),
            Self::Out(a0) => variant!("Out", (a0)),
            Self::Jnz(a0, a1) => variant!("Jnz", (a0, a1)),
            Self::Jz(a0, a1) => variant!("Jz", (a0, a1)),
            Self::Lt(a0, a1, a2) => variant!("Lt", (a0, a1, a2)),
            Self::Eq(a0, a1, a2) => variant!("Eq", (a0, a1, a2)),
            Self::Halt => write!(f, "Halt"),
        }
    }
}

impl Debug for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedInstr")
            .field("op", &self.op)
            .field("op_int", &self.op_int)
            .field("instr_ptr", &self.instr_ptr)
            .field("modes", &self.packed_modes.unpack())
            .field("opcode", &self.opcode)
            .finish()
    }
}

impl Display for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ran instruction at {:0>4}: op int {: <5} | ",
            self.instr_ptr, self.op_int
        )?;
        let modes = self.packed_modes.unpack();

        match self.op {
            TracedOp::Add((pa, va), (pb, vb), (dest, val))
            | TracedOp::Mul((pa, va), (pb, vb), (dest, val))
            | TracedOp::Lt((pa, va), (pb, vb), (dest, val))
            | TracedOp::Eq((pa, va), (pb, vb), (dest, val)) => {
                write!(
                    f,
                    "[{} {}{pa} (resolves to {va}), {}{pb} (resolves to {vb}), {dest} (stored {val})]",
                    self.opcode, modes[0], modes[1],
                )
            }
            TracedOp::Jnz((p_base, v_base), (p_dest, v_dest))
            | TracedOp::Jz((p_base, v_base), (p_dest, v_dest)) => {
                write!(
                    f,
                    "[{} {}{p_base} (resolves to {v_base}), {}{p_dest} ({} to {v_dest})]",
                    self.opcode,
                    modes[0],
                    modes[1],
                    if self.jumped() == Some(true) {
                        "jumped"
                    } else {
                        "didn't jump"
                    }
                )
            }
            TracedOp::In((p, v)) => {
                write!(f, "[{} {p} (stored {v})]", self.opcode)
            }
            TracedOp::Out((p, v)) => {
                write!(f, "[{} {}{p} (resolves to {v})]", self.opcode, modes[0])
            }
            TracedOp::Halt => {
                write!(f, "[HALT]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter::empty;

    #[test]
    fn param_mode_packing() {
        const MODES: [ParamMode; 2] = [ParamMode::Positional, ParamMode::Immediate];

        for a in MODES {
            for b in MODES {
                for c in MODES {
                    assert_eq!(PackedModes::pack([a, b, c]).unpack(), [a, b, c]);
                }
            }
        }
    }

    #[test]
    fn display_lines() {
        let mut interp = Interpreter::new([3, 9, 1008, 9, 8, 9, 1005, 9, 12, 4, 9, 99, 99]);
        interp.start_trace();
        interp.run_through_inputs([8]).unwrap();
        let Trace(trace) = interp.end_trace().unwrap();
        let lines: Vec<String> = trace.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            [
                "ran instruction at 0000: op int 3     | [IN 9 (stored 8)]",
                "ran instruction at 0002: op int 1008  | [EQ 9 (resolves to 8), #8 (resolves to 8), 9 (stored 1)]",
                "ran instruction at 0006: op int 1005  | [JNZ 9 (resolves to 1), #12 (jumped to 12)]",
                "ran instruction at 0012: op int 99    | [HALT]",
            ]
        );
        assert_eq!(trace[2].jumped(), Some(true));
        assert_eq!(trace[2].stored_val(), None);
        assert_eq!(trace[1].stored_val(), Some(1));
    }

    #[test]
    fn trace_replaced_and_ended() {
        let mut interp = Interpreter::new([104, 5, 99]);
        assert!(interp.end_trace().is_none());
        assert!(interp.start_trace().is_none());
        let mut outputs = vec![];
        interp.exec_instruction(&mut empty(), &mut outputs).unwrap();
        assert_eq!(interp.show_trace().map(|t| t.0.len()), Some(1));
        let old = interp.start_trace().unwrap();
        assert_eq!(old.0[0].op_code(), OpCode::Out);
        interp.exec_instruction(&mut empty(), &mut outputs).unwrap();
        assert_eq!(interp.end_trace().unwrap().0[0].op_code(), OpCode::Halt);
        assert_eq!(outputs, vec![5]);
    }
}
