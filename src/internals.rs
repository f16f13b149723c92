// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use super::*;

/// The I/O channel for a single instruction
pub(crate) struct Io<'a> {
    pub(crate) inputs: &'a mut dyn Iterator<Item = i64>,
    pub(crate) outputs: &'a mut Vec<i64>,
}

/// An instruction decoded from the int at the instruction pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub(crate) op_int: i64,
    pub(crate) opcode: OpCode,
    pub(crate) modes: [ParamMode; 3],
}

/// An opcode's implementation. Each one is responsible for advancing or replacing the instruction
/// pointer itself.
pub(crate) type Handler =
    fn(&mut Interpreter, &Decoded, &mut Io<'_>) -> Result<StepOutcome, Fault>;

impl OpCode {
    /// Look up the handler for this opcode
    pub(crate) fn handler(self) -> Handler {
        match self {
            Self::Add => add,
            Self::Mul => mul,
            Self::In => input,
            Self::Out => output,
            Self::Jnz => jump_if_true,
            Self::Jz => jump_if_false,
            Self::Lt => less_than,
            Self::Eq => equals,
            Self::Halt => halt,
        }
    }
}

fn add(interp: &mut Interpreter, decoded: &Decoded, _: &mut Io<'_>) -> Result<StepOutcome, Fault> {
    interp.op3(decoded, i64::wrapping_add)
}

fn mul(interp: &mut Interpreter, decoded: &Decoded, _: &mut Io<'_>) -> Result<StepOutcome, Fault> {
    interp.op3(decoded, i64::wrapping_mul)
}

fn less_than(
    interp: &mut Interpreter,
    decoded: &Decoded,
    _: &mut Io<'_>,
) -> Result<StepOutcome, Fault> {
    interp.op3(decoded, |a, b| i64::from(a < b))
}

fn equals(
    interp: &mut Interpreter,
    decoded: &Decoded,
    _: &mut Io<'_>,
) -> Result<StepOutcome, Fault> {
    interp.op3(decoded, |a, b| i64::from(a == b))
}

fn input(interp: &mut Interpreter, decoded: &Decoded, io: &mut Io<'_>) -> Result<StepOutcome, Fault> {
    let dest = interp.resolve_dest(1)?;
    let Some(val) = io.inputs.next() else {
        return Err(Fault::InputExhausted { ip: interp.index });
    };
    interp.trace(decoded, &[(interp.code[interp.index + 1], val)]);
    interp.code[dest] = val;
    interp.index += 2;
    Ok(StepOutcome::Running)
}

fn output(interp: &mut Interpreter, decoded: &Decoded, io: &mut Io<'_>) -> Result<StepOutcome, Fault> {
    let val = interp.resolve_param(decoded.modes[0], 1)?;
    interp.trace(decoded, &[(interp.code[interp.index + 1], val)]);
    io.outputs.push(val);
    interp.index += 2;
    Ok(StepOutcome::Running)
}

fn jump_if_true(
    interp: &mut Interpreter,
    decoded: &Decoded,
    _: &mut Io<'_>,
) -> Result<StepOutcome, Fault> {
    interp.jump(decoded, |expr| expr != 0)
}

fn jump_if_false(
    interp: &mut Interpreter,
    decoded: &Decoded,
    _: &mut Io<'_>,
) -> Result<StepOutcome, Fault> {
    interp.jump(decoded, |expr| expr == 0)
}

fn halt(interp: &mut Interpreter, decoded: &Decoded, _: &mut Io<'_>) -> Result<StepOutcome, Fault> {
    interp.trace(decoded, &[]);
    Ok(StepOutcome::Halted)
}

impl ParamMode {
    /// Decode the modes of `opcode`'s source parameters from the digits of `op` above the
    /// opcode. Destination and unused slots are always reported as positional.
    pub(crate) fn extract(op: i64, opcode: OpCode, ip: i64) -> Result<[ParamMode; 3], Fault> {
        let mut modes = [ParamMode::Positional; 3];
        let mut digits = op / 100;
        for (n, mode) in modes.iter_mut().enumerate().take(opcode.param_count()) {
            let digit = digits % 10;
            digits /= 10;
            if opcode.dest_param() != Some(n) {
                *mode = ParamMode::try_from(digit)
                    .map_err(|mode| Fault::InvalidMode { mode, ip })?;
            }
        }
        Ok(modes)
    }
}

impl Interpreter {
    // Given a 5 digit number, digits ABCDE are used as follows:
    // DE is the two-digit opcode
    // C is the 1st parameter's mode
    // B is the 2nd parameter's mode
    // A is the 3rd parameter's mode
    //
    // So 01002 would be parsed as follows:
    //
    // Opcode 02 is multiply
    // C=0: 1st parameter is in positional mode
    // B=1: 2nd parameter is in immediate mode
    // A=0: 3rd parameter is the destination, so its digit is ignored
    pub(crate) fn parse_op(op: i64, ip: i64) -> Result<Decoded, Fault> {
        let opcode =
            OpCode::try_from(op % 100).map_err(|opcode| Fault::InvalidOpcode { opcode, ip })?;
        Ok(Decoded {
            op_int: op,
            opcode,
            modes: ParamMode::extract(op, opcode, ip)?,
        })
    }

    /// The raw int `offset` cells past the instruction pointer. An operand past the end of
    /// memory means the program ran off the end mid-instruction.
    pub(crate) fn operand(&self, offset: i64) -> Result<i64, Fault> {
        self.code
            .get(self.index + offset)
            .ok_or(Fault::UnexpectedEndOfProgram { ip: self.index })
    }

    /// Processes the operand at `offset` into a concrete value using the method appropriate for
    /// `mode`.
    pub(crate) fn resolve_param(&self, mode: ParamMode, offset: i64) -> Result<i64, Fault> {
        let raw = self.operand(offset)?;
        match mode {
            ParamMode::Positional => self.code.get(raw).ok_or(Fault::AddressOutOfRange {
                address: raw,
                ip: self.index,
            }),
            ParamMode::Immediate => Ok(raw),
        }
    }

    /// Turns the operand at `offset` into a writable address, whatever its mode digit says.
    pub(crate) fn resolve_dest(&self, offset: i64) -> Result<i64, Fault> {
        let raw = self.operand(offset)?;
        if self.code.contains(raw) {
            Ok(raw)
        } else {
            Err(Fault::AddressOutOfRange {
                address: raw,
                ip: self.index,
            })
        }
    }

    /// common logic of all 4 instructions that take 3 parameters
    pub(crate) fn op3(
        &mut self,
        decoded: &Decoded,
        operation: impl Fn(i64, i64) -> i64,
    ) -> Result<StepOutcome, Fault> {
        let a = self.resolve_param(decoded.modes[0], 1)?;
        let b = self.resolve_param(decoded.modes[1], 2)?;
        let dest = self.resolve_dest(3)?;
        let val = operation(a, b);
        self.trace(
            decoded,
            &[
                (self.code[self.index + 1], a),
                (self.code[self.index + 2], b),
                (self.code[self.index + 3], val),
            ],
        );
        self.code[dest] = val;
        self.index += 4;
        Ok(StepOutcome::Running)
    }

    pub(crate) fn jump(
        &mut self,
        decoded: &Decoded,
        func: impl Fn(i64) -> bool,
    ) -> Result<StepOutcome, Fault> {
        let expr = self.resolve_param(decoded.modes[0], 1)?;
        let dest = self.resolve_param(decoded.modes[1], 2)?;
        self.trace(
            decoded,
            &[
                (self.code[self.index + 1], expr),
                (self.code[self.index + 2], dest),
            ],
        );
        // a jump outside memory is caught when the next instruction is fetched
        if func(expr) {
            self.index = dest;
        } else {
            self.index += 3;
        }
        Ok(StepOutcome::Running)
    }

    fn trace(&mut self, decoded: &Decoded, resolved_params: &[(i64, i64)]) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(decoded, self.index, resolved_params);
        }
    }
}
