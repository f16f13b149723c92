//! Property tests for the interpreter
// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use intcomputer::prelude::*;
use intcomputer::{FaultKind, RunConfig};
use proptest::prelude::*;

/// Programs built only from ADD, MUL and HALT, with every address in range
fn arithmetic_program() -> impl Strategy<Value = Vec<i64>> {
    (1usize..12).prop_flat_map(|instrs| {
        let len = instrs * 4 + 1;
        let addr = 0..len as i64;
        (
            prop::collection::vec(
                (prop::bool::ANY, addr.clone(), addr.clone(), addr),
                instrs,
            ),
            prop::collection::vec(-1000i64..1000, 8),
        )
            .prop_map(move |(ops, data)| {
                let mut code = Vec::with_capacity(len + data.len());
                for (mul, a, b, dest) in ops {
                    code.extend([if mul { 2 } else { 1 }, a, b, dest]);
                }
                code.push(99);
                code.extend(data);
                code
            })
    })
}

proptest! {
    #[test]
    fn arithmetic_runs_are_pure(code in arithmetic_program()) {
        let config = RunConfig::default().max_steps(64);
        let first = intcomputer::run_with(&code, empty(), &config);
        let second = intcomputer::run_with(&code, empty(), &config);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.memory, b.memory);
                prop_assert_eq!(a.steps, b.steps);
            }
            (Err(a), Err(b)) => {
                prop_assert_eq!(a, b);
            }
            (a, b) => {
                prop_assert!(false, "runs diverged: {:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn caller_memory_is_never_mutated(code in arithmetic_program()) {
        let before = code.clone();
        let _ = intcomputer::run_with(&code, empty(), &RunConfig::default().max_steps(64));
        prop_assert_eq!(code, before);
    }

    #[test]
    fn halt_first_is_identity(tail in prop::collection::vec(any::<i64>(), 0..32)) {
        let mut code = vec![99];
        code.extend(tail);
        let result = intcomputer::run(&code, empty()).unwrap();
        prop_assert_eq!(result.memory, code);
        prop_assert_eq!(result.steps, 1);
    }

    #[test]
    fn echo_any_value(value in any::<i64>()) {
        let result = intcomputer::run(&[3, 0, 4, 0, 99], [value]).unwrap();
        prop_assert_eq!(result.outputs, vec![value]);
    }

    /// Any instruction whose low two digits aren't an opcode faults before touching memory
    #[test]
    fn unknown_opcodes_fault(high in 0i64..1000, low in 10i64..99) {
        let op = high * 100 + low;
        let code = [op, 0, 0, 0, 99];
        let fault = intcomputer::run(&code, empty()).unwrap_err();
        prop_assert_eq!(fault, Fault::InvalidOpcode { opcode: low, ip: 0 });
    }

    /// Positional and immediate reads of the same cell agree once the mode digit is decoded
    #[test]
    fn mode_digits_select_operands(a in -500i64..500, b in -500i64..500, modes in 0usize..4) {
        let (imm_a, imm_b) = (modes & 1 == 1, modes & 2 == 2);
        let op = 1 + i64::from(imm_a) * 100 + i64::from(imm_b) * 1000;
        // cells 5 and 6 hold the values for positional reads
        let code = [
            op,
            if imm_a { a } else { 5 },
            if imm_b { b } else { 6 },
            0,
            99,
            a,
            b,
        ];
        let result = intcomputer::run(&code, empty()).unwrap();
        prop_assert_eq!(result.memory[0], a + b);
    }

    #[test]
    fn step_budget_is_exact(limit in 1u64..200) {
        let fault = intcomputer::run_with(&[1105, 1, 0], empty(), &RunConfig::default().max_steps(limit))
            .unwrap_err();
        prop_assert_eq!(fault.kind(), FaultKind::StepLimitExceeded);
        prop_assert_eq!(fault, Fault::StepLimitExceeded { limit, ip: 0 });
    }
}
