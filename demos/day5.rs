// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 5 built using the `intcomputer` library.

use intcomputer::parse::parse_program;
use intcomputer::prelude::*;

/// Run the diagnostic program for system `id`, checking that every test before the final
/// diagnostic code passed
fn diagnostic(mut i: Interpreter, id: i64) -> i64 {
    let mut outputs = i.run_through_inputs([id]).unwrap();
    let diagnostic = outputs.pop().expect("no diagnostic code");
    assert!(outputs.into_iter().all(|i| i == 0), "diagnostic failed");

    diagnostic
}

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");

    let interpreter = Interpreter::new(parse_program(&input).unwrap());
    println!("part 1: {}", diagnostic(interpreter.clone(), 1));
    println!("part 2: {}", diagnostic(interpreter, 5));
}
