// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 2 built using the `intcomputer` library.

use std::num::NonZeroUsize;

use intcomputer::parse::parse_program;
use intcomputer::prelude::*;
use intcomputer::search::{find_noun_verb, with_noun_verb};

fn part1(template: &Interpreter) -> i64 {
    let mut i = with_noun_verb(template, 12, 2).expect("program too short");
    let output = i.run_through_inputs(empty()).unwrap();
    assert!(output.is_empty(), "intcode had unexpected output");
    i[0]
}

fn part2(template: &Interpreter) -> i64 {
    let workers = std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
    #[allow(clippy::unreadable_literal, reason = "from Advent of Code")]
    let (noun, verb) = find_noun_verb(template, 19690720, 0..=99, workers)
        .unwrap()
        .expect("no answer found for part 2");
    100 * noun + verb
}

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");

    let interpreter = Interpreter::new(parse_program(&input).unwrap()).with_step_limit(100_000);
    println!("part 1: {}", part1(&interpreter));
    println!("part 2: {}", part2(&interpreter));
}
