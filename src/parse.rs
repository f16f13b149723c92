// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Turning comma-separated source text into a program

use crate::error::ParseError;

/// Parse comma-separated decimal ints, as found in Advent of Code puzzle inputs.
///
/// Whitespace around each field is ignored, as is a single trailing comma.
///
/// ```
/// use intcomputer::parse::parse_program;
/// assert_eq!(parse_program("1,0,0,0,99\n"), Ok(vec![1, 0, 0, 0, 99]));
/// ```
pub fn parse_program(src: &str) -> Result<Vec<i64>, ParseError> {
    let src = src.trim();
    if src.is_empty() {
        return Err(ParseError::Empty);
    }
    let src = src.strip_suffix(',').unwrap_or(src);
    src.split(',')
        .map(str::trim)
        .enumerate()
        .map(|(index, field)| {
            field.parse().map_err(|source| ParseError::InvalidInt {
                index,
                field: field.to_owned(),
                source,
            })
        })
        .collect()
}
