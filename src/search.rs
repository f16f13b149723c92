// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Brute-force search over the noun (slot 1) and verb (slot 2) of a program
//!
//! Every candidate runs on its own clone of the template, so workers share nothing but the
//! bookkeeping needed to hand out nouns and stop early.

use std::num::NonZeroUsize;
use std::ops::RangeInclusive;
use std::panic;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::thread;

use tracing::debug;

use crate::{Fault, Interpreter};

/// Clone `template`, writing `noun` to slot 1 and `verb` to slot 2. Returns `None` if the
/// template's memory is too short to hold both.
pub fn with_noun_verb(template: &Interpreter, noun: i64, verb: i64) -> Option<Interpreter> {
    let mut interp = template.clone();
    interp.mem_override(1, noun)?;
    interp.mem_override(2, verb)?;
    Some(interp)
}

/// Find the `(noun, verb)` pair in `range × range` which leaves `target` in slot 0 when the
/// program halts, checking nouns across `workers` threads.
///
/// If several pairs match, the one with the lowest noun, then the lowest verb, is returned.
/// Candidates which hit the template's step limit are skipped; any other fault aborts the
/// search.
pub fn find_noun_verb(
    template: &Interpreter,
    target: i64,
    range: RangeInclusive<i64>,
    workers: NonZeroUsize,
) -> Result<Option<(i64, i64)>, Fault> {
    let (low, high) = (*range.start(), *range.end());
    if low > high || template.memory().len() < 3 {
        return Ok(None);
    }

    let next_noun = AtomicI64::new(low);
    let best_noun = AtomicI64::new(i64::MAX);
    let abort = AtomicBool::new(false);

    let worker = || -> Result<Option<(i64, i64)>, Fault> {
        loop {
            let noun = next_noun.fetch_add(1, Ordering::Relaxed);
            if noun > high
                || noun < low
                || noun > best_noun.load(Ordering::Relaxed)
                || abort.load(Ordering::Relaxed)
            {
                return Ok(None);
            }
            for verb in low..=high {
                let Some(mut candidate) = with_noun_verb(template, noun, verb) else {
                    return Ok(None);
                };
                match candidate.run_through_inputs(std::iter::empty()) {
                    Ok(_) if candidate.mem_get(0) == Some(target) => {
                        debug!(noun, verb, "found matching pair");
                        best_noun.fetch_min(noun, Ordering::Relaxed);
                        return Ok(Some((noun, verb)));
                    }
                    Ok(_) => (),
                    Err(Fault::StepLimitExceeded { limit, .. }) => {
                        debug!(noun, verb, limit, "candidate skipped: step limit");
                    }
                    Err(fault) => {
                        abort.store(true, Ordering::Relaxed);
                        return Err(fault);
                    }
                }
            }
        }
    };

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..workers.get()).map(|_| s.spawn(worker)).collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect()
    });

    let mut best = None;
    for result in results {
        if let Some(pair) = result? {
            best = Some(best.map_or(pair, |b: (i64, i64)| b.min(pair)));
        }
    }
    Ok(best)
}
