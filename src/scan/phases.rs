// The three per-worker steps of the scan. Each one only touches the memory
// handed to it, so the orchestrator decides who may run what and when.

use crate::error::ScanError;

/// In-place inclusive scan of one chunk, relative to the chunk's own start.
///
/// The first element is left as is. Afterwards `tail` holds the chunk total.
pub fn local_scan(body: &mut [i64], tail: &mut i64) {
    for i in 1..body.len() {
        body[i] = body[i].wrapping_add(body[i - 1]);
    }
    if let Some(&last) = body.last() {
        *tail = tail.wrapping_add(last);
    }
}

/// Turns per-chunk totals into global prefix values.
///
/// `tails[j]` is the final element of chunk `j` after its local scan. The
/// totals are copied into a table, scanned, and written back, so that each
/// tail ends up equal to the sum of every original element up to and
/// including it.
pub fn combine_boundaries(tails: &mut [&mut i64]) -> Result<(), ScanError> {
    let mut totals: Vec<i64> = Vec::new();
    totals
        .try_reserve_exact(tails.len())
        .map_err(|source| ScanError::ResourceExhaustion {
            what: "chunk total table",
            count: tails.len(),
            source,
        })?;

    totals.extend(tails.iter().map(|tail| **tail));
    for k in 1..totals.len() {
        totals[k] = totals[k].wrapping_add(totals[k - 1]);
    }
    for (tail, total) in tails.iter_mut().zip(&totals) {
        **tail = *total;
    }
    Ok(())
}

/// Adds the previous chunk's final value to every element of `body`.
///
/// The chunk's own final element is not part of `body`; it is already
/// correct after [`combine_boundaries`].
pub fn propagate_carry(body: &mut [i64], carry: i64) {
    for value in body.iter_mut() {
        *value = value.wrapping_add(carry);
    }
}
