//! Interval helpers shared by the constraint catalog.
//!
//! All intervals are half-open `[start, end)` in absolute minutes: an
//! activity ending exactly when another starts does not overlap it.

use std::collections::BTreeMap;

use crate::models::{Booking, Period};

/// Whether two `(start, duration)` pairs overlap.
#[inline]
pub fn overlaps(a: Period, a_minutes: u32, b: Period, b_minutes: u32) -> bool {
    let (a_start, a_end) = bounds(a, a_minutes);
    let (b_start, b_end) = bounds(b, b_minutes);
    a_start < b_end && b_start < a_end
}

/// Minutes between the earlier interval's end and the later one's start.
///
/// Zero when back to back, negative when they overlap.
pub fn gap_between(a: Period, a_minutes: u32, b: Period, b_minutes: u32) -> i64 {
    let (a_start, a_end) = bounds(a, a_minutes);
    let (b_start, b_end) = bounds(b, b_minutes);
    if a_start <= b_start {
        b_start - a_end
    } else {
        a_start - b_end
    }
}

/// [`overlaps`] for two bookings.
#[inline]
pub fn bookings_overlap(a: &Booking<'_>, b: &Booking<'_>) -> bool {
    overlaps(
        a.period,
        a.activity.duration_minutes,
        b.period,
        b.activity.duration_minutes,
    )
}

/// [`gap_between`] for two bookings.
#[inline]
pub fn booking_gap(a: &Booking<'_>, b: &Booking<'_>) -> i64 {
    gap_between(
        a.period,
        a.activity.duration_minutes,
        b.period,
        b.activity.duration_minutes,
    )
}

/// Partitions bookings by day, each day sorted by start.
pub fn group_by_day<'a>(bookings: &[Booking<'a>]) -> BTreeMap<u32, Vec<Booking<'a>>> {
    let mut days: BTreeMap<u32, Vec<Booking<'a>>> = BTreeMap::new();
    for b in bookings {
        days.entry(b.period.day).or_default().push(*b);
    }
    for day in days.values_mut() {
        day.sort_by_key(|b| (b.start(), b.end()));
    }
    days
}

/// Merges bookings into continuous blocks and returns each block's length.
///
/// Bookings are sorted by start; the next one joins the current block while
/// the gap from the block's end to its start is at most `max_gap` minutes.
/// A block's length runs from its first start to its last end, so tolerated
/// gaps count towards it.
pub fn continuous_blocks(bookings: &[Booking<'_>], max_gap: i64) -> Vec<i64> {
    let mut sorted: Vec<(i64, i64)> = bookings.iter().map(|b| (b.start(), b.end())).collect();
    sorted.sort_unstable();

    let mut blocks = Vec::new();
    let mut iter = sorted.into_iter();
    let Some((mut block_start, mut block_end)) = iter.next() else {
        return blocks;
    };
    for (start, end) in iter {
        if start - block_end <= max_gap {
            block_end = block_end.max(end);
        } else {
            blocks.push(block_end - block_start);
            block_start = start;
            block_end = end;
        }
    }
    blocks.push(block_end - block_start);
    blocks
}

/// Latest end minus earliest start; 0 for no bookings.
pub fn span(bookings: &[Booking<'_>]) -> i64 {
    let start = bookings.iter().map(Booking::start).min();
    let end = bookings.iter().map(Booking::end).max();
    match (start, end) {
        (Some(start), Some(end)) => end - start,
        _ => 0,
    }
}

/// Sum of booking durations.
pub fn busy_minutes(bookings: &[Booking<'_>]) -> i64 {
    bookings
        .iter()
        .map(|b| b.activity.duration_minutes as i64)
        .sum()
}

fn bounds(p: Period, minutes: u32) -> (i64, i64) {
    let start = p.absolute_minutes();
    (start, start + minutes as i64)
}
