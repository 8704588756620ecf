//! Difficulty retargeting
//!
//! Computes the compact target the next block must satisfy from a
//! bounded window of ancestor headers. Two variants are in force,
//! selected by height: the pre-fork rule walks up to 120 ancestors and
//! blends two timing statistics, the post-fork rule uses a fixed window
//! of 24. Every node must reproduce these results bit for bit, so all
//! target arithmetic runs on [`BigUint`] magnitudes and all timing
//! arithmetic on integers; there is no floating point anywhere on this
//! path.

use log::debug;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::chain::HeaderView;
use crate::compact::{decode_compact, encode_compact};
use crate::params::ConsensusParams;

/// Ancestors averaged before the pre-fork difficulty mean freezes
const SMOOTHED_MIN_BLOCKS: u64 = 12;

/// Most ancestors the pre-fork walk will visit
const SMOOTHED_MAX_BLOCKS: u64 = 120;

/// Fixed ancestor window used at and after the retarget fork
const WINDOWED_BLOCKS: u64 = 24;

/// The measured timespan may not leave `[scheduled/3, scheduled*3]`
const MAX_TIMESPAN_FACTOR: i64 = 3;

/// Fixed-point scale carrying the 70/30 timing blend in integers
const BLEND_SCALE: i64 = 10;

/// Compact target required of the block following `prev`.
///
/// On networks with `allow_min_difficulty_blocks`, a candidate stamped
/// more than twice the scheduled spacing after `prev` may be mined at
/// the pow limit regardless of window contents. Otherwise the variant
/// in force at the candidate's height computes the target from ancestor
/// history; with less history than the variant's minimum window the pow
/// limit is returned.
pub fn next_work_required<H: HeaderView>(
    prev: &H,
    candidate_timestamp: i64,
    params: &ConsensusParams,
) -> u32 {
    if params.allow_min_difficulty_blocks
        && candidate_timestamp > prev.timestamp() + params.pow_target_spacing * 2
    {
        return encode_compact(&params.pow_limit);
    }

    let bits = if prev.height() + 1 >= params.retarget_fork_height {
        retarget_windowed(prev, params)
    } else {
        retarget_smoothed(prev, params)
    };

    debug!(
        "next work after block {} is {:#010x}",
        prev.height(),
        bits
    );

    bits
}

/// Pre-fork retarget over a growing window of up to 120 ancestors.
///
/// The difficulty mean freezes after 12 samples; the walk continues for
/// timing statistics only. Two timing measures are blended 70/30: a
/// frozen incremental mean of the deltas and the plain mean over the
/// whole window.
fn retarget_smoothed<H: HeaderView>(prev: &H, params: &ConsensusParams) -> u32 {
    if prev.height() < SMOOTHED_MIN_BLOCKS {
        return encode_compact(&params.pow_limit);
    }

    let mut blocks: u64 = 0;
    let mut difficulty_avg = BigUint::zero();
    let mut delta_avg: i64 = 0;
    let mut delta_samples: i64 = 0;
    let mut delta_sum: i64 = 0;
    let mut delta_count: i64 = 0;
    let mut newer_timestamp: Option<i64> = None;

    for header in prev
        .ancestors()
        .take_while(|h| h.height() > 0)
        .take(SMOOTHED_MAX_BLOCKS as usize)
    {
        blocks += 1;

        if blocks <= SMOOTHED_MIN_BLOCKS {
            let target = decode_compact(header.bits());
            difficulty_avg = if blocks == 1 {
                target
            } else {
                running_average(&difficulty_avg, &target, blocks)
            };
        }

        if let Some(newer) = newer_timestamp {
            let delta = (newer - header.timestamp()).max(0);
            // The `<=` on the pre-incremented counter admits one more
            // timing sample than the difficulty mean takes; consensus
            // depends on the off-by-one.
            if delta_samples <= SMOOTHED_MIN_BLOCKS as i64 {
                delta_samples += 1;
                if delta_samples == 1 {
                    delta_avg = delta;
                } else {
                    delta_avg += (delta - delta_avg) / delta_samples;
                }
            }
            delta_count += 1;
            delta_sum += delta;
        }
        newer_timestamp = Some(header.timestamp());
    }

    let mut new_target = difficulty_avg;
    if delta_samples != 0 && delta_count != 0 {
        // Blend carried in tenths of a second so the 70/30 split stays
        // in integers; never below one second.
        let blended = (7 * delta_avg + 3 * (delta_sum / delta_count)).max(BLEND_SCALE);

        let scheduled_timespan = blocks as i64 * params.pow_target_spacing;
        let actual_timespan =
            clamp_timespan(blocks as i64 * blended / BLEND_SCALE, scheduled_timespan);

        new_target = new_target * actual_timespan as u64 / scheduled_timespan as u64;
    }

    encode_capped(new_target, &params.pow_limit)
}

/// Post-fork retarget over a fixed window of 24 ancestors.
///
/// The difficulty mean is cumulative-weighted, `(avg*i + target)/(i+1)`,
/// and deliberately not the incremental mean of the pre-fork rule. The
/// timespan is the bare sum of deltas; it may go negative under
/// reordered timestamps and is repaired by the clamp.
fn retarget_windowed<H: HeaderView>(prev: &H, params: &ConsensusParams) -> u32 {
    if prev.height() < WINDOWED_BLOCKS {
        return encode_compact(&params.pow_limit);
    }

    let mut blocks: u64 = 0;
    let mut difficulty_avg = BigUint::zero();
    let mut actual_timespan: i64 = 0;
    let mut newer_timestamp: Option<i64> = None;

    for header in prev
        .ancestors()
        .take_while(|h| h.height() > 0)
        .take(WINDOWED_BLOCKS as usize)
    {
        blocks += 1;

        let target = decode_compact(header.bits());
        difficulty_avg = if blocks == 1 {
            target
        } else {
            (difficulty_avg * blocks + target) / (blocks + 1)
        };

        if let Some(newer) = newer_timestamp {
            actual_timespan += newer - header.timestamp();
        }
        newer_timestamp = Some(header.timestamp());
    }

    let scheduled_timespan = blocks as i64 * params.pow_target_spacing;
    let actual_timespan = clamp_timespan(actual_timespan, scheduled_timespan);
    let new_target = difficulty_avg * actual_timespan as u64 / scheduled_timespan as u64;

    encode_capped(new_target, &params.pow_limit)
}

/// One step of the incremental mean `avg + (sample - avg) / n`, carried
/// out on unsigned magnitudes with truncating division.
fn running_average(avg: &BigUint, sample: &BigUint, n: u64) -> BigUint {
    if sample >= avg {
        avg + (sample - avg) / n
    } else {
        avg - (avg - sample) / n
    }
}

fn clamp_timespan(actual: i64, scheduled: i64) -> i64 {
    actual
        .max(scheduled / MAX_TIMESPAN_FACTOR)
        .min(scheduled * MAX_TIMESPAN_FACTOR)
}

fn encode_capped(target: BigUint, pow_limit: &BigUint) -> u32 {
    if &target > pow_limit {
        encode_compact(pow_limit)
    } else {
        encode_compact(&target)
    }
}
