use time::Time;

use super::Timeblock;
use crate::timeofday::minute_of_day;

/// Index of the first block with `start <= now < end`, compared at minute
/// resolution. Overlapping or inverted blocks are fine: the scan simply
/// returns the earliest match in schedule order.
pub fn active_index(blocks: &[Timeblock], now: Time) -> Option<usize> {
    let now = minute_of_day(now);
    blocks.iter().position(|block| {
        minute_of_day(block.start) <= now && now < minute_of_day(block.end)
    })
}
