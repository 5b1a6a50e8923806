use time::macros::time;
use time::Time;

use crate::timeofday::{format_time_of_day, minutes_between};

pub mod active;
pub mod seed;

pub use active::active_index;
pub use seed::{parse_blocks, SeedError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeblock {
    pub task: String,
    pub start: Time,
    pub end: Time,
}

impl Timeblock {
    pub fn new(task: impl Into<String>, start: Time, end: Time) -> Self {
        Self {
            task: task.into(),
            start,
            end,
        }
    }

    /// Length in whole minutes; zero or negative for inverted blocks.
    pub fn duration_minutes(&self) -> i64 {
        minutes_between(self.start, self.end)
    }

    pub fn range_label(&self) -> String {
        format!(
            "{}-{}",
            format_time_of_day(self.start),
            format_time_of_day(self.end)
        )
    }
}

/// The day's blocks, kept ascending by start time between mutations.
///
/// Positions are the only identity a block has, so any index held outside
/// this type is only good until the next sort or removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    blocks: Vec<Timeblock>,
}

impl Schedule {
    pub fn new(blocks: Vec<Timeblock>) -> Self {
        let mut schedule = Self { blocks };
        schedule.sort_by_start();
        schedule
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Timeblock> {
        self.blocks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Timeblock> {
        self.blocks.get_mut(index)
    }

    pub fn blocks(&self) -> &[Timeblock] {
        &self.blocks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timeblock> {
        self.blocks.iter()
    }

    pub fn append(&mut self, block: Timeblock) {
        self.blocks.push(block);
    }

    pub fn replace_at(&mut self, index: usize, block: Timeblock) -> Option<Timeblock> {
        let slot = self.blocks.get_mut(index)?;
        Some(std::mem::replace(slot, block))
    }

    /// Removes the block at `index`. Panics when out of bounds, like
    /// `Vec::remove`; callers check the index first.
    pub fn remove_at(&mut self, index: usize) -> Timeblock {
        self.blocks.remove(index)
    }

    /// Stable ascending sort on start time; ties keep insertion order.
    pub fn sort_by_start(&mut self) {
        self.blocks.sort_by_key(|block| block.start);
    }

    /// Sorts like [`Schedule::sort_by_start`] and reports where the block
    /// that sat at `index` ended up.
    pub fn sort_tracking(&mut self, index: usize) -> usize {
        let mut order: Vec<usize> = (0..self.blocks.len()).collect();
        order.sort_by_key(|&i| self.blocks[i].start);
        let new_index = order.iter().position(|&i| i == index).unwrap_or(index);
        let mut slots: Vec<Option<Timeblock>> = self.blocks.drain(..).map(Some).collect();
        self.blocks = order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        new_index
    }
}

pub fn default_schedule() -> Schedule {
    Schedule::new(vec![
        Timeblock::new("Deep Work", time!(7:00), time!(10:00)),
        Timeblock::new("Email", time!(10:00), time!(10:30)),
        Timeblock::new("Other Work", time!(10:30), time!(12:00)),
        Timeblock::new("Meeting", time!(12:00), time!(14:00)),
        Timeblock::new("Deep Work", time!(14:00), time!(16:00)),
    ])
}
