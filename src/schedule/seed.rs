use thiserror::Error;

use super::Timeblock;
use crate::timeofday::{parse_time_of_day, TimeParseError};

pub const BLOCK_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("invalid format: '{0}'. Expected 'START-END TASKNAME'")]
    MissingTask(String),
    #[error("invalid time range: '{0}'. Expected 'HH:MM-HH:MM'")]
    Range(String),
    #[error("invalid time in '{block}': {source}")]
    Time {
        block: String,
        #[source]
        source: TimeParseError,
    },
}

/// Parses `START-END TASK[;START-END TASK...]` into timeblocks, in the order
/// given. Blank segments (a trailing `;`, say) are skipped; anything else
/// that does not parse aborts the whole seed.
pub fn parse_blocks(raw: &str) -> Result<Vec<Timeblock>, SeedError> {
    raw.split(BLOCK_SEPARATOR)
        .filter(|segment| !segment.trim().is_empty())
        .map(parse_block)
        .collect()
}

fn parse_block(segment: &str) -> Result<Timeblock, SeedError> {
    let block = segment.trim();
    let (range, task) = block
        .split_once(char::is_whitespace)
        .map(|(range, task)| (range, task.trim()))
        .filter(|(_, task)| !task.is_empty())
        .ok_or_else(|| SeedError::MissingTask(block.to_owned()))?;
    let (start, end) = range
        .split_once('-')
        .filter(|(_, end)| !end.contains('-'))
        .ok_or_else(|| SeedError::Range(range.to_owned()))?;
    let parse = |raw: &str| {
        parse_time_of_day(raw.trim()).map_err(|source| SeedError::Time {
            block: block.to_owned(),
            source,
        })
    };
    Ok(Timeblock::new(task, parse(start)?, parse(end)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use time::macros::time;

    #[test]
    fn parses_the_usage_example() {
        let blocks = parse_blocks("07:00-09:00 Deep Work;09:00-09:30 Emails").expect("valid");
        assert_eq!(
            blocks,
            vec![
                Timeblock::new("Deep Work", time!(7:00), time!(9:00)),
                Timeblock::new("Emails", time!(9:00), time!(9:30)),
            ]
        );
    }

    #[test]
    fn tolerates_spacing_and_trailing_separator() {
        let blocks = parse_blocks(" 7:00-8:00  Gym ; 08:00-08:30 Breakfast;").expect("valid");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].task, "Gym");
        assert_eq!(blocks[0].start, time!(7:00));
        assert_eq!(blocks[1].task, "Breakfast");
        assert_eq!(blocks[1].end, time!(8:30));
    }

    #[test]
    fn rejects_block_without_task() {
        assert_matches!(
            parse_blocks("07:00-09:00"),
            Err(SeedError::MissingTask(block)) if block == "07:00-09:00"
        );
    }

    #[test]
    fn rejects_bad_ranges_and_times() {
        assert_matches!(parse_blocks("07:00 Task"), Err(SeedError::Range(_)));
        assert_matches!(parse_blocks("07:00-08:00-09:00 Task"), Err(SeedError::Range(_)));
        assert_matches!(
            parse_blocks("07:00-25:00 Task"),
            Err(SeedError::Time {
                source: TimeParseError::Hour(25),
                ..
            })
        );
    }

    #[test]
    fn empty_input_yields_no_blocks() {
        assert_eq!(parse_blocks("").expect("valid"), Vec::new());
    }
}
