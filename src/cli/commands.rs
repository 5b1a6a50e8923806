use anyhow::{bail, Context, Result};
use clap::Args;

use crate::app::{wall_clock_now, App, ExitReason};
use crate::config::AppConfig;
use crate::render::{render_blocks, to_plain_text, RenderOptions};
use crate::schedule::{active_index, Schedule};
use crate::timeofday::parse_time_of_day;

#[derive(Args, Debug, Clone)]
pub struct PrintArgs {
    /// Column width in terminal cells
    #[arg(long, default_value_t = 60)]
    pub width: u16,
    /// Mark the block active at this time (HH:MM)
    #[arg(long, conflicts_with = "now")]
    pub at: Option<String>,
    /// Mark the block active at the current wall-clock time
    #[arg(long)]
    pub now: bool,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    if !atty::is(atty::Stream::Stdout) {
        bail!("stdout is not a terminal; use `deepwork print` for non-interactive output");
    }
    match app.run()? {
        ExitReason::Shutdown => println!("Shutdown complete."),
        ExitReason::Quit | ExitReason::Interrupted => {}
    }
    Ok(())
}

pub fn print_schedule(config: &AppConfig, schedule: &Schedule, args: &PrintArgs) -> Result<()> {
    let output = format_schedule(config, schedule, args)?;
    println!("{output}");
    Ok(())
}

fn format_schedule(config: &AppConfig, schedule: &Schedule, args: &PrintArgs) -> Result<String> {
    let now = match (&args.at, args.now) {
        (Some(raw), _) => Some(
            parse_time_of_day(raw.trim()).with_context(|| format!("parsing --at '{raw}'"))?,
        ),
        (None, true) => Some(wall_clock_now()),
        (None, false) => None,
    };
    let active = now.and_then(|now| active_index(schedule.blocks(), now));
    let options = RenderOptions {
        palette: config.palette(),
        minutes_per_line: config.minutes_per_line,
        width: args.width,
    };
    let (lines, _) = render_blocks(schedule, None, active, &options);
    Ok(to_plain_text(&lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::default_schedule;

    type TestResult<T = ()> = Result<T>;

    fn args(at: Option<&str>) -> PrintArgs {
        PrintArgs {
            width: 60,
            at: at.map(str::to_owned),
            now: false,
        }
    }

    #[test]
    fn print_lists_every_block_in_order() -> TestResult {
        let output = format_schedule(&AppConfig::default(), &default_schedule(), &args(None))?;
        let positions: Vec<usize> = ["07:00-10:00", "10:00-10:30", "10:30-12:00", "12:00-14:00"]
            .iter()
            .map(|label| output.find(label).expect("label present"))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(!output.contains("◀ now"));
        Ok(())
    }

    #[test]
    fn print_marks_block_active_at_given_time() -> TestResult {
        let output =
            format_schedule(&AppConfig::default(), &default_schedule(), &args(Some("10:15")))?;
        let marked: Vec<&str> = output.lines().filter(|l| l.contains("◀ now")).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("10:00-10:30  Email"));
        Ok(())
    }

    #[test]
    fn print_rejects_malformed_time() {
        let err = format_schedule(&AppConfig::default(), &default_schedule(), &args(Some("25:00")))
            .expect_err("bad time");
        assert!(format!("{err:#}").contains("--at"));
    }

    #[test]
    fn scale_comes_from_config() -> TestResult {
        let config = AppConfig {
            minutes_per_line: 60,
            ..AppConfig::default()
        };
        let schedule = Schedule::new(vec![crate::schedule::Timeblock::new(
            "Deep Work",
            time::macros::time!(7:00),
            time::macros::time!(10:00),
        )]);
        let output = format_schedule(&config, &schedule, &args(None))?;
        assert_eq!(output.lines().count(), 2 + 3);
        Ok(())
    }
}
