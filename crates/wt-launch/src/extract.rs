//! Pull the wall-clock duration out of a simulation's textual output.
//!
//! The simulator ends a successful run with a line such as
//! `Total wall time: 0:01:30`. Nothing else about the output is structured,
//! so detection is a substring check on the last non-empty line followed by
//! an `H:M:S` parse of its final token.

use wt_types::{JobResult, MalformedReason, Outcome};

/// Case-insensitive marker the last line must contain.
pub const WALL_TIME_MARKER: &str = "total wall time";

pub fn extract(stdout: &str) -> JobResult {
    JobResult {
        raw: stdout.to_string(),
        outcome: outcome(stdout),
    }
}

fn outcome(stdout: &str) -> Outcome {
    // Whitespace-only lines count as blank on purpose, so a timing report
    // followed by a padding or bare "\r" line still yields a duration
    // instead of a skipped trial.
    let Some(line) = stdout.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()).last() else {
        return Outcome::Malformed {
            reason: MalformedReason::EmptyOutput,
            line: String::new(),
        };
    };

    if !line.to_lowercase().contains(WALL_TIME_MARKER) {
        return Outcome::Malformed {
            reason: MalformedReason::MissingMarker,
            line: line.to_string(),
        };
    }

    let token = line.split_whitespace().last().unwrap_or_default();
    match parse_hms(token) {
        Ok(seconds) => Outcome::Elapsed { seconds },
        Err(reason) => Outcome::Malformed {
            reason,
            line: line.to_string(),
        },
    }
}

/// Parse `H:M:S` into total seconds. Hours may exceed 23 and minutes or
/// seconds are not range-checked, matching what the simulator prints for
/// long runs.
pub fn parse_hms(token: &str) -> Result<u64, MalformedReason> {
    let fields: Vec<&str> = token.split(':').collect();
    let [hours, minutes, seconds] = fields.as_slice() else {
        return Err(MalformedReason::BadFieldCount {
            fields: fields.len(),
        });
    };

    let component = |raw: &str| {
        raw.parse::<u64>().map_err(|_| MalformedReason::NonNumeric {
            component: raw.to_string(),
        })
    };
    let (h, m, s) = (component(*hours)?, component(*minutes)?, component(*seconds)?);

    h.checked_mul(3600)
        .and_then(|total| total.checked_add(m.checked_mul(60)?))
        .and_then(|total| total.checked_add(s))
        .ok_or_else(|| MalformedReason::NonNumeric {
            component: token.to_string(),
        })
}
