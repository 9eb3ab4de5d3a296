//! Parser for the table printed by `vagrant global-status`.
//!
//! ```text
//! id       name    provider   state    directory
//! -------------------------------------------------------------
//! 1a2b3c4  default virtualbox poweroff /home/me/projects/web
//!
//! The above shows information about all known Vagrant environments
//! ```

use log::{debug, trace};

use super::model::InstanceStatus;

const COLUMN_COUNT: usize = 5;

/// Extract one [`InstanceStatus`] per table row.
///
/// Output without a header (e.g. "There are no active Vagrant environments")
/// yields an empty list.
pub fn parse_global_status(output: &str) -> Vec<InstanceStatus> {
    let mut lines = output.lines();

    if !lines.by_ref().any(is_header_line) {
        debug!("global-status output has no instance table");
        return Vec::new();
    }

    let mut statuses = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with('-') && trimmed.chars().all(|c| c == '-') {
            continue;
        }
        if trimmed.is_empty() {
            break;
        }
        match parse_row(trimmed) {
            Some(status) => {
                trace!("Parsed instance row: {:?}", status);
                statuses.push(status);
            }
            None => debug!("Skipping malformed global-status row: {}", trimmed),
        }
    }
    statuses
}

fn is_header_line(line: &str) -> bool {
    let columns: Vec<&str> = line.split_whitespace().collect();
    columns == ["id", "name", "provider", "state", "directory"]
}

/// Split a row into four whitespace-separated columns plus the directory,
/// which keeps any embedded spaces.
fn parse_row(row: &str) -> Option<InstanceStatus> {
    let mut rest = row;
    let mut columns = Vec::with_capacity(COLUMN_COUNT);

    for _ in 0..COLUMN_COUNT - 1 {
        let end = rest.find(char::is_whitespace)?;
        columns.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    if rest.is_empty() {
        return None;
    }

    Some(InstanceStatus {
        id: columns[0].to_string(),
        name: columns[1].to_string(),
        provider: columns[2].to_string(),
        state: columns[3].to_string(),
        cwd: rest.trim_end().to_string(),
    })
}
