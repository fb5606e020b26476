use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::error::HistoryError;
use crate::event::EventRecord;

const DELIMITER: char = ';';
const HEADER: &str = "timestamp;problem_id;event_type;event_date;host_name;host_address;service_desc;event_state;event_output";

/// Append-only invocation history. One delimited row per invocation,
/// header written once when the file is first created. Diagnostic, not an
/// interchange format.
pub struct History {
    path: PathBuf,
}

impl History {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Record the normalized event.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or written.
    pub fn append(&self, event: &EventRecord) -> Result<(), HistoryError> {
        self.append_at(event, &Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
    }

    fn append_at(&self, event: &EventRecord, timestamp: &str) -> Result<(), HistoryError> {
        let write_header = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| HistoryError::Open {
                path: self.path.clone(),
                source,
            })?;

        let mut out = String::new();
        if write_header {
            out.push_str(HEADER);
            out.push('\n');
        }
        let problem_id = event.problem_id.to_string();
        let columns = [
            timestamp,
            &problem_id,
            &event.event_type,
            &event.event_date,
            &event.host_name,
            &event.host_address,
            &event.service_desc,
            &event.event_state,
            &event.event_output,
        ];
        let row: Vec<String> = columns.iter().map(|c| sanitize(c)).collect();
        out.push_str(&row.join(&DELIMITER.to_string()));
        out.push('\n');

        file.write_all(out.as_bytes())
            .map_err(|source| HistoryError::Append {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), problem_id = event.problem_id, "history row appended");
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Embedded delimiters and line breaks would corrupt the row layout.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == DELIMITER || c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
