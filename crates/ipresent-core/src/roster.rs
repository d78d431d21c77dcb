//! Display projection of the attendance roster.

use crate::types::{AttendanceRecord, SessionInfo};
use std::fmt;

/// Shown in place of a parent email the backend could not supply.
pub const UNKNOWN_PLACEHOLDER: &str = "unknown";

/// Literal the backend emits for a missing spreadsheet cell.
const NAN_SENTINEL: &str = "NaN";

/// One display row, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub position: usize,
    pub name: String,
    pub uin: String,
    pub parent_email: String,
    pub status: &'static str,
}

/// The rendered result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Roster {
    /// The backend recognized nobody.
    NoMatches,
    Rows(Vec<RosterRow>),
}

impl Roster {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        if records.is_empty() {
            return Roster::NoMatches;
        }
        Roster::Rows(
            records
                .iter()
                .enumerate()
                .map(|(i, record)| RosterRow {
                    position: i + 1,
                    name: record.name.clone(),
                    uin: record.uin.clone(),
                    parent_email: display_email(record.parent_email.as_deref()).to_string(),
                    status: if record.present { "Present" } else { "Absent" },
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Roster::NoMatches => 0,
            Roster::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Summary line shown above the roster.
pub fn header(count: usize, info: &SessionInfo) -> String {
    format!(
        "{count} students detected • {} • {}",
        info.operator_name, info.subject_name
    )
}

fn display_email(raw: Option<&str>) -> &str {
    match raw.map(str::trim) {
        Some(email) if !email.is_empty() && email != NAN_SENTINEL => email,
        _ => UNKNOWN_PLACEHOLDER,
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = match self {
            Roster::NoMatches => {
                writeln!(f, "No students detected")?;
                return writeln!(
                    f,
                    "Try uploading clearer images or with better lighting conditions"
                );
            }
            Roster::Rows(rows) => rows,
        };

        let name_w = column_width("Student Name", rows.iter().map(|r| r.name.as_str()));
        let uin_w = column_width("UIN", rows.iter().map(|r| r.uin.as_str()));
        let email_w = column_width("Parent Email", rows.iter().map(|r| r.parent_email.as_str()));

        writeln!(
            f,
            "{:>3}  {:<name_w$}  {:<uin_w$}  {:<email_w$}  Status",
            "#", "Student Name", "UIN", "Parent Email"
        )?;
        for row in rows {
            writeln!(
                f,
                "{:>3}  {:<name_w$}  {:<uin_w$}  {:<email_w$}  {}",
                row.position, row.name, row.uin, row.parent_email, row.status
            )?;
        }
        Ok(())
    }
}

fn column_width<'a>(title: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(title.len()))
        .max()
        .unwrap_or(0)
}
