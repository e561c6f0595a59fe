//! Positional date templates and date extraction from file names.
//!
//! A template is a string of markers. Each marker consumes exactly one
//! character of the file name, left to right, starting at the first one:
//!
//! | Marker | Meaning          |
//! |--------|------------------|
//! | `Г`    | year digit       |
//! | `М`    | month digit      |
//! | `Д`    | day digit        |
//! | `?`    | skipped position |
//!
//! # Examples
//!
//! ```
//! use datesort::template::extract_date;
//!
//! let date = extract_date("AB2024C05D17.mp4", "??ГГГГ?ММ?ДД").unwrap();
//! assert_eq!(date.year, "2024");
//! assert_eq!(date.month, "05");
//! assert_eq!(date.day, "17");
//! assert_eq!(date.folder_name(), "17-05-2024");
//! ```

use std::fmt;

/// One positional marker of a date template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Year,
    Month,
    Day,
    Skip,
}

impl Marker {
    /// Maps a template character to its marker, if it is one.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'Г' => Some(Marker::Year),
            'М' => Some(Marker::Month),
            'Д' => Some(Marker::Day),
            '?' => Some(Marker::Skip),
            _ => None,
        }
    }
}

/// The date fields a template can capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Year,
    Month,
    Day,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DateField::Year => "year",
            DateField::Month => "month",
            DateField::Day => "day",
        };
        f.write_str(name)
    }
}

/// Errors produced while matching a template against a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template contains a character that is not a marker.
    InvalidMarker { character: char, position: usize },
    /// The file name ran out before the template did.
    FileNameTooShort { template_len: usize, name_len: usize },
    /// A captured field is not a non-negative base-10 number.
    InvalidNumber { field: DateField, value: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMarker {
                character,
                position,
            } => write!(
                f,
                "template contains invalid character '{}' at position {}",
                character, position
            ),
            Self::FileNameTooShort {
                template_len,
                name_len,
            } => write!(
                f,
                "file name has {} characters but the template needs {}",
                name_len, template_len
            ),
            Self::InvalidNumber { field, value } => {
                write!(f, "could not parse {} from '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Year, month and day exactly as they appear in the file name.
///
/// No calendar validation is done: month `13` is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDate {
    pub year: String,
    pub month: String,
    pub day: String,
}

impl ExtractedDate {
    /// Name of the dated folder, `<day>-<month>-<year>`.
    pub fn folder_name(&self) -> String {
        format!("{}-{}-{}", self.day, self.month, self.year)
    }
}

/// Extracts the date encoded in `file_name` according to `template`.
///
/// The whole template is validated first, so an unknown marker is reported
/// even when the file name is shorter than the template. Markers and file
/// name characters are then consumed in lockstep, and a file name shorter
/// than the template fails instead of reading past its end.
pub fn extract_date(file_name: &str, template: &str) -> Result<ExtractedDate, TemplateError> {
    let markers = template
        .chars()
        .enumerate()
        .map(|(position, ch)| {
            Marker::from_char(ch).ok_or(TemplateError::InvalidMarker {
                character: ch,
                position,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut year = String::new();
    let mut month = String::new();
    let mut day = String::new();
    let mut name_chars = file_name.chars();

    for marker in &markers {
        let Some(name_char) = name_chars.next() else {
            return Err(TemplateError::FileNameTooShort {
                template_len: markers.len(),
                name_len: file_name.chars().count(),
            });
        };

        match marker {
            Marker::Year => year.push(name_char),
            Marker::Month => month.push(name_char),
            Marker::Day => day.push(name_char),
            Marker::Skip => {}
        }
    }

    check_number(DateField::Year, &year)?;
    check_number(DateField::Month, &month)?;
    check_number(DateField::Day, &day)?;

    Ok(ExtractedDate { year, month, day })
}

fn check_number(field: DateField, value: &str) -> Result<(), TemplateError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(TemplateError::InvalidNumber {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
