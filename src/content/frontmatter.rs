//! Front-matter parsing

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ContentError;

/// Date-time layouts accepted in the `date` field, besides RFC 3339
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// The metadata block at the top of a post.
///
/// `title`, `date` and `excerpt` are required; a file missing any of them, or
/// carrying one with the wrong YAML type, fails to compile. Unrecognised keys
/// are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl FrontMatter {
    /// Parse front-matter from file content.
    /// Returns (front_matter, remaining_content)
    pub fn parse<'a>(path: &Path, content: &'a str) -> Result<(Self, &'a str), ContentError> {
        let (yaml, body) =
            split_front_matter(content).ok_or_else(|| ContentError::MissingFrontMatter {
                path: path.to_path_buf(),
            })?;

        let fm: FrontMatter =
            serde_yaml::from_str(yaml).map_err(|source| ContentError::InvalidFrontMatter {
                path: path.to_path_buf(),
                source,
            })?;

        Ok((fm.normalized(), body.trim_start_matches(['\n', '\r'])))
    }

    /// Parse the date field
    pub fn parse_date(&self, path: &Path) -> Result<DateTime<FixedOffset>, ContentError> {
        parse_date_string(&self.date).ok_or_else(|| ContentError::InvalidDate {
            path: path.to_path_buf(),
            value: self.date.clone(),
        })
    }

    /// Blank optional values are treated as absent
    fn normalized(mut self) -> Self {
        for field in [&mut self.category, &mut self.author, &mut self.image] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }
}

/// Split `---\n<yaml>\n---\n<body>` into its two halves
fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let content = content.trim_start_matches('\u{feff}').trim_start();
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

/// Parse a date string in various formats.
///
/// Timestamps without an offset are taken as UTC.
fn parse_date_string(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let utc = FixedOffset::east_opt(0)?;

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.and_local_timezone(utc).single();
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0)?.and_local_timezone(utc).single();
        }
    }

    None
}
