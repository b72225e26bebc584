// src/preview/mod.rs
//! Live resume preview: form state + container width -> laid out document

pub mod html;
pub mod layout;
pub mod photo;

pub use layout::PageGeometry;
pub use photo::{ObjectUrl, ObjectUrlStore, PhotoPreview, OBJECT_URL_PREFIX};

use crate::types::{is_populated, BorderStyle, ResumeValues, DEFAULT_COLOR_HEX};
use crate::validation::is_hex_color;
use chrono::{DateTime, NaiveDate};
use serde::Serialize;

pub const PRESENT_LABEL: &str = "Present";
pub const SUMMARY_HEADING: &str = "Professional Profile";
pub const WORK_EXPERIENCE_HEADING: &str = "Work Experience";
pub const EDUCATION_HEADING: &str = "Education";
pub const SKILLS_HEADING: &str = "Skills";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDocument {
    pub page: PageGeometry,
    /// False until the container has been measured
    pub visible: bool,
    pub color_hex: String,
    pub border_style: BorderStyle,
    pub header: HeaderBlock,
    pub summary: Option<String>,
    pub work_experiences: Vec<ExperienceBlock>,
    pub educations: Vec<EducationBlock>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderBlock {
    pub photo_src: Option<String>,
    pub full_name: String,
    pub job_title: Option<String>,
    pub contact_line: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceBlock {
    pub position: Option<String>,
    pub company: Option<String>,
    pub date_range: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationBlock {
    pub degree: Option<String>,
    pub school: Option<String>,
    pub date_range: Option<String>,
}

fn populated(value: &Option<String>) -> Option<String> {
    if is_populated(value) {
        value.as_deref().map(|v| v.trim().to_string())
    } else {
        None
    }
}

/// `MM/yyyy` for `YYYY-MM-DD` or RFC 3339 input; anything else is shown as typed
pub fn format_month_year(date: &str) -> String {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return parsed.format("%m/%Y").to_string();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return parsed.format("%m/%Y").to_string();
    }
    date.to_string()
}

/// `MM/yyyy - MM/yyyy`, or `MM/yyyy - Present` for a current position
pub fn experience_date_range(start: &Option<String>, end: &Option<String>) -> Option<String> {
    let start = populated(start)?;
    let end = match populated(end) {
        Some(end) => format_month_year(&end),
        None => PRESENT_LABEL.to_string(),
    };
    Some(format!("{} - {}", format_month_year(&start), end))
}

/// `MM/yyyy - MM/yyyy`, or only the start when the end is unknown
pub fn education_date_range(start: &Option<String>, end: &Option<String>) -> Option<String> {
    let start = format_month_year(&populated(start)?);
    Some(match populated(end) {
        Some(end) => format!("{} - {}", start, format_month_year(&end)),
        None => start,
    })
}

/// `city, country • phone • email`, separators only between populated parts
pub fn contact_line(values: &ResumeValues) -> String {
    let location = [populated(&values.city), populated(&values.country)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    let mut parts = Vec::new();
    if !location.is_empty() {
        parts.push(location);
    }
    parts.extend(populated(&values.phone));
    parts.extend(populated(&values.email));
    parts.join(" • ")
}

fn split_skills(skills: &Option<String>) -> Vec<String> {
    populated(skills)
        .map(|s| {
            s.split([',', '\n'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Lay out the resume for a container `container_width` pixels wide.
///
/// `photo_src` is the already resolved displayable address (see
/// [`PhotoPreview`]); the renderer itself never touches photo bytes.
pub fn render_preview(
    values: &ResumeValues,
    container_width: f64,
    photo_src: Option<&str>,
) -> PreviewDocument {
    let page = PageGeometry::for_width(container_width);

    let work_experiences = values
        .work_experiences
        .iter()
        .filter(|exp| exp.is_populated())
        .map(|exp| ExperienceBlock {
            position: populated(&exp.position),
            company: populated(&exp.company),
            date_range: experience_date_range(&exp.start_date, &exp.end_date),
            description: populated(&exp.description),
        })
        .collect();

    let educations = values
        .educations
        .iter()
        .filter(|edu| edu.is_populated())
        .map(|edu| EducationBlock {
            degree: populated(&edu.degree),
            school: populated(&edu.school),
            date_range: education_date_range(&edu.start_date, &edu.end_date),
        })
        .collect();

    PreviewDocument {
        page,
        visible: page.is_measured(),
        color_hex: populated(&values.color_hex)
            .filter(|color| is_hex_color(color))
            .unwrap_or_else(|| DEFAULT_COLOR_HEX.to_string()),
        border_style: values.border_style.unwrap_or_default(),
        header: HeaderBlock {
            photo_src: photo_src.filter(|s| !s.is_empty()).map(str::to_string),
            full_name: values.full_name(),
            job_title: populated(&values.job_title),
            contact_line: contact_line(values),
        },
        summary: populated(&values.summary),
        work_experiences,
        educations,
        skills: split_skills(&values.skills),
    }
}
