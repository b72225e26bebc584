// src/ai/parser.rs
//! Label grammar for generated work-experience entries.
//!
//! ```text
//! Job Title: <line>
//! Company: <line>
//! Start Date: YYYY-MM-DD
//! End Date: YYYY-MM-DD
//! Description: <everything to the end>
//! ```
//!
//! Every label is optional. A missing label, an empty value or a date that is
//! not `YYYY-MM-DD` leaves the field absent.

use crate::types::WorkExperience;
use regex::Regex;
use std::sync::LazyLock;

static JOB_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Job Title: (.*)").expect("valid regex"));
static COMPANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Company: (.*)").expect("valid regex"));
static START_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Start Date: ([0-9]{4}-[0-9]{2}-[0-9]{2})").expect("valid regex"));
static END_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"End Date: ([0-9]{4}-[0-9]{2}-[0-9]{2})").expect("valid regex"));
static DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Description:(.*)").expect("valid regex"));

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn parse_work_experience(text: &str) -> WorkExperience {
    WorkExperience {
        position: capture(&JOB_TITLE, text),
        company: capture(&COMPANY, text),
        start_date: capture(&START_DATE, text),
        end_date: capture(&END_DATE, text),
        description: capture(&DESCRIPTION, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_entry() {
        let text = "Job Title: Engineer\nCompany: Acme\nStart Date: 2020-01-01\n\
                    Description:\n- Built the billing service\n- Cut latency by 40%\n\n";
        let exp = parse_work_experience(text);

        assert_eq!(exp.position.as_deref(), Some("Engineer"));
        assert_eq!(exp.company.as_deref(), Some("Acme"));
        assert_eq!(exp.start_date.as_deref(), Some("2020-01-01"));
        assert_eq!(exp.end_date, None);
        assert_eq!(
            exp.description.as_deref(),
            Some("- Built the billing service\n- Cut latency by 40%")
        );
    }

    #[test]
    fn test_dates_must_match_pattern() {
        let exp = parse_work_experience("Start Date: January 2020\nEnd Date: 2021-13\n");
        assert_eq!(exp.start_date, None);
        assert_eq!(exp.end_date, None);

        let exp = parse_work_experience("End Date: 2023-06-30 (approx.)");
        assert_eq!(exp.end_date.as_deref(), Some("2023-06-30"));
    }

    #[test]
    fn test_dates_need_ascii_digits() {
        let exp = parse_work_experience("Start Date: ٢٠٢٠-٠١-٠١\nEnd Date: ２０２１-０１-０１");
        assert_eq!(exp.start_date, None);
        assert_eq!(exp.end_date, None);
    }

    #[test]
    fn test_missing_labels_are_absent() {
        assert_eq!(parse_work_experience(""), WorkExperience::default());
        assert_eq!(
            parse_work_experience("I could not infer anything."),
            WorkExperience::default()
        );
    }

    #[test]
    fn test_label_value_stops_at_line_end() {
        let exp = parse_work_experience("Company: Acme Corp\nJob Title: \nDescription: ok");
        assert_eq!(exp.company.as_deref(), Some("Acme Corp"));
        assert_eq!(exp.position, None);
        assert_eq!(exp.description.as_deref(), Some("ok"));
    }
}
