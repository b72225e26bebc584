// src/ai/prompts.rs
//! Prompt templates. Deterministic: same input, same text.

use crate::validation::{GenerateSummaryInput, WorkExperienceDescription};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a job resume generator AI. Your task is to write a professional introduction summary for a resume given the user's provided data.
Only return the summary and do not include any other information in the response. Keep it concise and professional.";

pub const WORK_EXPERIENCE_SYSTEM_PROMPT: &str = "You are a job resume generator AI. Your task is to generate a single work experience entry based on the user input. Your response must adhere to the following structure.
You can omit fields if they can't be inferred from the provided data, but don't add any new ones.

Job Title: <job title>
Company: <company name>
Start Date: <format: YYYY-MM-DD (only if provided)>
End Date: <format: YYYY-MM-DD (only if provided)>
Description: <an optimized description in bullet format, might be inferred from the job title>";

const NOT_AVAILABLE: &str = "N/A";

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

pub fn summary_user_prompt(input: &GenerateSummaryInput) -> String {
    let experiences = input
        .work_experiences
        .iter()
        .map(|exp| {
            format!(
                "Position: {} at {} from {} to {}\n\nDescription:\n{}",
                or_na(&exp.position),
                or_na(&exp.company),
                or_na(&exp.start_date),
                exp.end_date.as_deref().unwrap_or("Present"),
                or_na(&exp.description),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let educations = input
        .educations
        .iter()
        .map(|edu| {
            format!(
                "Degree: {} at {} from {} to {}",
                or_na(&edu.degree),
                or_na(&edu.school),
                or_na(&edu.start_date),
                or_na(&edu.end_date),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Please generate a professional resume summary from this data:\n\n\
         Job Title: {}\n\n\
         Work Experience:\n{}\n\n\
         Education:\n{}\n\n\
         Skills:\n{}",
        or_na(&input.job_title),
        experiences,
        educations,
        input.skills.as_deref().unwrap_or_default(),
    )
}

pub fn work_experience_user_prompt(input: &WorkExperienceDescription) -> String {
    format!(
        "Please provide a work experience entry from this description:\n\n{}",
        input.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Education, WorkExperience};

    #[test]
    fn test_summary_prompt_defaults() {
        let input = GenerateSummaryInput {
            job_title: None,
            work_experiences: vec![WorkExperience {
                position: Some("Engineer".to_string()),
                ..Default::default()
            }],
            educations: vec![Education::default()],
            skills: Some("Rust".to_string()),
        };
        let prompt = summary_user_prompt(&input);

        assert!(prompt.contains("Job Title: N/A"));
        assert!(prompt.contains("Position: Engineer at N/A from N/A to Present"));
        assert!(prompt.contains("Degree: N/A at N/A from N/A to N/A"));
        assert!(prompt.ends_with("Skills:\nRust"));
    }

    #[test]
    fn test_summary_prompt_is_deterministic() {
        let input = GenerateSummaryInput {
            job_title: Some("Designer".to_string()),
            ..Default::default()
        };
        assert_eq!(summary_user_prompt(&input), summary_user_prompt(&input));
    }

    #[test]
    fn test_work_experience_prompt_embeds_description() {
        let prompt = work_experience_user_prompt(&WorkExperienceDescription {
            description: "Led the payments team at Acme".to_string(),
        });
        assert!(prompt.ends_with("Led the payments team at Acme"));
        assert!(WORK_EXPERIENCE_SYSTEM_PROMPT.contains("Start Date: <format: YYYY-MM-DD"));
    }
}
