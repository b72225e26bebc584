// src/preview/html.rs
//! HTML fragment for a [`PreviewDocument`]

use super::{
    PreviewDocument, EDUCATION_HEADING, SKILLS_HEADING, SUMMARY_HEADING, WORK_EXPERIENCE_HEADING,
};
use crate::types::BorderStyle;
use std::fmt::Write;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn photo_radius(style: BorderStyle) -> &'static str {
    match style {
        BorderStyle::Square => "0px",
        BorderStyle::Circle => "9999px",
        BorderStyle::Squircle => "10%",
    }
}

fn section_start(out: &mut String, color: &str, heading: &str) {
    let _ = write!(
        out,
        r#"<hr style="border-width:2px;border-color:{color}"/><section class="break-inside-avoid"><p class="section-title" style="color:{color}">{heading}</p>"#,
        color = escape(color),
        heading = heading,
    );
}

pub fn render_html(doc: &PreviewDocument) -> String {
    let mut out = String::new();
    let color = doc.color_hex.as_str();

    let _ = write!(
        out,
        r#"<div class="resume-page" style="width:{:.2}px;height:{:.2}px"><div class="resume-content" style="zoom:{:.6}{}">"#,
        doc.page.width_px,
        doc.page.height_px,
        doc.page.scale,
        if doc.visible { "" } else { ";visibility:hidden" },
    );

    // Header
    out.push_str(r#"<header class="personal-info">"#);
    if let Some(src) = &doc.header.photo_src {
        let _ = write!(
            out,
            r#"<img src="{}" width="100" height="100" alt="Author Photo" style="border-radius:{}"/>"#,
            escape(src),
            photo_radius(doc.border_style),
        );
    }
    let _ = write!(
        out,
        r#"<div><p class="name" style="color:{}">{}</p>"#,
        escape(color),
        escape(&doc.header.full_name)
    );
    if let Some(job_title) = &doc.header.job_title {
        let _ = write!(
            out,
            r#"<p class="job-title" style="color:{}">{}</p>"#,
            escape(color),
            escape(job_title)
        );
    }
    let _ = write!(
        out,
        r#"<p class="contact">{}</p></div></header>"#,
        escape(&doc.header.contact_line)
    );

    if let Some(summary) = &doc.summary {
        section_start(&mut out, color, SUMMARY_HEADING);
        let _ = write!(out, r#"<div class="pre-line">{}</div></section>"#, escape(summary));
    }

    if !doc.work_experiences.is_empty() {
        section_start(&mut out, color, WORK_EXPERIENCE_HEADING);
        for exp in &doc.work_experiences {
            let _ = write!(
                out,
                r#"<div class="entry"><div class="entry-head" style="color:{}"><span>{}</span>"#,
                escape(color),
                escape(exp.position.as_deref().unwrap_or_default())
            );
            if let Some(range) = &exp.date_range {
                let _ = write!(out, "<span>{}</span>", escape(range));
            }
            let _ = write!(
                out,
                r#"</div><p class="entry-sub">{}</p><div class="pre-line">{}</div></div>"#,
                escape(exp.company.as_deref().unwrap_or_default()),
                escape(exp.description.as_deref().unwrap_or_default())
            );
        }
        out.push_str("</section>");
    }

    if !doc.educations.is_empty() {
        section_start(&mut out, color, EDUCATION_HEADING);
        for edu in &doc.educations {
            let _ = write!(
                out,
                r#"<div class="entry"><div class="entry-head" style="color:{}"><span>{}</span>"#,
                escape(color),
                escape(edu.degree.as_deref().unwrap_or_default())
            );
            if let Some(range) = &edu.date_range {
                let _ = write!(out, "<span>{}</span>", escape(range));
            }
            let _ = write!(
                out,
                r#"</div><p class="entry-sub">{}</p></div>"#,
                escape(edu.school.as_deref().unwrap_or_default())
            );
        }
        out.push_str("</section>");
    }

    if !doc.skills.is_empty() {
        section_start(&mut out, color, SKILLS_HEADING);
        out.push_str(r#"<div class="skills">"#);
        for skill in &doc.skills {
            let _ = write!(
                out,
                r#"<span class="badge" style="background-color:{}">{}</span>"#,
                escape(color),
                escape(skill)
            );
        }
        out.push_str("</div></section>");
    }

    out.push_str("</div></div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::render_preview;
    use crate::types::{ResumeValues, WorkExperience};

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>"a" & 'b'</script>"#),
            "&lt;script&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_sections_absent_when_empty() {
        let html = render_html(&render_preview(&ResumeValues::default(), 794.0, None));

        assert!(html.contains("zoom:1.000000"));
        assert!(!html.contains(SUMMARY_HEADING));
        assert!(!html.contains(WORK_EXPERIENCE_HEADING));
        assert!(!html.contains(EDUCATION_HEADING));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let values = ResumeValues {
            first_name: Some("<b>Ada</b>".to_string()),
            work_experiences: vec![WorkExperience {
                position: Some("Engineer".to_string()),
                start_date: Some("2020-01-01".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let html = render_html(&render_preview(&values, 794.0, Some("/api/preview/objects/x")));

        assert!(html.contains("&lt;b&gt;Ada&lt;/b&gt;"));
        assert!(!html.contains("<b>Ada"));
        assert!(html.contains("01/2020 - Present"));
        assert!(html.contains(r#"src="/api/preview/objects/x""#));
        assert!(html.contains("border-radius:10%"));
    }

    #[test]
    fn test_unmeasured_page_is_hidden() {
        let html = render_html(&render_preview(&ResumeValues::default(), 0.0, None));
        assert!(html.contains("visibility:hidden"));
    }
}
