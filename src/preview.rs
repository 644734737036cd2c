// src/preview.rs
//! Markdown rendering of the document for the finalize step

use crate::store::StoreState;
use crate::types::resume::MAX_LEVEL;

pub fn render_markdown(state: &StoreState) -> String {
    let doc = &state.document;
    let contacts = &doc.contacts;
    let mut out = String::new();

    let name = format!("{} {}", contacts.first_name, contacts.last_name);
    let name = name.trim();
    out.push_str(&format!(
        "# {}\n",
        if name.is_empty() { "Untitled resume" } else { name }
    ));
    if !contacts.desired_job_title.is_empty() {
        out.push_str(&format!("_{}_\n", contacts.desired_job_title));
    }

    let contact_line: Vec<&str> = [
        contacts.email.as_str(),
        contacts.phone.as_str(),
        contacts.location.as_str(),
        contacts.linkedin_url.as_str(),
        contacts.github_url.as_str(),
        contacts.leetcode_url.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.trim().is_empty())
    .collect();
    if !contact_line.is_empty() {
        out.push_str(&format!("\n{}\n", contact_line.join(" | ")));
    }

    if let Some(template) = &state.template_id {
        out.push_str(&format!("\nTemplate: `{}`\n", template));
    }

    if !doc.summary.trim().is_empty() {
        out.push_str("\n## Summary\n\n");
        out.push_str(doc.summary.trim());
        out.push('\n');
    }

    if !doc.experience.is_empty() {
        out.push_str("\n## Experience\n");
        for exp in &doc.experience {
            let heading = [exp.role.as_str(), exp.title.as_str()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" @ ");
            out.push_str(&format!("\n### {}\n", heading));
            if !exp.duration.is_empty() {
                out.push_str(&format!("{}\n", exp.duration));
            }
            if !exp.technologies.is_empty() {
                out.push_str(&format!("Technologies: {}\n", exp.technologies.join(", ")));
            }
            for line in &exp.description {
                out.push_str(&format!("- {}\n", line));
            }
        }
    }

    if !doc.education.is_empty() {
        out.push_str("\n## Education\n");
        for edu in &doc.education {
            out.push_str(&format!("\n### {}\n", edu.degree));
            out.push_str(&edu.institution);
            if !edu.location.is_empty() {
                out.push_str(&format!(", {}", edu.location));
            }
            match (edu.start_year.is_empty(), edu.end_year.is_empty()) {
                (false, false) => out.push_str(&format!(" ({} – {})", edu.start_year, edu.end_year)),
                (false, true) => out.push_str(&format!(" ({})", edu.start_year)),
                (true, false) => out.push_str(&format!(" ({})", edu.end_year)),
                (true, true) => {}
            }
            out.push('\n');
            if !edu.description.is_empty() {
                out.push_str(&format!("{}\n", edu.description));
            }
        }
    }

    if !doc.skills.is_empty() {
        out.push_str("\n## Skills\n\n");
        for skill in &doc.skills {
            out.push_str(&format!("- {} {}\n", skill.name, level_bar(skill.level)));
        }
    }

    if !doc.languages.is_empty() {
        out.push_str("\n## Languages\n\n");
        for lang in &doc.languages {
            out.push_str(&format!("- {} {}\n", lang.name, level_bar(lang.level)));
        }
    }

    if !doc.certifications.is_empty() {
        out.push_str("\n## Certifications\n\n");
        for cert in &doc.certifications {
            let details = cert.normalized();
            out.push_str(&format!("- {}", details.name));
            if !details.organization.is_empty() {
                out.push_str(&format!(", {}", details.organization));
            }
            if !details.completion_date.is_empty() {
                out.push_str(&format!(" ({})", details.completion_date));
            }
            if !details.credential_url.is_empty() {
                out.push_str(&format!(" <{}>", details.credential_url));
            }
            out.push('\n');
        }
    }

    out
}

fn level_bar(level: u8) -> String {
    let filled = usize::from(level.min(MAX_LEVEL));
    format!(
        "[{}{}]",
        "#".repeat(filled),
        ".".repeat(usize::from(MAX_LEVEL) - filled)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::resume::{Certification, ExperienceEntry, LeveledItem, ResumeDocument};

    #[test]
    fn test_empty_document_renders_placeholder_title() {
        let out = render_markdown(&StoreState::default());
        assert_eq!(out, "# Untitled resume\n");
    }

    #[test]
    fn test_sections_render_in_order() {
        let mut doc = ResumeDocument::default();
        doc.contacts.first_name = "Ada".to_string();
        doc.contacts.last_name = "Lovelace".to_string();
        doc.contacts.email = "ada@example.com".to_string();
        doc.summary = "Analyst.".to_string();
        doc.experience.push(ExperienceEntry {
            title: "Analytical Engine".to_string(),
            role: "Programmer".to_string(),
            description: vec!["Wrote note G".to_string()],
            ..Default::default()
        });
        doc.skills.push(LeveledItem::new("Math", 3));
        doc.certifications.push(Certification::Name("FRS".to_string()));
        let state = StoreState {
            document: doc,
            template_id: Some("template_2".to_string()),
            ..Default::default()
        };

        let out = render_markdown(&state);

        assert!(out.starts_with("# Ada Lovelace\n"));
        assert!(out.contains("Template: `template_2`"));
        assert!(out.contains("### Programmer @ Analytical Engine"));
        assert!(out.contains("- Wrote note G"));
        assert!(out.contains("- Math [###.]"));
        assert!(out.find("## Summary") < out.find("## Experience"));
        assert!(out.contains("- FRS\n"));
    }
}
