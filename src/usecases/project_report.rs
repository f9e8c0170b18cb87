use crate::domain::project::{ProjectRecord, ReportField, ReportSettings};

pub const DEFAULT_LINES_PER_PAGE: usize = 50;
const MIN_LINES_PER_PAGE: usize = 5;
const WRAP_WIDTH: usize = 80;
const REDACTED: &str = "[redacted]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    pub number: usize,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    heading: &'static str,
    body: Vec<String>,
}

/// Lays out a project report: included sections only, PII masked on request,
/// paginated with a footer on every page.
pub fn render_report(
    record: &ProjectRecord,
    settings: &ReportSettings,
    lines_per_page: usize,
) -> Vec<ReportPage> {
    // one line per page is reserved for the footer
    let body_lines = lines_per_page.max(MIN_LINES_PER_PAGE) - 1;

    let title = record.title.trim();
    let mut lines = vec![title.to_owned(), "=".repeat(title.chars().count().max(1))];

    for field in ReportField::ALL {
        if !settings.includes(field) {
            continue;
        }

        let Some(section) = build_section(record, field, settings.anonymize_pii) else {
            continue;
        };

        let used = lines.len() % body_lines;
        // a heading never ends a page without its first body line
        if used != 0 && used + 3 > body_lines {
            lines.extend(std::iter::repeat(String::new()).take(body_lines - used));
        }

        if lines.len() % body_lines != 0 {
            lines.push(String::new());
        }
        lines.push(section.heading.to_owned());
        lines.extend(section.body);
    }

    paginate(lines, body_lines)
}

fn paginate(lines: Vec<String>, body_lines: usize) -> Vec<ReportPage> {
    let chunks: Vec<Vec<String>> = lines
        .chunks(body_lines)
        .map(|chunk| chunk.to_vec())
        .collect();
    let total = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, mut chunk)| {
            chunk.push(footer(index + 1, total));
            ReportPage {
                number: index + 1,
                lines: chunk,
            }
        })
        .collect()
}

fn footer(page: usize, total: usize) -> String {
    format!("Page {page} of {total}")
}

fn build_section(record: &ProjectRecord, field: ReportField, anonymize: bool) -> Option<Section> {
    let body = match field {
        ReportField::Date => text_body(record.date.as_deref()),
        ReportField::Location => text_body(record.location.as_deref()),
        ReportField::Description => text_body(record.description.as_deref()),
        ReportField::Notes => text_body(record.notes.as_deref()),
        ReportField::VolunteersNeeded => record
            .volunteers_needed
            .map(|count| vec![count.to_string()])
            .unwrap_or_default(),
        ReportField::Tasks => list_body(&record.tasks),
        ReportField::Materials => list_body(&record.materials),
        ReportField::LeadContact => record
            .lead_contact
            .as_ref()
            .map(|lead| {
                let mask = |value: &str| {
                    if anonymize {
                        REDACTED.to_owned()
                    } else {
                        value.to_owned()
                    }
                };

                let mut body = Vec::new();
                if !lead.name.trim().is_empty() {
                    body.push(format!("Name: {}", mask(lead.name.trim())));
                }
                if let Some(email) = lead.email.as_deref().filter(|v| !v.trim().is_empty()) {
                    body.push(format!("Email: {}", mask(email.trim())));
                }
                if let Some(phone) = lead.phone.as_deref().filter(|v| !v.trim().is_empty()) {
                    body.push(format!("Phone: {}", mask(phone.trim())));
                }
                body
            })
            .unwrap_or_default(),
    };

    (!body.is_empty()).then_some(Section {
        heading: field.heading(),
        body,
    })
}

fn text_body(value: Option<&str>) -> Vec<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| wrap(text, WRAP_WIDTH))
        .unwrap_or_default()
}

fn list_body(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .flat_map(|item| {
            wrap(item, WRAP_WIDTH - 2)
                .into_iter()
                .enumerate()
                .map(|(index, line)| {
                    if index == 0 {
                        format!("- {line}")
                    } else {
                        format!("  {line}")
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Greedy word wrap; words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };

            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }

    lines
}
