//! Contact directory CSV import and export.
//!
//! Import is lenient per row: every bad line is reported, good lines still land.
//! Only a missing or unusable header rejects the whole file.

use thiserror::Error;

use crate::domain::contact::Contact;

const CONTACT_IMPORT_LINE_REJECTED: &str = "CONTACT_IMPORT_LINE_REJECTED";
const EXPORT_HEADER: &str = "Name,Email,Phone,Website,Groups";
const REQUIRED_COLUMNS: [Column; 3] = [Column::FirstName, Column::LastName, Column::Phone];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    FirstName,
    LastName,
    MiddleName,
    /// Combined `first [middle] last`, as written by export.
    Name,
    Email,
    Phone,
    Website,
    Groups,
}

impl Column {
    fn from_header(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .trim_matches('"')
            .trim()
            .to_lowercase()
            .chars()
            .map(|ch| if ch == ' ' || ch == '-' { '_' } else { ch })
            .collect();

        match normalized.as_str() {
            "first_name" | "firstname" => Some(Self::FirstName),
            "last_name" | "lastname" => Some(Self::LastName),
            "middle_name" | "middlename" => Some(Self::MiddleName),
            "name" | "full_name" => Some(Self::Name),
            "email" | "e_mail" | "email_address" => Some(Self::Email),
            "phone" | "phone_number" | "mobile" => Some(Self::Phone),
            "website" | "url" => Some(Self::Website),
            "groups" | "group" => Some(Self::Groups),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::MiddleName => "middle_name",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Website => "website",
            Self::Groups => "groups",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactImportError {
    #[error("the CSV file is empty")]
    Empty,
    #[error("CSV header is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
}

/// Contacts accepted from a file plus one message per rejected line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactImport {
    pub contacts: Vec<Contact>,
    pub errors: Vec<String>,
}

struct HeaderMap {
    columns: Vec<Option<Column>>,
}

impl HeaderMap {
    fn parse(cells: &[String]) -> Result<Self, ContactImportError> {
        let columns: Vec<Option<Column>> = cells
            .iter()
            .map(|cell| Column::from_header(cell))
            .collect();
        let has_name = columns.contains(&Some(Column::Name));

        let missing: Vec<&'static str> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !columns.contains(&Some(**required)))
            .filter(|required| !(has_name && **required != Column::Phone))
            .map(|required| required.name())
            .collect();

        if missing.is_empty() {
            Ok(Self { columns })
        } else {
            Err(ContactImportError::MissingColumns(missing))
        }
    }

    fn value<'a>(&self, cells: &'a [String], column: Column) -> &'a str {
        self.columns
            .iter()
            .position(|candidate| *candidate == Some(column))
            .and_then(|index| cells.get(index))
            .map(|cell| cell.trim())
            .unwrap_or("")
    }

    /// First, middle and last name, from separate columns or a combined `Name`.
    fn names(&self, cells: &[String]) -> (String, Option<String>, String) {
        let first = self.value(cells, Column::FirstName);
        let last = self.value(cells, Column::LastName);
        let middle = optional(self.value(cells, Column::MiddleName));

        if !first.is_empty() || !last.is_empty() {
            return (first.to_owned(), middle, last.to_owned());
        }

        let parts: Vec<&str> = self.value(cells, Column::Name).split_whitespace().collect();
        match parts.as_slice() {
            [] => (String::new(), None, String::new()),
            [only] => ((*only).to_owned(), None, String::new()),
            [first, middle @ .., last] => (
                (*first).to_owned(),
                optional(&middle.join(" ")),
                (*last).to_owned(),
            ),
        }
    }
}

pub fn import_contacts(input: &str) -> Result<ContactImport, ContactImportError> {
    let mut records = read_records(input).into_iter();

    let (_, header_cells) = records.next().ok_or(ContactImportError::Empty)?;
    let header = HeaderMap::parse(&header_cells)?;

    let mut import = ContactImport::default();

    for (line_number, cells) in records {
        let (first_name, middle_name, last_name) = header.names(&cells);
        let phone = header.value(&cells, Column::Phone);

        let missing: Vec<&str> = [
            (Column::FirstName, first_name.as_str()),
            (Column::LastName, last_name.as_str()),
            (Column::Phone, phone),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(column, _)| column.name())
        .collect();

        if !missing.is_empty() {
            let message = format!(
                "Line {line_number}: Missing required fields ({})",
                missing.join(", ")
            );
            tracing::warn!(
                code = CONTACT_IMPORT_LINE_REJECTED,
                line = line_number,
                "contact import line rejected"
            );
            import.errors.push(message);
            continue;
        }

        import.contacts.push(Contact {
            first_name,
            last_name,
            middle_name,
            email: optional(header.value(&cells, Column::Email)),
            phone: phone.to_owned(),
            website: optional(header.value(&cells, Column::Website)),
            groups: split_groups(header.value(&cells, Column::Groups)),
        });
    }

    tracing::info!(
        imported = import.contacts.len(),
        rejected = import.errors.len(),
        "contact import finished"
    );

    Ok(import)
}

pub fn export_contacts(contacts: &[Contact]) -> String {
    let mut output = String::from(EXPORT_HEADER);
    output.push('\n');

    for contact in contacts {
        let groups = contact
            .groups
            .iter()
            .map(|group| group.replace(';', " "))
            .collect::<Vec<_>>()
            .join(", ");

        let row = [
            contact.full_name(),
            contact.email.clone().unwrap_or_default(),
            contact.phone.clone(),
            contact.website.clone().unwrap_or_default(),
            groups,
        ]
        .iter()
        .map(|field| quote_field(field))
        .collect::<Vec<_>>()
        .join(",");

        output.push_str(&row);
        output.push('\n');
    }

    output
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

fn split_groups(cell: &str) -> Vec<String> {
    cell.split(';')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(str::to_owned)
        .collect()
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

/// Reads every CSV record in `input`, honoring double-quoted cells and `""`
/// escapes. Quoted cells may span lines; each record carries the physical
/// line it starts on. Blank lines are skipped.
fn read_records(input: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start = 1;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                cells.push(std::mem::take(&mut current));
                push_record(&mut records, start, std::mem::take(&mut cells));
                line += 1;
                start = line;
            }
            '\n' => {
                current.push(ch);
                line += 1;
            }
            _ => current.push(ch),
        }
    }

    cells.push(current);
    push_record(&mut records, start, cells);
    records
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, cells: Vec<String>) {
    let blank = matches!(cells.as_slice(), [only] if only.trim().is_empty());
    if !blank {
        records.push((line, cells));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_row_missing_required_phone() {
        let csv = "Email,First Name,Last Name,Phone\nana@example.org,Ana,Lopez,\n";

        let import = import_contacts(csv).expect("header is valid");

        assert!(import.contacts.is_empty());
        assert_eq!(import.errors.len(), 1);
        assert!(import.errors[0].contains("Line 2"));
        assert!(import.errors[0].contains("Missing required fields"));
        assert!(import.errors[0].contains("phone"));
    }

    #[test]
    fn header_normalization_is_case_and_spacing_insensitive() {
        let csv = "FIRST NAME, last-name ,Middle Name,E-Mail,phone,Groups\n\
                   Ana,Lopez,Maria,ana@example.org,+15551234567,Tutors; Drivers ;\n";

        let import = import_contacts(csv).expect("header is valid");

        assert!(import.errors.is_empty());
        assert_eq!(
            import.contacts,
            vec![Contact {
                first_name: "Ana".to_owned(),
                last_name: "Lopez".to_owned(),
                middle_name: Some("Maria".to_owned()),
                email: Some("ana@example.org".to_owned()),
                phone: "+15551234567".to_owned(),
                website: None,
                groups: vec!["Tutors".to_owned(), "Drivers".to_owned()],
            }]
        );
    }

    #[test]
    fn accumulates_errors_and_keeps_good_rows() {
        let csv = "first_name,last_name,phone\n\
                   Ana,Lopez,555\n\
                   ,Chen,556\n\
                   \n\
                   Bo,,\n\
                   Cy,Diaz,557\n";

        let import = import_contacts(csv).expect("header is valid");

        assert_eq!(import.contacts.len(), 2);
        assert_eq!(
            import.errors,
            vec![
                "Line 3: Missing required fields (first_name)".to_owned(),
                "Line 5: Missing required fields (last_name, phone)".to_owned(),
            ]
        );
    }

    #[test]
    fn quoted_cells_may_span_lines() {
        let csv = "first_name,last_name,phone,groups\n\
                   Ana,Lopez,555,\"Tutors\nDrivers\"\n\
                   Bo,,556\n";

        let import = import_contacts(csv).expect("header is valid");

        assert_eq!(import.contacts.len(), 1);
        assert_eq!(import.contacts[0].groups, vec!["Tutors\nDrivers".to_owned()]);
        assert_eq!(
            import.errors,
            vec!["Line 4: Missing required fields (last_name)".to_owned()]
        );
    }

    #[test]
    fn exported_contacts_import_back_unchanged() {
        let contacts = vec![
            Contact {
                first_name: "Ana".to_owned(),
                middle_name: Some("Maria".to_owned()),
                last_name: "Lopez".to_owned(),
                email: Some("ana@example.org".to_owned()),
                phone: "+15551234567".to_owned(),
                website: Some("https://ana.example/?a=1,b=2".to_owned()),
                groups: vec!["Tutors\n(weekday)".to_owned()],
            },
            Contact {
                first_name: "Bo".to_owned(),
                last_name: "\"Big\"Chen".to_owned(),
                phone: "555-0101".to_owned(),
                ..Contact::default()
            },
        ];

        let import = import_contacts(&export_contacts(&contacts)).expect("export header imports");

        assert!(import.errors.is_empty(), "{:?}", import.errors);
        assert_eq!(import.contacts, contacts);
    }

    #[test]
    fn missing_required_header_rejects_file() {
        let err = import_contacts("Email,First Name\nana@example.org,Ana\n").expect_err("must fail");

        assert_eq!(
            err,
            ContactImportError::MissingColumns(vec!["last_name", "phone"])
        );
    }

    #[test]
    fn empty_file_is_rejected() {
        assert_eq!(import_contacts("\n  \n"), Err(ContactImportError::Empty));
    }

    #[test]
    fn quoted_cells_may_contain_commas() {
        let csv = "first_name,last_name,phone,groups\n\"Ana, Jr.\",\"Lo\"\"pez\",555,\"A;B\"\r\n";

        let import = import_contacts(csv).expect("header is valid");

        assert_eq!(import.contacts[0].first_name, "Ana, Jr.");
        assert_eq!(import.contacts[0].last_name, "Lo\"pez");
        assert_eq!(import.contacts[0].groups, vec!["A", "B"]);
    }

    #[test]
    fn export_joins_groups_without_semicolons() {
        let contacts = vec![Contact {
            first_name: "Ana".to_owned(),
            last_name: "Lopez".to_owned(),
            phone: "+15551234567".to_owned(),
            email: Some("ana@example.org".to_owned()),
            groups: vec!["Tutors".to_owned(), "Drivers".to_owned()],
            ..Contact::default()
        }];

        let csv = export_contacts(&contacts);

        assert_eq!(
            csv,
            "Name,Email,Phone,Website,Groups\nAna Lopez,ana@example.org,+15551234567,,\"Tutors, Drivers\"\n"
        );
        assert!(!csv.contains(';'));
    }
}
