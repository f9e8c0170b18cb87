use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LeadContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A Days of Service project as fetched for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ProjectRecord {
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lead_contact: Option<LeadContact>,
    #[serde(default)]
    pub volunteers_needed: Option<u32>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Optional report sections, in the order they print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    Date,
    Location,
    Description,
    LeadContact,
    VolunteersNeeded,
    Tasks,
    Materials,
    Notes,
}

impl ReportField {
    pub const ALL: [ReportField; 8] = [
        Self::Date,
        Self::Location,
        Self::Description,
        Self::LeadContact,
        Self::VolunteersNeeded,
        Self::Tasks,
        Self::Materials,
        Self::Notes,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Location => "location",
            Self::Description => "description",
            Self::LeadContact => "lead_contact",
            Self::VolunteersNeeded => "volunteers_needed",
            Self::Tasks => "tasks",
            Self::Materials => "materials",
            Self::Notes => "notes",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Location => "Location",
            Self::Description => "Description",
            Self::LeadContact => "Project Lead",
            Self::VolunteersNeeded => "Volunteers Needed",
            Self::Tasks => "Tasks",
            Self::Materials => "Materials",
            Self::Notes => "Notes",
        }
    }
}

/// Per-field inclusion flags plus PII anonymization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReportSettings {
    #[serde(default)]
    pub fields: BTreeMap<String, bool>,
    #[serde(default, rename = "anonymizePII", alias = "anonymize_pii")]
    pub anonymize_pii: bool,
}

impl ReportSettings {
    /// Fields without an explicit flag are included.
    pub fn includes(&self, field: ReportField) -> bool {
        self.fields.get(field.id()).copied().unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_fields_are_included() {
        let mut settings = ReportSettings::default();
        settings.fields.insert("notes".to_owned(), false);

        assert!(settings.includes(ReportField::Tasks));
        assert!(!settings.includes(ReportField::Notes));
    }

    #[test]
    fn settings_deserialize_from_camel_case_flag() {
        let settings: ReportSettings =
            serde_json::from_str(r#"{"fields":{"tasks":false},"anonymizePII":true}"#)
                .expect("settings should parse");

        assert!(settings.anonymize_pii);
        assert!(!settings.includes(ReportField::Tasks));
    }
}
