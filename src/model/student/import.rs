use serde::{Deserialize, Serialize};

/// One row of a bulk-import CSV: `name,rollNo,email,password,imageUrl`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roll_no: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Optional face image; when present the face service is asked for an
    /// embedding and the face factor is enabled.
    #[serde(default)]
    pub image_url: String,
}

impl ImportRow {
    /// A row missing any required field is skipped, not fatal.
    pub fn is_valid(&self) -> bool {
        !(self.name.trim().is_empty()
            || self.roll_no.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.trim().is_empty())
    }
}

/// One row of a bulk-delete CSV: only the email column is read.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRow {
    #[serde(default)]
    pub email: String,
}

/// Parse import rows from raw CSV text. Only structurally broken CSV is an
/// error; semantically bad rows are returned and filtered by the caller.
pub fn parse_import(data: &str) -> Result<Vec<ImportRow>, csv::Error> {
    csv::Reader::from_reader(data.as_bytes())
        .into_deserialize()
        .collect()
}

/// Parse delete rows from raw CSV text.
pub fn parse_delete(data: &str) -> Result<Vec<DeleteRow>, csv::Error> {
    csv::Reader::from_reader(data.as_bytes())
        .into_deserialize()
        .collect()
}

/// What happened during a bulk import.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub inserted: u64,
    /// Rows missing a required field.
    pub skipped: u64,
    /// Rows whose email already existed.
    pub duplicates: u64,
}

/// What happened during a bulk delete.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted: u64,
    pub not_found: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_rows() {
        let data = "name,rollNo,email,password,imageUrl\n\
                    Ada,CS-1,ada@campus.edu,pw1,/img/ada.png\n\
                    Ben,CS-2,ben@campus.edu,pw2,\n";
        let rows = parse_import(data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].email, "ada@campus.edu");
        assert!(rows[0].is_valid());
        assert!(rows[1].is_valid());
        assert!(rows[1].image_url.is_empty());
    }

    #[test]
    fn rows_missing_required_fields_are_invalid() {
        let data = "name,rollNo,email,password,imageUrl\n\
                    ,CS-1,ada@campus.edu,pw1,\n\
                    Ben,CS-2,,pw2,\n";
        let rows = parse_import(data).unwrap();
        assert!(rows.iter().all(|row| !row.is_valid()));
    }

    #[test]
    fn missing_columns_default_to_empty() {
        let data = "name,email\nAda,ada@campus.edu\n";
        let rows = parse_import(data).unwrap();
        assert_eq!(rows[0].name, "Ada");
        assert!(!rows[0].is_valid());
    }

    #[test]
    fn delete_rows_only_need_email() {
        let data = "email\nada@campus.edu\n\n";
        let rows = parse_delete(data).unwrap();
        assert_eq!(rows[0].email, "ada@campus.edu");
    }
}
