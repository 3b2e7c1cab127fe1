use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{BuyerDraft, BuyerType};

/// One rejected CSV row. `row` is 1-based and counts the header line, so the
/// first data row reports as row 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
}

/// An accepted row, keeping its position so later stages (persistence) can
/// still report against the source file.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedRow {
    pub row: usize,
    pub draft: BuyerDraft,
}

/// Result of parsing a buyer CSV: accepted drafts plus per-row rejections.
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub accepted: Vec<AcceptedRow>,
    pub errors: Vec<ImportRowError>,
}

impl ImportReport {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }
}

/// Parse a buyer CSV export. Rows missing any of the four required columns
/// are dropped with exactly one error each; the remaining rows become drafts
/// ready for the service layer.
pub fn parse_buyer_rows<R: Read>(reader: R) -> Result<ImportReport, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = ImportReport::default();

    for (index, record) in csv_reader.deserialize::<BuyerRow>().enumerate() {
        let row_number = index + 2;
        let row = match record {
            Ok(row) => row,
            Err(err) => {
                report.errors.push(ImportRowError {
                    row: row_number,
                    message: format!("row {row_number}: unreadable record ({err})"),
                });
                continue;
            }
        };

        match row.into_draft() {
            Ok(draft) => report.accepted.push(AcceptedRow {
                row: row_number,
                draft,
            }),
            Err(missing) => report.errors.push(ImportRowError {
                row: row_number,
                message: format!(
                    "row {row_number}: missing required column(s): {}",
                    missing.join(", ")
                ),
            }),
        }
    }

    Ok(report)
}

#[derive(Debug, Deserialize)]
struct BuyerRow {
    #[serde(
        rename = "firstName",
        alias = "first_name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    first_name: Option<String>,
    #[serde(
        rename = "lastName",
        alias = "last_name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    last_name: Option<String>,
    #[serde(rename = "email", default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(rename = "phone", default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(
        rename = "buyerType",
        alias = "buyer_type",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    buyer_type: Option<String>,
    #[serde(
        rename = "preferredAreas",
        alias = "preferred_areas",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    preferred_areas: Option<String>,
}

impl BuyerRow {
    fn into_draft(self) -> Result<BuyerDraft, Vec<&'static str>> {
        let mut missing = Vec::new();
        if self.first_name.is_none() {
            missing.push("firstName");
        }
        if self.last_name.is_none() {
            missing.push("lastName");
        }
        if self.email.is_none() {
            missing.push("email");
        }
        if self.phone.is_none() {
            missing.push("phone");
        }
        if !missing.is_empty() {
            return Err(missing);
        }

        let buyer_type = self
            .buyer_type
            .as_deref()
            .and_then(BuyerType::parse)
            .unwrap_or(BuyerType::Investor);

        let preferred_areas = self
            .preferred_areas
            .as_deref()
            .map(split_areas)
            .unwrap_or_default();

        Ok(BuyerDraft {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            buyer_type,
            preferred_areas,
        })
    }
}

/// Area cells arrive as `;`-separated labels from the spreadsheet export.
fn split_areas(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|area| !area.is_empty())
        .map(str::to_string)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
