/// Local preparation of enriched LinkedIn exports
///
/// These steps turn exports carrying a raw `linkedin_json` column into the
/// processed files read by `load_csv`. Nothing here touches the network.
/// Rows already present in an existing output file are kept as they are, so
/// a step can be re-run as new rows arrive.

use crate::error::Result;
use crate::loader::csv::{read_table, write_table, TextTable};
use crate::loader::mapping::is_missing;

use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Raw LinkedIn payload column of enriched exports
pub const LINKEDIN_JSON_COLUMN: &str = "linkedin_json";

pub const EDUCATION_COLUMN: &str = "Education Institutions";

pub const COMPANIES_COLUMN: &str = "Companies";

pub const COMPANY_URL_COLUMN: &str = "company_linkedin_url";

pub const COMPANY_NAME_COLUMN: &str = "company_name";

/// Columns of the processed companies export, in file order
pub const COMPANY_EXPORT_COLUMNS: [&str; 14] = [
    COMPANY_URL_COLUMN,
    COMPANY_NAME_COLUMN,
    "website_url",
    "industry",
    "specialties",
    "employee_count",
    "city",
    "geographic_area",
    "postal_code",
    "founded",
    "tagline",
    "description",
    "logo_url",
    "full_json",
];

/// Outcome of a processing step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Rows taken over from the existing output
    pub kept: usize,
    /// Rows produced from the input
    pub added: usize,
}

/// A company page found in a profile's position history
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompanyLink {
    pub url: String,
    pub name: String,
}

/// Distinct company and school names of a profile, each sorted
pub fn extract_names(profile: &Value) -> (Vec<String>, Vec<String>) {
    let names = |section: &str, list: &str, key: &str| -> Vec<String> {
        profile
            .get(section)
            .and_then(|s| s.get(list))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.get(key)?.as_str())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    };

    (
        names("positions", "positionHistory", "companyName"),
        names("schools", "educationHistory", "schoolName"),
    )
}

/// Company pages linked from a profile's positions
///
/// Search links and anything that is not a `linkedin.com/company/` page are skipped.
pub fn company_links(profile: &Value) -> Vec<CompanyLink> {
    profile
        .get("positions")
        .and_then(|p| p.get("positionHistory"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|position| {
            let url = position.get("linkedInUrl")?.as_str()?;
            if url.contains("linkedin.com/search/")
                || url.contains("keywords=")
                || !url.contains("linkedin.com/company/")
            {
                return None;
            }
            let name = position.get("companyName").and_then(Value::as_str).unwrap_or("");
            Some(CompanyLink {
                url: url.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

/// Processed company columns flattened from a company payload
///
/// Returns every column of `COMPANY_EXPORT_COLUMNS` after the URL and name.
/// An absent or empty payload yields empty columns.
pub fn company_columns(company: Option<&Value>) -> Vec<(&'static str, String)> {
    let company = company
        .and_then(Value::as_object)
        .filter(|object| !object.is_empty());

    let Some(company) = company else {
        return vec![
            ("website_url", String::new()),
            ("industry", String::new()),
            ("specialties", "[]".to_string()),
            ("employee_count", String::new()),
            ("city", String::new()),
            ("geographic_area", String::new()),
            ("postal_code", String::new()),
            ("founded", String::new()),
            ("tagline", String::new()),
            ("description", String::new()),
            ("logo_url", String::new()),
            ("full_json", "{}".to_string()),
        ];
    };

    let text = |value: Option<&Value>| value.map(plain_text).unwrap_or_default();
    let escaped = |key: &str| {
        company
            .get(key)
            .and_then(Value::as_str)
            .map(ascii_escaped)
            .unwrap_or_default()
    };
    let headquarter = company.get("headquarter");
    let specialties = company
        .get("specialities")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    vec![
        ("website_url", text(company.get("websiteUrl"))),
        ("industry", escaped("industry")),
        ("specialties", spaced_json(&specialties)),
        ("employee_count", text(company.get("employeeCount"))),
        ("city", text(headquarter.and_then(|h| h.get("city")))),
        ("geographic_area", text(headquarter.and_then(|h| h.get("geographicArea")))),
        ("postal_code", text(headquarter.and_then(|h| h.get("postalCode")))),
        ("founded", text(company.get("foundedOn").and_then(|f| f.get("year")))),
        ("tagline", escaped("tagline")),
        ("description", escaped("description")),
        ("logo_url", text(company.get("logo"))),
        ("full_json", spaced_json(&Value::Object(company.clone()))),
    ]
}

/// Add the company and school name columns to an enriched contacts export
///
/// Output columns are the input columns with `Education Institutions` and
/// `Companies` inserted before `linkedin_json`. Rows are identified by their
/// LinkedIn URL column.
pub fn process_people(input: &Path, output: &Path) -> Result<ProcessSummary> {
    let source = read_table(input)?;

    let mut columns: Vec<String> = source
        .columns
        .iter()
        .filter(|c| ![LINKEDIN_JSON_COLUMN, EDUCATION_COLUMN, COMPANIES_COLUMN].contains(&c.as_str()))
        .cloned()
        .collect();
    columns.push(EDUCATION_COLUMN.to_string());
    columns.push(COMPANIES_COLUMN.to_string());
    if source.index_of(LINKEDIN_JSON_COLUMN).is_some() {
        columns.push(LINKEDIN_JSON_COLUMN.to_string());
    }

    let (mut table, mut seen) = existing_rows(output, &columns, profile_url_column)?;
    let mut summary = ProcessSummary {
        kept: table.rows.len(),
        added: 0,
    };

    let Some(url_column) = profile_url_column(&source.columns) else {
        tracing::warn!("{} has no LinkedIn URL column", input.display());
        write_table(output, &table)?;
        return Ok(summary);
    };

    for row in 0..source.rows.len() {
        let url = source.cell(row, &url_column).unwrap_or("").trim();
        if !url.is_empty() && !seen.insert(url.to_string()) {
            continue;
        }

        let (companies, schools) = source
            .cell(row, LINKEDIN_JSON_COLUMN)
            .and_then(|text| parse_payload(text, input, row))
            .map(|profile| extract_names(&profile))
            .unwrap_or_default();

        let processed = columns
            .iter()
            .map(|column| match column.as_str() {
                EDUCATION_COLUMN => Some(name_list(&schools)),
                COMPANIES_COLUMN => Some(name_list(&companies)),
                other => source.cell(row, other).map(str::to_string),
            })
            .collect();
        table.rows.push(processed);
        summary.added += 1;
    }

    write_table(output, &table)?;
    tracing::info!(
        "Processed {} new contact(s) into {} ({} kept)",
        summary.added,
        output.display(),
        summary.kept
    );
    Ok(summary)
}

/// Flatten the company payloads of an enriched companies export
///
/// The payload is read from `linkedin_json`, unwrapping a top-level
/// `company` object. Unreadable payloads produce a row with empty columns.
pub fn process_companies(input: &Path, output: &Path) -> Result<ProcessSummary> {
    let source = read_table(input)?;
    let columns: Vec<String> = COMPANY_EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect();

    let (mut table, mut seen) = existing_rows(output, &columns, |_| Some(COMPANY_URL_COLUMN.to_string()))?;
    let mut summary = ProcessSummary {
        kept: table.rows.len(),
        added: 0,
    };

    for row in 0..source.rows.len() {
        let url = source.cell(row, COMPANY_URL_COLUMN).unwrap_or("").trim().to_string();
        if !url.is_empty() && !seen.insert(url.clone()) {
            continue;
        }

        let payload = source
            .cell(row, LINKEDIN_JSON_COLUMN)
            .and_then(|text| parse_payload(text, input, row));
        let company = payload
            .as_ref()
            .map(|data| data.get("company").unwrap_or(data));

        let mut processed = vec![
            Some(url),
            source.cell(row, COMPANY_NAME_COLUMN).map(str::to_string),
        ];
        processed.extend(
            company_columns(company)
                .into_iter()
                .map(|(_, value)| Some(value).filter(|v| !v.is_empty())),
        );
        table.rows.push(processed);
        summary.added += 1;
    }

    write_table(output, &table)?;
    tracing::info!(
        "Processed {} new compan(ies) into {} ({} kept)",
        summary.added,
        output.display(),
        summary.kept
    );
    Ok(summary)
}

/// Write the distinct company pages referenced by a processed contacts export
///
/// Entries are unique by URL and name and sorted by name. Returns how many
/// were written.
pub fn extract_company_list(input: &Path, output: &Path) -> Result<usize> {
    let source = read_table(input)?;

    let mut links: Vec<CompanyLink> = Vec::new();
    let mut seen = HashSet::new();
    for row in 0..source.rows.len() {
        let Some(profile) = source
            .cell(row, LINKEDIN_JSON_COLUMN)
            .and_then(|text| parse_payload(text, input, row))
        else {
            continue;
        };
        for link in company_links(&profile) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }
    links.sort_by(|a, b| a.name.cmp(&b.name));

    let mut table = TextTable::new(vec![
        COMPANY_URL_COLUMN.to_string(),
        COMPANY_NAME_COLUMN.to_string(),
    ]);
    table.rows = links
        .iter()
        .map(|link| vec![Some(link.url.clone()), Some(link.name.clone()).filter(|n| !n.is_empty())])
        .collect();

    write_table(output, &table)?;
    tracing::info!("Extracted {} unique compan(ies) into {}", links.len(), output.display());
    Ok(links.len())
}

/// Rows of an existing output file, re-laid onto `columns`, and the keys they hold
fn existing_rows(
    output: &Path,
    columns: &[String],
    key_column: impl Fn(&[String]) -> Option<String>,
) -> Result<(TextTable, HashSet<String>)> {
    let mut table = TextTable::new(columns.to_vec());
    let mut seen = HashSet::new();

    if !output.exists() {
        return Ok((table, seen));
    }

    let existing = read_table(output)?;
    let key = key_column(&existing.columns);
    for row in 0..existing.rows.len() {
        if let Some(url) = key.as_deref().and_then(|k| existing.cell(row, k)) {
            let url = url.trim();
            if !url.is_empty() {
                seen.insert(url.to_string());
            }
        }
        table.rows.push(
            columns
                .iter()
                .map(|column| existing.cell(row, column).map(str::to_string))
                .collect(),
        );
    }

    tracing::debug!("Keeping {} row(s) of {}", table.rows.len(), output.display());
    Ok((table, seen))
}

/// The LinkedIn URL column of a contacts export, tolerating a byte order mark
fn profile_url_column(columns: &[String]) -> Option<String> {
    columns
        .iter()
        .find(|c| c.to_lowercase().ends_with("linkedinurl"))
        .cloned()
}

fn parse_payload(text: &str, input: &Path, row: usize) -> Option<Value> {
    let text = text.trim();
    if is_missing(text) {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Row {} of {}: unreadable linkedin_json: {}", row + 1, input.display(), e);
            None
        }
    }
}

fn name_list(names: &[String]) -> String {
    spaced_json(&Value::Array(
        names.iter().cloned().map(Value::String).collect(),
    ))
}

/// JSON with `", "` and `": "` separators, non-ASCII text kept as is
fn spaced_json(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(spaced_json).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(object) => {
            let entries: Vec<String> = object
                .iter()
                .map(|(key, value)| format!("{}: {}", Value::String(key.clone()), spaced_json(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        other => other.to_string(),
    }
}

/// Body of a JSON string literal with non-ASCII characters as `\u` escapes
fn ascii_escaped(text: &str) -> String {
    let literal = Value::String(text.to_string()).to_string();
    let body = &literal[1..literal.len() - 1];

    let mut escaped = String::with_capacity(body.len());
    for c in body.chars() {
        if c.is_ascii() {
            escaped.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    escaped
}

/// Text of a scalar cell value; null is empty
fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
