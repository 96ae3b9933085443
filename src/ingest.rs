use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::IngestError;

/// Expected baseline header, exact match after trimming whitespace and BOM.
pub const BASELINE_COLUMNS: [&str; 2] = ["Domain", "Agent Name"];

/// Expected availability header, compared case-insensitively.
pub const AVAILABILITY_COLUMNS: [&str; 3] = ["Domain", "Agent Name", "Last Available Date"];

/// One row of the authoritative baseline membership list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineRecord {
    pub domain: String,
    pub agent_name: String,
}

/// One row of the availability feed, timestamp still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRecord {
    pub domain: String,
    pub agent_name: String,
    pub timestamp_raw: String,
}

/// Read the whole file into memory, stripping a leading UTF-8 BOM.
///
/// The handle is fully consumed and released before any parsing starts.
fn read_csv_text(path: &Path) -> Result<String, IngestError> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(stripped) = text.strip_prefix('\u{feff}') {
        return Ok(stripped.to_owned());
    }
    Ok(text)
}

fn file_size(path: &Path) -> Result<u64, IngestError> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let metadata = fs::metadata(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(metadata.len())
}

/// Validate and parse a baseline CSV (`Domain,Agent Name`).
///
/// The header must match [`BASELINE_COLUMNS`] exactly (case-sensitive) after
/// each column name is trimmed of whitespace and BOM. Every data row must
/// carry a non-empty domain and agent name. Zero data rows is an error.
pub fn read_baseline(path: &Path) -> Result<Vec<BaselineRecord>, IngestError> {
    if file_size(path)? == 0 {
        return Err(IngestError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    let text = read_csv_text(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|_| IngestError::MalformedRow {
            path: path.to_path_buf(),
            row: 1,
        })?
        .iter()
        .map(|h| h.trim().trim_matches('\u{feff}').to_string())
        .collect();

    if headers != BASELINE_COLUMNS {
        return Err(IngestError::HeaderMismatch {
            path: path.to_path_buf(),
            expected: &BASELINE_COLUMNS,
            got: headers,
        });
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        // Header is row 1, so the first data row is row 2.
        let row_number = index + 2;
        let row = row.map_err(|_| IngestError::MalformedRow {
            path: path.to_path_buf(),
            row: row_number,
        })?;

        let domain = row.get(0).unwrap_or("").trim();
        let agent_name = row.get(1).unwrap_or("").trim();

        if domain.is_empty() || agent_name.is_empty() {
            return Err(IngestError::EmptyField {
                path: path.to_path_buf(),
                row: row_number,
            });
        }

        records.push(BaselineRecord {
            domain: domain.to_string(),
            agent_name: agent_name.to_string(),
        });
    }

    if records.is_empty() {
        return Err(IngestError::NoRecords {
            path: path.to_path_buf(),
        });
    }

    info!(
        action = "parse",
        component = "baseline_csv",
        record_count = records.len(),
        path = ?path,
        "Baseline CSV parsed"
    );
    Ok(records)
}

/// Split one line on commas, honoring double quotes.
///
/// A `"` toggles the in-quotes flag and is consumed; a `,` seen while the
/// flag is set does not terminate the field. This is deliberately not a
/// general CSV tokenizer: the availability feed leaves its date column
/// unquoted, so the caller rejoins trailing fields afterwards.
fn split_quote_aware(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Trim whitespace and any surrounding single/double quotes from a field.
fn clean_field(field: &str) -> &str {
    field.trim().trim_matches('"').trim_matches('\'')
}

fn clean_header_token(token: &str) -> String {
    token
        .trim()
        .trim_matches('\u{feff}')
        .trim_matches('"')
        .trim_matches('\'')
        .to_string()
}

/// Validate and parse an availability CSV (`Domain,Agent Name,Last Available Date`).
///
/// A zero-byte file is valid and yields no records. The header is compared
/// case-insensitively. Date values may contain literal commas (the feed does
/// not quote them), so every token past the second is rejoined with `", "`
/// to reconstitute the original value.
pub fn read_availability(path: &Path) -> Result<Vec<AvailabilityRecord>, IngestError> {
    if file_size(path)? == 0 {
        // An empty feed just means no agent has reported in.
        return Ok(Vec::new());
    }

    let text = read_csv_text(path)?;
    let mut lines = text.lines();

    let header_line = lines.next().ok_or_else(|| IngestError::EmptyFile {
        path: path.to_path_buf(),
    })?;

    let header_tokens: Vec<String> = split_quote_aware(header_line.trim())
        .iter()
        .map(|t| clean_header_token(t))
        .collect();
    let normalized: Vec<String> = header_tokens.iter().map(|t| t.to_lowercase()).collect();
    let expected: Vec<String> = AVAILABILITY_COLUMNS
        .iter()
        .map(|c| c.to_lowercase())
        .collect();

    if normalized != expected {
        return Err(IngestError::HeaderMismatch {
            path: path.to_path_buf(),
            expected: &AVAILABILITY_COLUMNS,
            got: header_tokens,
        });
    }

    let mut records = Vec::new();
    for (index, line) in lines.enumerate() {
        let row_number = index + 2;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts = split_quote_aware(line);
        if parts.len() < 3 {
            return Err(IngestError::MalformedRow {
                path: path.to_path_buf(),
                row: row_number,
            });
        }

        let domain = clean_field(&parts[0]);
        let agent_name = clean_field(&parts[1]);

        // The date column is every token from index 2 on, rejoined with a
        // literal ", ". Dates like "Jan 31, 2026 @ 12:38:00.504" were only
        // incidentally split on their internal comma.
        let timestamp_raw = parts[2..]
            .iter()
            .map(|p| clean_field(p))
            .collect::<Vec<_>>()
            .join(", ");

        if domain.is_empty() || agent_name.is_empty() {
            return Err(IngestError::EmptyField {
                path: path.to_path_buf(),
                row: row_number,
            });
        }

        records.push(AvailabilityRecord {
            domain: domain.to_string(),
            agent_name: agent_name.to_string(),
            timestamp_raw,
        });
    }

    info!(
        action = "parse",
        component = "availability_csv",
        record_count = records.len(),
        path = ?path,
        "Availability CSV parsed"
    );
    Ok(records)
}
