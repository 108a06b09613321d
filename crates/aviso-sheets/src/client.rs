//! Google Sheets v4 REST client implementing the [`Worksheet`] gateway.
//!
//! The spreadsheet is addressed by key when configured, otherwise resolved
//! by name through the Drive API (first match wins). All reads return
//! formatted cell values, so every cell comes back as a string.

use async_trait::async_trait;

use aviso_core::config::SheetConfig;
use aviso_core::error::{AvisoError, Result};
use aviso_core::traits::Worksheet;
use aviso_core::types::RawRow;

use crate::auth::{ServiceAccountKey, TokenProvider};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_API: &str = "https://www.googleapis.com/drive/v3/files";

/// One worksheet of one spreadsheet, backed by the Sheets v4 values API.
pub struct SheetsClient {
    client: reqwest::Client,
    tokens: TokenProvider,
    spreadsheet_id: String,
    worksheet: String,
}

impl SheetsClient {
    /// Authenticate and resolve the configured spreadsheet + worksheet.
    pub async fn open(config: &SheetConfig) -> Result<Self> {
        let key = ServiceAccountKey::from_json(&config.credentials_json)?;
        let tokens = TokenProvider::new(key)?;

        let mut sheets = Self {
            client: reqwest::Client::new(),
            tokens,
            spreadsheet_id: String::new(),
            worksheet: config.worksheet.clone(),
        };

        sheets.spreadsheet_id = match sheet_source(config)? {
            SheetSource::Key(key) => key,
            SheetSource::Name(name) => sheets.lookup_by_name(&name).await?,
        };
        sheets.verify_worksheet().await?;

        tracing::info!(
            "📊 Spreadsheet opened: {} / '{}'",
            sheets.spreadsheet_id,
            sheets.worksheet
        );
        Ok(sheets)
    }

    /// Resolve a spreadsheet id from its Drive file name.
    async fn lookup_by_name(&self, name: &str) -> Result<String> {
        let query = drive_query(name);
        let body = self
            .get(DRIVE_API, &[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "1"),
            ])
            .await?;

        body["files"][0]["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AvisoError::Sheet(format!("spreadsheet '{name}' not found in Drive")))
    }

    /// Confirm the configured worksheet tab exists.
    async fn verify_worksheet(&self) -> Result<()> {
        let url = format!("{SHEETS_API}/{}", self.spreadsheet_id);
        let body = self.get(&url, &[("fields", "sheets.properties.title")]).await?;

        if worksheet_titles(&body).iter().any(|t| t == &self.worksheet) {
            Ok(())
        } else {
            Err(AvisoError::WorksheetNotFound(self.worksheet.clone()))
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{SHEETS_API}/{}/values/{}",
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AvisoError::Http(format!("GET {url}: {e}")))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AvisoError::Http(format!("GET {url}: {e}")))?;
        if !status.is_success() {
            return Err(sheets_error(status, &body));
        }
        Ok(body)
    }
}

#[async_trait]
impl Worksheet for SheetsClient {
    fn label(&self) -> &str {
        &self.worksheet
    }

    async fn header_row(&self) -> Result<Vec<String>> {
        let range = format!("{}!1:1", quote_title(&self.worksheet));
        let body = self.get(&self.values_url(&range), &[]).await?;
        Ok(values_from(&body).into_iter().next().unwrap_or_default())
    }

    async fn all_rows(&self) -> Result<Vec<RawRow>> {
        let range = quote_title(&self.worksheet);
        let body = self.get(&self.values_url(&range), &[]).await?;

        let mut rows = values_from(&body).into_iter();
        let headers = match rows.next() {
            Some(headers) => headers,
            None => return Ok(vec![]),
        };
        Ok(map_records(&headers, rows))
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<()> {
        let range = format!("{}!{}", quote_title(&self.worksheet), a1(row, col));
        let url = self.values_url(&range);

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .put(&url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": [[value]] }))
            .send()
            .await
            .map_err(|e| AvisoError::Http(format!("PUT {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            return Err(sheets_error(status, &body));
        }

        tracing::debug!("cell {range} updated");
        Ok(())
    }
}

#[derive(Debug)]
enum SheetSource {
    Key(String),
    Name(String),
}

fn sheet_source(config: &SheetConfig) -> Result<SheetSource> {
    if !config.key.is_empty() {
        Ok(SheetSource::Key(config.key.clone()))
    } else if !config.name.is_empty() {
        Ok(SheetSource::Name(config.name.clone()))
    } else {
        Err(AvisoError::config("Debes configurar SHEET_KEY o SHEET_NAME"))
    }
}

/// Drive search term for a spreadsheet by exact name.
fn drive_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name = '{escaped}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false"
    )
}

/// Quote a worksheet title for A1 notation (embedded quotes are doubled).
fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// 1-based column number → letters (1 → A, 27 → AA).
fn column_letters(mut col: usize) -> String {
    let mut letters = String::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.insert(0, (b'A' + rem) as char);
        col = (col - 1) / 26;
    }
    letters
}

fn a1(row: usize, col: usize) -> String {
    format!("{}{row}", column_letters(col))
}

/// Rows of a values response as strings. Missing `values` means empty range.
fn values_from(body: &serde_json::Value) -> Vec<Vec<String>> {
    let Some(rows) = body["values"].as_array() else {
        return vec![];
    };
    rows.iter()
        .map(|row| {
            row.as_array()
                .map(|cells| {
                    cells
                        .iter()
                        .map(|cell| match cell {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect()
}

/// Zip data rows with the header row. Short rows pad with empty strings,
/// cells past the last header are dropped.
fn map_records(headers: &[String], rows: impl Iterator<Item = Vec<String>>) -> Vec<RawRow> {
    rows.map(|row| {
        headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect()
    })
    .collect()
}

fn worksheet_titles(body: &serde_json::Value) -> Vec<String> {
    let Some(sheets) = body["sheets"].as_array() else {
        return vec![];
    };
    sheets
        .iter()
        .filter_map(|s| s["properties"]["title"].as_str())
        .map(String::from)
        .collect()
}

fn sheets_error(status: reqwest::StatusCode, body: &serde_json::Value) -> AvisoError {
    let detail = body["error"]["message"].as_str().unwrap_or("unknown");
    AvisoError::Sheet(format!("Sheets API {status}: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(4), "D");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(52), "AZ");
        assert_eq!(column_letters(702), "ZZ");
        assert_eq!(column_letters(703), "AAA");
    }

    #[test]
    fn test_a1_cell() {
        assert_eq!(a1(2, 4), "D2");
        assert_eq!(a1(10, 1), "A10");
    }

    #[test]
    fn test_quote_title() {
        assert_eq!(quote_title("Sheet1"), "'Sheet1'");
        assert_eq!(quote_title("Turnos 2025"), "'Turnos 2025'");
        assert_eq!(quote_title("Ana's"), "'Ana''s'");
    }

    #[test]
    fn test_drive_query_escapes_quotes() {
        let q = drive_query("Recordatorios");
        assert!(q.starts_with("name = 'Recordatorios'"));
        assert!(q.contains("application/vnd.google-apps.spreadsheet"));

        let q = drive_query("Ana's list");
        assert!(q.contains(r"name = 'Ana\'s list'"));
    }

    #[test]
    fn test_values_from_body() {
        let body = json!({
            "range": "'Sheet1'!A1:D3",
            "values": [
                ["Nombre", "Cargo", "Fecha", "Enviado"],
                ["Ana", "Dev", "03/04/25"],
                ["Luis", 7, "04/04/25", "sí"]
            ]
        });
        let rows = values_from(&body);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "Nombre");
        // Non-string cells come back stringified.
        assert_eq!(rows[2][1], "7");
    }

    #[test]
    fn test_values_from_empty_range() {
        assert!(values_from(&json!({ "range": "'Sheet1'!A1:A1" })).is_empty());
    }

    #[test]
    fn test_map_records_pads_short_rows() {
        let headers: Vec<String> = ["Nombre", "Cargo", "Fecha", "Enviado"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            vec!["Ana".to_string(), "Dev".to_string()],
            vec![
                "Luis".to_string(),
                "QA".to_string(),
                "04/04/25".to_string(),
                "sí".to_string(),
                "extra".to_string(),
            ],
        ];

        let records = map_records(&headers, rows.into_iter());
        assert_eq!(records[0]["Nombre"], "Ana");
        assert_eq!(records[0]["Fecha"], "");
        assert_eq!(records[0]["Enviado"], "");
        assert_eq!(records[1]["Enviado"], "sí");
        assert_eq!(records[1].len(), 4);
    }

    #[test]
    fn test_worksheet_titles() {
        let body = json!({
            "sheets": [
                { "properties": { "title": "Sheet1" } },
                { "properties": { "title": "Archivo" } }
            ]
        });
        assert_eq!(worksheet_titles(&body), vec!["Sheet1", "Archivo"]);
        assert!(worksheet_titles(&json!({})).is_empty());
    }

    #[test]
    fn test_sheet_source_requires_key_or_name() {
        let mut config = SheetConfig::default();
        let err = sheet_source(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Debes configurar SHEET_KEY o SHEET_NAME"
        );

        config.name = "Recordatorios".into();
        assert!(matches!(sheet_source(&config), Ok(SheetSource::Name(_))));

        config.key = "1abc".into();
        assert!(matches!(sheet_source(&config), Ok(SheetSource::Key(_))));
    }

    #[test]
    fn test_sheets_error_detail() {
        let body = json!({ "error": { "message": "The caller does not have permission" } });
        let err = sheets_error(reqwest::StatusCode::FORBIDDEN, &body);
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("permission"));
    }
}
