//! Row tables decoded from the upstream formats: ZIP archives holding a
//! spreadsheet or CSV, bare `.xlsx`/`.csv` files, and the Census API's
//! array-of-arrays JSON. Columns are addressed by name, case-insensitively.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use anyhow::{anyhow, bail, Context, Result};
use calamine::{Data, Reader, Xlsx};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Trimmed textual form; integral numbers print without a fraction so a
    /// spreadsheet FIPS of `6.0` reads as `"6"`.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<&serde_json::Value> for Cell {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Empty,
            serde_json::Value::String(s) => Cell::Text(s.clone()),
            serde_json::Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            other => Cell::Text(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let mut index = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            // First occurrence wins for duplicated headers
            index.entry(header.to_lowercase()).or_insert(i);
        }
        Table { headers, index, rows }
    }

    /// Decode raw bytes by content: a ZIP holding `xl/workbook.xml` is a
    /// workbook, any other ZIP is an archive of tables, the rest is CSV.
    pub fn from_bytes(location: &str, bytes: &[u8]) -> Result<Table> {
        let table = if !bytes.starts_with(b"PK") {
            Table::from_csv(bytes)
        } else if is_workbook(bytes) {
            Table::from_xlsx(bytes)
        } else {
            Table::from_archive(bytes)
        };
        table.with_context(|| format!("Failed to decode {}", location))
    }

    /// Extract the data table from a ZIP archive: the largest `.xlsx` entry,
    /// or failing that the largest `.csv` entry.
    pub fn from_archive(bytes: &[u8]) -> Result<Table> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes)).context("Not a readable ZIP archive")?;

        let mut spreadsheet: Option<(usize, u64)> = None;
        let mut delimited: Option<(usize, u64)> = None;

        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            let name = entry.name().to_lowercase();
            if entry.is_dir() || name.starts_with("__macosx/") {
                continue;
            }
            let candidate = if name.ends_with(".xlsx") {
                &mut spreadsheet
            } else if name.ends_with(".csv") {
                &mut delimited
            } else {
                continue;
            };
            if candidate.map_or(true, |(_, size)| entry.size() > size) {
                *candidate = Some((i, entry.size()));
            }
        }

        let (is_xlsx, i) = match (spreadsheet, delimited) {
            (Some((i, _)), _) => (true, i),
            (None, Some((i, _))) => (false, i),
            (None, None) => bail!("Archive contains no .xlsx or .csv file"),
        };

        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .with_context(|| format!("Failed to extract {}", name))?;

        let table = if is_xlsx {
            Table::from_xlsx(&data)
        } else {
            Table::from_csv(&data)
        };
        table.with_context(|| format!("Failed to parse {}", name))
    }

    /// Read the first worksheet; its first row is the header.
    pub fn from_xlsx(bytes: &[u8]) -> Result<Table> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| anyhow!("Workbook has no worksheets"))??;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .ok_or_else(|| anyhow!("Worksheet is empty"))?
            .iter()
            .map(|c| Cell::from(c).text().unwrap_or_default())
            .collect();
        let rows = rows.map(|r| r.iter().map(Cell::from).collect()).collect();

        Ok(Table::new(headers, rows))
    }

    pub fn from_csv(bytes: &[u8]) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.trim().is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok(Table::new(headers, rows))
    }

    /// Census-style JSON: an array of arrays whose first row is the header.
    pub fn from_json_rows(value: &serde_json::Value) -> Result<Table> {
        let mut rows = value
            .as_array()
            .ok_or_else(|| anyhow!("Expected a JSON array of rows"))?
            .iter();

        let headers = rows
            .next()
            .and_then(|h| h.as_array())
            .ok_or_else(|| anyhow!("Missing header row"))?
            .iter()
            .map(|h| Cell::from(h).text().unwrap_or_default())
            .collect();

        let rows = rows
            .map(|row| {
                row.as_array()
                    .map(|cells| cells.iter().map(Cell::from).collect())
                    .unwrap_or_default()
            })
            .collect();

        Ok(Table::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row {
            index: &self.index,
            cells,
        })
    }
}

fn is_workbook(bytes: &[u8]) -> bool {
    zip::ZipArchive::new(Cursor::new(bytes))
        .map(|mut archive| archive.by_name("xl/workbook.xml").is_ok())
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: &'a HashMap<String, usize>,
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.index
            .get(&column.to_lowercase())
            .and_then(|&i| self.cells.get(i))
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(Cell::text)
    }

    /// Text of the first listed column that exists and is non-empty.
    pub fn first_text(&self, columns: &[&str]) -> Option<String> {
        columns.iter().find_map(|c| self.text(c))
    }
}
