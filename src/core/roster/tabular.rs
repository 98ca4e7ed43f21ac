//! Delimited Table Parsing
//!
//! Parses comma-separated text into header-keyed records. The dialect is the
//! one used by the distribution and name tables:
//!
//! - `,` separates fields, `\n` separates rows (a `\r` right before the `\n`
//!   is dropped).
//! - A double quote toggles quoted mode; inside quotes, `""` is a literal `"`.
//! - Quoted fields may span lines.
//! - The first row is always the header.
//!
//! Malformed quoting is never an error: the toggle rule is applied as-is and
//! callers validate the columns they need.

// ============================================================================
// Raw Rows
// ============================================================================

/// Split `text` into rows of raw string fields.
///
/// A trailing empty field at end of input is not emitted, and a trailing
/// newline does not produce an empty row.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut table = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut outside_quote = true;
    let mut previous: Option<char> = None;

    for character in text.chars() {
        let mut current = Some(character);
        match character {
            '"' => {
                if outside_quote && previous == Some('"') {
                    field.push('"');
                }
                outside_quote = !outside_quote;
            }
            ',' if outside_quote => {
                row.push(std::mem::take(&mut field));
                current = None;
            }
            '\n' if outside_quote => {
                if previous == Some('\r') {
                    let _ = field.pop();
                }
                row.push(std::mem::take(&mut field));
                table.push(std::mem::take(&mut row));
                current = None;
            }
            _ => field.push(character),
        }
        previous = current;
    }

    if !field.is_empty() {
        row.push(field);
    }
    // An input with no delimiters at all still yields one (possibly empty) row.
    if !row.is_empty() || table.is_empty() {
        if row.is_empty() {
            row.push(String::new());
        }
        table.push(row);
    }

    table
}

// ============================================================================
// Header-Keyed Table
// ============================================================================

/// Parsed table with a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column names from the first row of the text.
    headers: Vec<String>,
    /// Column names the caller declared but which may be absent from the text.
    implied: Vec<String>,
    /// Data rows, excluding the header.
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse `text`, consuming its first row as the header.
    ///
    /// `implied` names extra columns that are accepted even when the text does
    /// not carry them; reading them yields `None`.
    pub fn parse(text: &str, implied: &[&str]) -> Self {
        let mut rows = parse_rows(text);
        let headers = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0)
        };

        Self {
            headers,
            implied: implied.iter().map(|h| (*h).to_string()).collect(),
            rows,
        }
    }

    /// Column names present in the text.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Whether `name` was present in the header row.
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Whether `name` was present or declared as implied.
    pub fn declares(&self, name: &str) -> bool {
        self.has_column(name) || self.implied.iter().any(|h| h == name)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate data rows as header-keyed records.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().enumerate().map(move |(index, values)| Record {
            index: index + 1,
            headers: &self.headers,
            values,
        })
    }

    /// Convert every data row into a fixed-shape row type.
    pub fn rows_as<R: TableRow>(&self) -> Vec<R> {
        self.records().map(|record| R::from_record(&record)).collect()
    }
}

/// One data row viewed through the header.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    index: usize,
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> Record<'a> {
    /// One-based position among the data rows.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value of column `name`, or `None` when the column or the cell is absent.
    ///
    /// With duplicate header names the rightmost column wins.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        let column = self.headers.iter().rposition(|h| h == name)?;
        self.values.get(column).map(String::as_str)
    }
}

// ============================================================================
// Fixed-Shape Rows
// ============================================================================

/// A record type produced directly from a table row.
pub trait TableRow: Sized {
    /// Columns this row type reads; declared as implied when parsing.
    const COLUMNS: &'static [&'static str];

    /// Build the row from a record. Never fails; absent cells become `None`.
    fn from_record(record: &Record<'_>) -> Self;

    /// Parse `text` as a table of this row type.
    fn parse_all(text: &str) -> (Table, Vec<Self>) {
        let table = Table::parse(text, Self::COLUMNS);
        let rows = table.rows_as();
        (table, rows)
    }
}

/// A row of the distribution table: `EditorID,Count[,Rename]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetRow {
    /// One-based data row position.
    pub row: usize,
    pub editor_id: Option<String>,
    pub count: Option<String>,
    pub rename: Option<String>,
}

impl TableRow for TargetRow {
    const COLUMNS: &'static [&'static str] = &["EditorID", "Count", "Rename"];

    fn from_record(record: &Record<'_>) -> Self {
        Self {
            row: record.index(),
            editor_id: record.get("EditorID").map(str::to_string),
            count: record.get("Count").map(str::to_string),
            rename: record.get("Rename").map(str::to_string),
        }
    }
}

/// A row of a weighted name table: `Name,Weight`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRow {
    pub name: Option<String>,
    pub weight: Option<String>,
}

impl TableRow for NameRow {
    const COLUMNS: &'static [&'static str] = &["Name", "Weight"];

    fn from_record(record: &Record<'_>) -> Self {
        Self {
            name: record.get("Name").map(str::to_string),
            weight: record.get("Weight").map(str::to_string),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
