pub mod refine;

use chrono::NaiveDateTime;

/// Canonical output column names. The writer collaborator consumes a table
/// with exactly these two columns.
pub const MOMENT_COLUMN: &str = "moment";
pub const CONSUMPTION_COLUMN: &str = "consumption_kwh";

/// A single untyped spreadsheet cell, as handed over by the ingestion layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// The emptiness predicate shared by every trimming operation: a cell is
    /// empty if it is a missing-value marker or whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Render the cell the way a header label would be read off it.
    pub fn label(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => format!("{}", n),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// A rectangular grid of untyped cells, addressed by position only.
/// No column identity exists until a header row is promoted.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl RawTable {
    /// Build a grid from possibly-ragged rows; short rows are padded with
    /// empty cells to the widest row.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        RawTable { rows, width }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Attach positional placeholder names so the grid can flow through the
    /// same refinement operations as a headered table.
    pub fn into_working(self) -> WorkingTable {
        let names = (0..self.width).map(|i| i.to_string()).collect();
        WorkingTable::new(names, self.rows)
    }
}

/// A table with named columns. Once header detection has run, names are
/// unique and non-empty; `new` enforces that by construction.
#[derive(Debug, Clone)]
pub struct WorkingTable {
    names: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl WorkingTable {
    pub fn new(names: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Self {
        let names = assign_unique_names(names);
        for row in &mut rows {
            row.resize(names.len(), Cell::Empty);
        }
        WorkingTable { names, rows }
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.names.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Cells of one column, top to bottom. None if the column is absent.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row][col]
    }

    /// Write a column under `name`, replacing it if it already exists or
    /// appending it otherwise. `cells` is padded/truncated to the row count.
    pub fn with_column(mut self, name: &str, mut cells: Vec<Cell>) -> Self {
        cells.resize(self.rows.len(), Cell::Empty);
        match self.column_index(name) {
            Some(idx) => {
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row[idx] = cell;
                }
            }
            None => {
                self.names.push(name.to_string());
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row.push(cell);
                }
            }
        }
        self
    }

    /// Consume the table into its parts; used by transforms that rebuild the
    /// grid wholesale.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Cell>>) {
        (self.names, self.rows)
    }
}

/// Blank labels get a positional name, duplicates a numeric suffix. Columns
/// are never dropped here; all-empty ones are the refiner's concern.
fn assign_unique_names(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for (i, label) in labels.into_iter().enumerate() {
        let trimmed = label.trim();
        let base = if trimmed.is_empty() {
            format!("column_{}", i + 1)
        } else {
            trimmed.to_string()
        };
        let mut name = base.clone();
        let mut n = 1;
        while out.contains(&name) {
            n += 1;
            name = format!("{}_{}", base, n);
        }
        out.push(name);
    }
    out
}
