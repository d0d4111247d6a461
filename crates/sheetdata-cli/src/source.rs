//! Sheets read from a directory of spreadsheet files.
//!
//! Every `*.csv` file is one sheet named after its file stem. Every
//! worksheet of every `*.xlsx` file is one sheet named after the
//! worksheet. Dot-prefixed files are skipped.

use std::{
    fs,
    path::{Path, PathBuf},
};

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use indexmap::IndexMap;
use log::{debug, info, trace};

use sheetdata::{SheetError, grid::Grid, source::SheetSource};

#[derive(Debug, Clone)]
enum Location {
    Csv(PathBuf),
    Worksheet { book: PathBuf, sheet: String },
}

impl Location {
    fn path(&self) -> &Path {
        match self {
            Self::Csv(path) => path,
            Self::Worksheet { book, .. } => book,
        }
    }
}

/// A [`SheetSource`] over the spreadsheet files of one directory.
#[derive(Debug)]
pub struct DirectorySource {
    root: PathBuf,
    sheets: IndexMap<String, Location>,
}

impl DirectorySource {
    /// Lists the sheets of `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Io`] if the directory cannot be listed,
    /// [`SheetError::Source`] if a workbook cannot be opened, or
    /// [`SheetError::DuplicateSheetName`] if two files define the same sheet.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SheetError> {
        let mut source = Self {
            root: root.into(),
            sheets: IndexMap::new(),
        };
        source.refresh()?;
        Ok(source)
    }

    fn insert(&mut self, name: String, location: Location) -> Result<(), SheetError> {
        if let Some(existing) = self.sheets.get(&name) {
            return Err(SheetError::DuplicateSheetName {
                name,
                first: existing.path().display().to_string(),
                second: location.path().display().to_string(),
            });
        }
        trace!(sheet = name, path = location.path().display().to_string(); "Sheet found");
        self.sheets.insert(name, location);
        Ok(())
    }
}

impl SheetSource for DirectorySource {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn grid(&self, name: &str) -> Result<Grid, SheetError> {
        let location = self
            .sheets
            .get(name)
            .ok_or_else(|| SheetError::UnknownSheet(name.to_owned()))?;

        debug!(sheet = name, path = location.path().display().to_string(); "Reading sheet");
        match location {
            Location::Csv(path) => read_csv(path),
            Location::Worksheet { book, sheet } => read_worksheet(book, sheet),
        }
    }

    fn refresh(&mut self) -> Result<(), SheetError> {
        self.sheets.clear();

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && !is_hidden(path))
            .collect();
        paths.sort();

        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match extension(&path).as_deref() {
                Some("csv") => self.insert(stem.to_owned(), Location::Csv(path.clone()))?,
                Some("xlsx") => {
                    let workbook: Xlsx<_> = open_workbook(&path).map_err(|err| {
                        SheetError::Source(format!("Failed to open `{}`: {err}", path.display()))
                    })?;
                    for sheet in workbook.sheet_names() {
                        self.insert(
                            sheet.clone(),
                            Location::Worksheet {
                                book: path.clone(),
                                sheet,
                            },
                        )?;
                    }
                }
                _ => trace!(path = path.display().to_string(); "Skipping non-sheet file"),
            }
        }

        info!(
            root = self.root.display().to_string(),
            sheets = self.sheets.len();
            "Sheet directory listed"
        );
        Ok(())
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn read_csv(path: &Path) -> Result<Grid, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| csv_error(path, err))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| csv_error(path, err))?;
        rows.push(record.iter().map(str::to_owned).collect::<Vec<_>>());
    }
    Ok(Grid::from_rows(rows))
}

fn csv_error(path: &Path, err: csv::Error) -> SheetError {
    SheetError::Source(format!("Failed to read `{}`: {err}", path.display()))
}

fn read_worksheet(book: &Path, sheet: &str) -> Result<Grid, SheetError> {
    let mut workbook: Xlsx<_> = open_workbook(book).map_err(|err| {
        SheetError::Source(format!("Failed to open `{}`: {err}", book.display()))
    })?;
    let range = workbook.worksheet_range(sheet).map_err(|err| {
        SheetError::Source(format!(
            "Failed to read worksheet `{sheet}` of `{}`: {err}",
            book.display()
        ))
    })?;
    Ok(range_to_grid(&range))
}

/// Convert a worksheet range, keeping cell coordinates absolute.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let (top, left) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));

    let leading_rows = std::iter::repeat_with(Vec::new).take(top);
    let rows = range.rows().map(|row| {
        std::iter::repeat_n(String::new(), left)
            .chain(row.iter().map(cell_text))
            .collect::<Vec<_>>()
    });
    Grid::from_rows(leading_rows.chain(rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::Error(err) => format!("#{err:?}"),
    }
}
