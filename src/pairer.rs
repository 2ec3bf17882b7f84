//! The public facade: pairs of source/target ranges over one workbook.

use crate::accessor::SheetAccessor;
use crate::accessor::SheetId;
use crate::error::PairerError;
use crate::options::PairerOptions;
use crate::range::CellRange;
use crate::registry::Insertion;
use crate::registry::PairDefinition;
use crate::registry::PairRegistry;
use crate::schema::DataPair;
use crate::schema::FileSchema;
use crate::schema::Record;
use crate::schema::SheetRecords;
use crate::schema::SCHEMA_VERSION;
use crate::spreadsheet;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::SpreadsheetError;
use crate::store;
use crate::store::FileAutosave;
use crate::store::SchemaObserver;
use glob::glob;
use glob::Pattern;
use log::debug;
use log::info;
use log::warn;
use std::path::Path;
use std::path::PathBuf;

/// Pairs source and target cell ranges of one workbook, sheet by sheet,
/// and extracts them as `(source, target)` records.
///
/// ```no_run
/// use rusty_pairer::{DataPairer, PairerOptions};
///
/// let mut pairer = DataPairer::new("books/translations.xlsx", PairerOptions::default())?;
/// pairer.add_sheet("Translations")?;
/// pairer.add_data_pair("Translations", "A", "1-3", "B", "1-3")?;
/// for sheet in pairer.get_all_data()? {
///     for record in &sheet.pairs[0] {
///         println!("{} => {}", record.source, record.target);
///     }
/// }
/// pairer.save_to_file(None)?;
/// # Ok::<(), rusty_pairer::PairerError>(())
/// ```
pub struct DataPairer {
    accessor: SheetAccessor,
    registry: PairRegistry,
    options: PairerOptions,
    autosave: bool,
    observer: Box<dyn SchemaObserver>,
    /// Result of the last extraction, dropped on every schema change
    last_data: Option<Vec<SheetRecords>>,
}

impl DataPairer {
    /// Selects a workbook. With `autoload`, restores the autosave file when
    /// present and turns autosave on.
    pub fn new(path: impl AsRef<Path>, options: PairerOptions) -> Result<DataPairer, PairerError> {
        let path = path.as_ref();
        let accessor = SheetAccessor::new(path)?;
        let autosave_file = store::autosave_path(&options.autosave_dir, path);
        let mut pairer = DataPairer {
            accessor,
            registry: PairRegistry::new(),
            autosave: false,
            observer: Box::new(FileAutosave::new(&autosave_file)),
            last_data: None,
            options,
        };
        info!("Excel file '{}' selected", path.display());

        if pairer.options.autoload {
            pairer.autosave = true;
            if autosave_file.is_file() {
                pairer.load_from_file(&autosave_file)?;
                info!("Configuration autoloaded from '{}'", autosave_file.display());
            } else {
                warn!("No autosave file found at '{}'", autosave_file.display());
            }
        }
        Ok(pairer)
    }

    /// Workbook this pairer reads from.
    pub fn workbook(&self) -> &Path {
        self.accessor.path()
    }

    pub fn options(&self) -> &PairerOptions {
        &self.options
    }

    // Sheets

    /// Adds a workbook sheet to the schema and returns its name.
    pub fn add_sheet(&mut self, sheet: impl Into<SheetId>) -> Result<String, PairerError> {
        let name = self.accessor.resolve(&sheet.into())?;
        self.registry.add_sheet(&name)?;
        info!("Sheet '{}' added to the schema", name);
        self.changed()?;
        Ok(name)
    }

    /// Removes a sheet and all its data pairs from the schema.
    pub fn remove_sheet(&mut self, sheet: impl Into<SheetId>) -> Result<(), PairerError> {
        let name = self.schema_sheet(sheet.into())?;
        self.registry.remove_sheet(&name)?;
        info!("Sheet '{}' removed from the schema", name);
        self.changed()
    }

    /// Sheets of the schema, in insertion order.
    pub fn list_sheets(&self) -> Vec<String> {
        self.registry.sheet_names()
    }

    /// Sheets of the workbook, in workbook order.
    pub fn list_file_sheets(&self) -> Result<Vec<String>, PairerError> {
        self.accessor.sheet_names()
    }

    // Data pairs

    /// Defines a data pair and returns its index within the sheet. The sheet
    /// is added to the schema first when needed. Re-adding an identical pair
    /// returns the existing index.
    pub fn add_data_pair(
        &mut self,
        sheet: impl Into<SheetId>,
        src_columns: &str,
        src_rows: &str,
        tgt_columns: &str,
        tgt_rows: &str,
    ) -> Result<usize, PairerError> {
        let pair = PairDefinition::parse(src_columns, src_rows, tgt_columns, tgt_rows)?;
        let name = self.accessor.resolve(&sheet.into())?;
        if !self.registry.contains(&name) {
            self.registry.add_sheet(&name)?;
            info!("Sheet '{}' added to the schema", name);
        }

        let description = format!("{} => {}", pair.source, pair.target);
        match self.registry.add_pair(&name, pair)? {
            Insertion::Added(index) => {
                info!("Data pair #{} ({}) added to sheet '{}'", index, description, name);
                self.changed()?;
                Ok(index)
            }
            Insertion::Existing(index) => {
                warn!("Data pair ({}) already exists in sheet '{}' at #{}", description, name, index);
                Ok(index)
            }
        }
    }

    /// Replaces the data pair at `index`.
    pub fn update_data_pair(
        &mut self,
        sheet: impl Into<SheetId>,
        index: usize,
        src_columns: &str,
        src_rows: &str,
        tgt_columns: &str,
        tgt_rows: &str,
    ) -> Result<(), PairerError> {
        let name = self.schema_sheet(sheet.into())?;
        let pair = PairDefinition::parse(src_columns, src_rows, tgt_columns, tgt_rows)?;
        self.registry.update_pair(&name, index, pair)?;
        info!("Data pair #{} of sheet '{}' updated", index, name);
        self.changed()
    }

    /// Removes the data pair at `index`; later pairs shift down by one.
    pub fn remove_data_pair(&mut self, sheet: impl Into<SheetId>, index: usize) -> Result<(), PairerError> {
        let name = self.schema_sheet(sheet.into())?;
        self.registry.remove_pair(&name, index)?;
        info!("Data pair #{} removed from sheet '{}'", index, name);
        self.changed()
    }

    /// Data pairs of a sheet with their range expressions as entered.
    pub fn list_data_pairs(&self, sheet: impl Into<SheetId>) -> Result<Vec<DataPair>, PairerError> {
        let name = self.schema_sheet(sheet.into())?;
        Ok(self.registry.pairs(&name)?.iter().map(PairDefinition::to_schema).collect())
    }

    // Extraction

    /// Records of one data pair.
    pub fn get_data(&self, sheet: impl Into<SheetId>, index: usize) -> Result<Vec<Record>, PairerError> {
        let name = self.schema_sheet(sheet.into())?;
        let pair = self.registry.pair(&name, index)?;
        let values = self.accessor.read_ranges(&SheetId::from(&name), &[&pair.source, &pair.target])?;
        Ok(records(&values[0], &values[1]))
    }

    /// Records of every data pair, grouped per sheet, in declaration order.
    /// The result is kept for saving when `save_data` is set.
    pub fn get_all_data(&mut self) -> Result<Vec<SheetRecords>, PairerError> {
        let mut data = Vec::new();
        for (sheet, pairs) in self.registry.iter() {
            let mut sheet_records = SheetRecords {
                sheet_id: sheet.to_owned(),
                pairs: Vec::with_capacity(pairs.len()),
            };
            if !pairs.is_empty() {
                let ranges: Vec<&CellRange> = pairs.iter().flat_map(|pair| [&pair.source, &pair.target]).collect();
                let values = self.accessor.read_ranges(&SheetId::from(sheet), &ranges)?;
                sheet_records.pairs = values.chunks(2).map(|chunk| records(&chunk[0], &chunk[1])).collect();
            }
            debug!("Extracted {} data pair(s) from sheet '{}'", sheet_records.pairs.len(), sheet);
            data.push(sheet_records);
        }
        self.last_data = Some(data.clone());
        Ok(data)
    }

    /// Values of a range, row-major, without touching the schema.
    pub fn preview_range(&self, sheet: impl Into<SheetId>, columns: &str, rows: &str) -> Result<Vec<CellValue>, PairerError> {
        let range = CellRange::parse(columns, rows)?;
        self.accessor.read_range(&sheet.into(), &range)
    }

    // Persistence

    /// The schema as it would be saved.
    pub fn schema(&self) -> FileSchema {
        FileSchema {
            version: SCHEMA_VERSION,
            file_path: self.accessor.path().to_string_lossy().into_owned(),
            sheets: self.registry.to_schemas(),
            data: self.options.save_data.then(|| self.last_data.clone()).flatten(),
        }
    }

    pub fn to_json(&self) -> Result<String, PairerError> {
        store::to_json(&self.schema())
    }

    /// Saves the schema to `path`, by default next to the workbook with a
    /// `.json` extension. Returns the path written.
    pub fn save_to_file(&mut self, path: Option<&Path>) -> Result<PathBuf, PairerError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| store::default_schema_path(self.accessor.path()));
        store::save(&self.schema(), &path)?;
        info!("Schema saved to '{}'", path.display());
        self.notify()?;
        Ok(path)
    }

    /// Replaces the schema with the one stored at `path`. Nothing changes
    /// unless the whole file is valid and its workbook can be opened.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), PairerError> {
        let path = path.as_ref();
        let schema = store::load(path)?;
        let registry = PairRegistry::from_schemas(&schema.sheets)?;
        let workbook = Path::new(&schema.file_path);
        if workbook != self.accessor.path() {
            self.accessor = SheetAccessor::new(workbook)?;
            info!("Excel file '{}' selected", workbook.display());
        }
        self.registry = registry;
        self.last_data = schema.data;
        info!("Schema loaded from '{}'", path.display());
        self.notify()
    }

    pub fn enable_autosave(&mut self) {
        self.autosave = true;
        info!("Autosave enabled");
    }

    pub fn disable_autosave(&mut self) {
        self.autosave = false;
        info!("Autosave disabled");
    }

    pub fn is_autosave_enabled(&self) -> bool {
        self.autosave
    }

    /// Replaces the hook run after each change while autosave is enabled.
    pub fn set_observer(&mut self, observer: Box<dyn SchemaObserver>) {
        self.observer = observer;
    }

    /// Sheet names are taken as given, positions are looked up in the workbook.
    fn schema_sheet(&self, sheet: SheetId) -> Result<String, PairerError> {
        match sheet {
            SheetId::Name(name) => Ok(name),
            SheetId::Index(_) => self.accessor.resolve(&sheet),
        }
    }

    fn changed(&mut self) -> Result<(), PairerError> {
        self.last_data = None;
        self.notify()
    }

    fn notify(&mut self) -> Result<(), PairerError> {
        if self.autosave {
            let schema = self.schema();
            self.observer.schema_changed(&schema)?;
        }
        Ok(())
    }
}

fn records(sources: &[CellValue], targets: &[CellValue]) -> Vec<Record> {
    sources
        .iter()
        .zip(targets)
        .map(|(source, target)| Record::new(source.clone(), target.clone()))
        .collect()
}

/// Picks a workbook of a directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileSelector {
    /// Position in [`list_excel_files`]
    Index(usize),
    /// File name within the directory
    Name(String),
}

/// Supported workbooks directly inside `dir`, sorted by file name.
pub fn list_excel_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, PairerError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        Err(SpreadsheetError::FileNotFound { path: dir.display().to_string() })?;
    }
    let pattern = format!("{}/*", Pattern::escape(&dir.to_string_lossy()));
    let mut files = Vec::new();
    for entry in glob(&pattern)? {
        let path = entry?;
        if path.is_file() && spreadsheet::is_supported(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// One workbook of `dir`, by position or by name.
pub fn select_excel_file(dir: impl AsRef<Path>, selector: FileSelector) -> Result<PathBuf, PairerError> {
    let dir = dir.as_ref();
    let files = list_excel_files(dir)?;
    let found = match &selector {
        FileSelector::Index(index) => files.get(*index),
        FileSelector::Name(name) => files
            .iter()
            .find(|file| file.file_name().is_some_and(|file_name| file_name == name.as_str())),
    };
    match found {
        Some(path) => Ok(path.to_owned()),
        None => {
            let wanted = match selector {
                FileSelector::Index(index) => format!("#{index}"),
                FileSelector::Name(name) => name,
            };
            Err(SpreadsheetError::FileNotFound {
                path: format!("{} ({} of {} Excel file(s))", dir.join(&wanted).display(), wanted, files.len()),
            }
            .into())
        }
    }
}
