use crate::error::PairerError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContentHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::sheet::Window;
use crate::spreadsheet::FileReader;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use log::debug;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zip::read::ZipFile;
use zip::ZipArchive;

const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts");
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");
const TAG_FORMAT_INDEX: QName = QName(b"xf");
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");
const TAG_TEXT: QName = QName(b"t");
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr");
const TAG_SHEET: QName = QName(b"sheet");
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

const PART_WORKBOOK: &str = "xl/workbook.xml";
const PART_RELATIONSHIPS: &str = "xl/_rels/workbook.xml.rels";
const PART_STYLES: &str = "xl/styles.xml";
const PART_SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// An open `.xlsx` family workbook.
pub(crate) struct XlsxSpreadsheet {
    /// File name of the workbook
    pub(crate) name: String,
    zip: ZipArchive<FileReader>,
    /// Cell type per `cellXfs` style index
    number_formats: Vec<CellType>,
    /// (sheet name, part path) in workbook order
    sheets: Vec<(String, String)>,
}

impl XlsxSpreadsheet {
    pub(crate) fn open(path: &Path) -> Result<XlsxSpreadsheet, PairerError> {
        let name = path.display().to_string();
        let mut reader = BufReader::new(File::open(path)?);
        if excel::is_password_protected(&mut reader)? {
            Err(SpreadsheetError::PasswordProtected { name: name.to_owned() })?;
        }

        let mut zip = ZipArchive::new(reader).map_err(|error| SpreadsheetError::InvalidFileFormat {
            name: name.to_owned(),
            message: error.to_string(),
        })?;
        let (sheets, is_1904) = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::EmptySpreadsheet { name: name.to_owned() })?;
        }
        let number_formats = load_number_formats(&mut zip, is_1904)?;
        debug!("Opened '{}' with {} sheet(s), 1904 date system: {}", name, sheets.len(), is_1904);

        Ok(XlsxSpreadsheet {
            name,
            zip,
            number_formats,
            sheets,
        })
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Loads shared strings, all of them or only the given indexes.
    /// Returns the strings and a map from shared string index to position in them.
    fn load_shared_strings(&mut self, mut indexes: Option<HashSet<usize>>) -> Result<(Vec<String>, HashMap<usize, usize>), PairerError> {
        let mut shared_strings = Vec::<String>::new();
        let mut mappings = HashMap::<usize, usize>::new();
        if indexes.as_ref().is_some_and(HashSet::is_empty) {
            return Ok((shared_strings, mappings));
        }
        let mut reader = match self.zip.xml_reader(PART_SHARED_STRINGS)? {
            Some(reader) => reader,
            None => return Ok((shared_strings, mappings)),
        };

        let mut id = 0usize;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                if let Some(keys) = &mut indexes {
                    if keys.remove(&id) {
                        let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                        mappings.insert(id, shared_strings.len());
                        shared_strings.push(string);
                    }
                    if keys.is_empty() {
                        break;
                    }
                } else {
                    let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                    mappings.insert(id, shared_strings.len());
                    shared_strings.push(string);
                }
                id += 1;
            }
        });
        Ok((shared_strings, mappings))
    }

    /// Reads the cells of one worksheet that fall inside `window`.
    /// Shared string cells still hold their index afterwards.
    fn read_sheet(&mut self, sheet_name: &str, window: Option<Window>) -> Result<Sheet, PairerError> {
        let zip_path = self
            .sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, path)| path.to_owned())
            .ok_or_else(|| SpreadsheetError::SheetNotFound {
                file: self.name.to_owned(),
                sheet: sheet_name.to_owned(),
            })?;
        let mut sheet = Sheet::new(&self.name, sheet_name, window);
        let mut reader = self
            .zip
            .xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::MissingPart { part: zip_path.to_owned() })?;

        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(number) = event.parse_attribute_value::<usize>("r")? {
                    row_count = number.saturating_sub(1);
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
                col_count = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                value.clear();
                if sheet.after_row_upper_bound(row) {
                    break;
                } else if sheet.contains(row, col) {
                    kind = event.get_attribute_value("t")?.map(|t| {
                        match t.as_ref() {
                            "inlineStr" | "str" => CellType::InlineString,
                            "s" => CellType::SharedString,
                            "d" => CellType::IsoDateTime,
                            "b" => CellType::Boolean,
                            "e" => CellType::Error,
                            _ => CellType::Number,
                        }
                    }).unwrap_or(CellType::Number);
                    if kind == CellType::Number {
                        if let Some(style) = event.parse_attribute_value::<usize>("s")? {
                            kind = self.number_formats.get(style).copied().unwrap_or(CellType::Number);
                        }
                    }
                } else {
                    kind = CellType::default();
                }
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if kind != CellType::Empty && event.name() == TAG_CELL => {
                if !value.is_empty() {
                    sheet.push(Cell {
                        row,
                        col,
                        kind,
                        value: std::mem::take(&mut value),
                    });
                }
                kind = CellType::default();
            }
        });
        debug!("Read {} populated cell(s) from '{}' of '{}'", sheet.len(), sheet_name, self.name);
        Ok(sheet)
    }
}

/// Sheet names with their part paths, and whether the workbook uses the 1904 date system.
fn load_workbook(zip: &mut ZipArchive<FileReader>) -> Result<(Vec<(String, String)>, bool), PairerError> {
    let relationships = excel::load_relationships(zip, PART_RELATIONSHIPS)?;
    let mut reader = zip
        .xml_reader(PART_WORKBOOK)?
        .ok_or_else(|| SpreadsheetError::MissingPart { part: PART_WORKBOOK.to_owned() })?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<String>;
            let mut id = None::<String>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.unescape_value()?.into_owned());
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.unescape_value()?.into_owned());
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id) {
                    sheets.push((name, path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value == "1" || value == "true")
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Cell types indexed by style id, from the number formats in `xl/styles.xml`.
fn load_number_formats(zip: &mut ZipArchive<FileReader>, is_1904: bool) -> Result<Vec<CellType>, PairerError> {
    let mut reader = match zip.xml_reader(PART_STYLES)? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut has_custom_formats = false;
    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();

    let mut has_format_indexes = false;
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if !custom_formats_context && event.name() == TAG_CUSTOM_FORMATS => {
            has_custom_formats = true;
            custom_formats_context = true;
        }
        Event::End(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMATS => {
            custom_formats_context = false;
            if has_format_indexes {
                break;
            }
        }
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.to_string(), CellType::parse_custom_number_format(&format, is_1904));
            }
        }

        Event::Start(event) if !format_indexes_context && event.name() == TAG_FORMAT_INDEXES => {
            has_format_indexes = true;
            format_indexes_context = true;
        }
        Event::End(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEXES => {
            format_indexes_context = false;
            if has_custom_formats {
                break;
            }
        }
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            format_indexes.push(event.get_attribute_value("numFmtId")?.map(Cow::into_owned).unwrap_or_default());
        }
    });

    Ok(excel::resolve_number_formats(&format_indexes, &custom_formats, is_1904))
}

/// Collects the text up to `end_tag`, skipping phonetic runs.
/// `is_text_content` is set for `<v>`, whose text is the value itself rather than nested `<t>` runs.
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, FileReader>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, PairerError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_bytes_text(&event)?,
        Event::CData(event) if is_text => text.push_str(&String::from_utf8_lossy(&event)),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
