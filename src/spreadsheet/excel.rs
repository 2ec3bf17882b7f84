//! Package-level helpers for Office Open XML workbooks.
use crate::error::PairerError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use zip::ZipArchive;

const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// First bytes of an OLE compound file. Encrypted OOXML packages are wrapped in one.
const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Maps relationship ids to worksheet part paths.
pub(super) fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>, path: &str) -> Result<HashMap<String, String>, PairerError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::MissingPart { part: path.to_owned() })?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Resolves each `cellXfs` entry to the cell type its number format implies.
pub(super) fn resolve_number_formats(format_indexes: &[String], custom_formats: &HashMap<String, CellType>, is_1904: bool) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Relationship targets are relative to `xl/` unless absolute.
pub(super) fn to_zip_path(path: &str) -> String {
    if let Some(absolute) = path.strip_prefix('/') {
        absolute.to_owned()
    } else if path.starts_with("xl/") {
        path.to_owned()
    } else {
        format!("xl/{path}")
    }
}

/// True when the file is an OLE container rather than a zip package,
/// which is how Excel stores password protected workbooks.
/// Leaves the reader at the start of the file.
pub(super) fn is_password_protected<R: Read + Seek>(reader: &mut R) -> Result<bool, PairerError> {
    let mut signature = [0u8; 8];
    let mut filled = 0;
    while filled < signature.len() {
        match reader.read(&mut signature[filled..])? {
            0 => break,
            count => filled += count,
        }
    }
    reader.seek(SeekFrom::Start(0))?;
    Ok(filled == signature.len() && signature == OLE_SIGNATURE)
}
