//! Part lookup inside OOXML zip packages.

use crate::error::PairerError;
use crate::helpers::xml::XmlReader;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Finds a part by name, ignoring ASCII case and accepting `\` as separator.
    fn part(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, PairerError>;

    /// Opens an XML reader over a part, `None` when the part does not exist.
    fn xml_reader(&'_ mut self, name: &str) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, PairerError>;
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn part(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, PairerError> {
        let pattern = name.replace('\\', "/");
        let path = self
            .file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(file_name))
            .map(|file_name| file_name.to_owned());
        match path.map(|file_name| self.by_name(&file_name)).transpose() {
            Ok(part) => Ok(part),
            Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error)?,
        }
    }

    fn xml_reader(&'_ mut self, name: &str) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, PairerError> {
        Ok(self.part(name)?.map(|part| XmlReader::new(BufReader::new(part))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn archive() -> ZipArchive<Cursor<Vec<u8>>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("xl/Workbook.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<workbook/>").unwrap();
        let cursor = writer.finish().unwrap();
        ZipArchive::new(cursor).unwrap()
    }

    #[test]
    fn part_lookup_ignores_case_and_separator() {
        let mut zip = archive();
        let mut content = String::new();
        zip.part("xl\\workbook.xml").unwrap().unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "<workbook/>");
    }

    #[test]
    fn missing_part_is_none() {
        let mut zip = archive();
        assert!(zip.part("xl/styles.xml").unwrap().is_none());
        assert!(zip.xml_reader("xl/styles.xml").unwrap().is_none());
    }
}
