//! Low-level helpers shared by the workbook reader and the schema store.

pub(crate) mod fs;
pub(crate) mod xml;
pub(crate) mod zip;
