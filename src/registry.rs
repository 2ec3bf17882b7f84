//! In-memory data pair definitions, per sheet, in insertion order.

use crate::error::PairerError;
use crate::range::CellRange;
use crate::schema::DataPair;
use crate::schema::SchemaError;
use crate::schema::SheetSchema;

/// A validated source and target range of equal cell count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairDefinition {
    pub source: CellRange,
    pub target: CellRange,
}

impl PairDefinition {
    /// Parses both ranges and checks that they cover the same number of cells.
    /// The shapes themselves may differ.
    pub fn parse(src_columns: &str, src_rows: &str, tgt_columns: &str, tgt_rows: &str) -> Result<PairDefinition, PairerError> {
        let source = CellRange::parse(src_columns, src_rows)?;
        let target = CellRange::parse(tgt_columns, tgt_rows)?;
        if source.cell_count() != target.cell_count() {
            Err(SchemaError::ShapeMismatch {
                source_range: source.to_string(),
                source_cells: source.cell_count(),
                target_range: target.to_string(),
                target_cells: target.cell_count(),
            })?;
        }
        Ok(PairDefinition { source, target })
    }

    pub fn from_schema(pair: &DataPair) -> Result<PairDefinition, PairerError> {
        Self::parse(&pair.src_columns, &pair.src_rows, &pair.tgt_columns, &pair.tgt_rows)
    }

    pub fn to_schema(&self) -> DataPair {
        DataPair {
            src_columns: self.source.columns_expression.to_owned(),
            src_rows: self.source.rows_expression.to_owned(),
            tgt_columns: self.target.columns_expression.to_owned(),
            tgt_rows: self.target.rows_expression.to_owned(),
        }
    }

    /// Same cells on both sides, however the expressions were written.
    fn covers_same_cells(&self, other: &PairDefinition) -> bool {
        self.source.columns == other.source.columns
            && self.source.rows == other.source.rows
            && self.target.columns == other.target.columns
            && self.target.rows == other.target.rows
    }
}

/// Outcome of adding a pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Insertion {
    Added(usize),
    /// An identical pair was already defined at this index
    Existing(usize),
}

impl Insertion {
    pub fn index(&self) -> usize {
        match self {
            Insertion::Added(index) | Insertion::Existing(index) => *index,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SheetPairs {
    name: String,
    pairs: Vec<PairDefinition>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairRegistry {
    sheets: Vec<SheetPairs>,
}

impl PairRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from schema records, re-validating every definition.
    pub fn from_schemas(sheets: &[SheetSchema]) -> Result<PairRegistry, PairerError> {
        let mut registry = PairRegistry::new();
        for sheet in sheets {
            registry.add_sheet(&sheet.sheet_id)?;
            for pair in &sheet.pairs {
                let definition = PairDefinition::from_schema(pair)?;
                registry.add_pair(&sheet.sheet_id, definition)?;
            }
        }
        Ok(registry)
    }

    pub fn to_schemas(&self) -> Vec<SheetSchema> {
        self.sheets
            .iter()
            .map(|sheet| SheetSchema {
                sheet_id: sheet.name.to_owned(),
                pairs: sheet.pairs.iter().map(PairDefinition::to_schema).collect(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn contains(&self, sheet: &str) -> bool {
        self.sheets.iter().any(|candidate| candidate.name == sheet)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.to_owned()).collect()
    }

    /// Sheets with their pairs, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PairDefinition])> {
        self.sheets.iter().map(|sheet| (sheet.name.as_str(), sheet.pairs.as_slice()))
    }

    pub fn add_sheet(&mut self, sheet: &str) -> Result<(), SchemaError> {
        if self.contains(sheet) {
            return Err(SchemaError::DuplicateSheet { sheet: sheet.to_owned() });
        }
        self.sheets.push(SheetPairs {
            name: sheet.to_owned(),
            pairs: Vec::new(),
        });
        Ok(())
    }

    pub fn remove_sheet(&mut self, sheet: &str) -> Result<(), SchemaError> {
        let position = self.position(sheet)?;
        self.sheets.remove(position);
        Ok(())
    }

    pub fn pairs(&self, sheet: &str) -> Result<&[PairDefinition], SchemaError> {
        let position = self.position(sheet)?;
        Ok(&self.sheets[position].pairs)
    }

    pub fn pair(&self, sheet: &str, index: usize) -> Result<&PairDefinition, SchemaError> {
        let pairs = self.pairs(sheet)?;
        pairs.get(index).ok_or_else(|| SchemaError::PairNotFound {
            sheet: sheet.to_owned(),
            index,
            count: pairs.len(),
        })
    }

    /// Appends `pair`, unless an identical one is already defined.
    pub fn add_pair(&mut self, sheet: &str, pair: PairDefinition) -> Result<Insertion, SchemaError> {
        let pairs = self.pairs_mut(sheet)?;
        if let Some(index) = pairs.iter().position(|existing| existing.covers_same_cells(&pair)) {
            return Ok(Insertion::Existing(index));
        }
        pairs.push(pair);
        Ok(Insertion::Added(pairs.len() - 1))
    }

    pub fn update_pair(&mut self, sheet: &str, index: usize, pair: PairDefinition) -> Result<(), SchemaError> {
        let pairs = self.pairs_mut(sheet)?;
        let count = pairs.len();
        let slot = pairs.get_mut(index).ok_or_else(|| SchemaError::PairNotFound {
            sheet: sheet.to_owned(),
            index,
            count,
        })?;
        *slot = pair;
        Ok(())
    }

    pub fn remove_pair(&mut self, sheet: &str, index: usize) -> Result<PairDefinition, SchemaError> {
        let pairs = self.pairs_mut(sheet)?;
        if index >= pairs.len() {
            return Err(SchemaError::PairNotFound {
                sheet: sheet.to_owned(),
                index,
                count: pairs.len(),
            });
        }
        Ok(pairs.remove(index))
    }

    fn position(&self, sheet: &str) -> Result<usize, SchemaError> {
        self.sheets
            .iter()
            .position(|candidate| candidate.name == sheet)
            .ok_or_else(|| SchemaError::SheetNotInSchema { sheet: sheet.to_owned() })
    }

    fn pairs_mut(&mut self, sheet: &str) -> Result<&mut Vec<PairDefinition>, SchemaError> {
        let position = self.position(sheet)?;
        Ok(&mut self.sheets[position].pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::RangeError;

    fn pair(src_columns: &str, src_rows: &str, tgt_columns: &str, tgt_rows: &str) -> PairDefinition {
        PairDefinition::parse(src_columns, src_rows, tgt_columns, tgt_rows).unwrap()
    }

    #[test]
    fn equal_cell_counts_with_different_shapes() {
        let definition = pair("A", "1-10", "B-C", "1-5");
        assert_eq!(definition.source.shape(), (1, 10));
        assert_eq!(definition.target.shape(), (2, 5));
    }

    #[test]
    fn shape_mismatch() {
        let error = PairDefinition::parse("A", "1-10", "B", "1-5").unwrap_err();
        assert!(
            matches!(error, PairerError::SchemaError(SchemaError::ShapeMismatch { source_cells: 10, target_cells: 5, .. })),
            "{error}"
        );
    }

    #[test]
    fn invalid_ranges_propagate() {
        let error = PairDefinition::parse("C-A", "1", "A", "1").unwrap_err();
        assert!(matches!(error, PairerError::RangeError(RangeError::Inverted { .. })), "{error}");
    }

    #[test]
    fn duplicate_sheet() {
        let mut registry = PairRegistry::new();
        registry.add_sheet("Translations").unwrap();
        assert!(matches!(
            registry.add_sheet("Translations"),
            Err(SchemaError::DuplicateSheet { .. })
        ));
        assert_eq!(registry.sheet_names(), vec!["Translations"]);
    }

    #[test]
    fn pairs_keep_insertion_order() {
        let mut registry = PairRegistry::new();
        registry.add_sheet("S").unwrap();
        assert_eq!(registry.add_pair("S", pair("A", "1-3", "B", "1-3")).unwrap(), Insertion::Added(0));
        assert_eq!(registry.add_pair("S", pair("C", "1", "D", "1")).unwrap(), Insertion::Added(1));
        assert_eq!(registry.add_pair("S", pair("a", "1 - 3", "b", "1-3")).unwrap(), Insertion::Existing(0));
        assert_eq!(registry.pairs("S").unwrap().len(), 2);
        assert_eq!(registry.pair("S", 1).unwrap().source.columns_expression, "C");
    }

    #[test]
    fn update_and_remove_by_index() {
        let mut registry = PairRegistry::new();
        registry.add_sheet("S").unwrap();
        registry.add_pair("S", pair("A", "1", "B", "1")).unwrap();
        registry.add_pair("S", pair("A", "2", "B", "2")).unwrap();

        registry.update_pair("S", 0, pair("A", "5", "B", "5")).unwrap();
        assert_eq!(registry.pair("S", 0).unwrap().source.rows_expression, "5");
        assert!(matches!(
            registry.update_pair("S", 2, pair("A", "1", "B", "1")),
            Err(SchemaError::PairNotFound { index: 2, count: 2, .. })
        ));

        let removed = registry.remove_pair("S", 0).unwrap();
        assert_eq!(removed.source.rows_expression, "5");
        assert_eq!(registry.pair("S", 0).unwrap().source.rows_expression, "2");
        assert!(matches!(registry.remove_pair("S", 1), Err(SchemaError::PairNotFound { .. })));
    }

    #[test]
    fn sheets_not_in_schema() {
        let mut registry = PairRegistry::new();
        assert!(matches!(registry.pairs("S"), Err(SchemaError::SheetNotInSchema { .. })));
        assert!(matches!(registry.remove_sheet("S"), Err(SchemaError::SheetNotInSchema { .. })));
        assert!(matches!(
            registry.add_pair("S", pair("A", "1", "B", "1")),
            Err(SchemaError::SheetNotInSchema { .. })
        ));
    }

    #[test]
    fn schema_round_trip() {
        let mut registry = PairRegistry::new();
        registry.add_sheet("Translations").unwrap();
        registry.add_sheet("Notes").unwrap();
        registry.add_pair("Translations", pair("A", "1-3", "B", "1-3")).unwrap();
        registry.add_pair("Notes", pair(" a-b ", "2", "C", "3-4")).unwrap();

        let schemas = registry.to_schemas();
        assert_eq!(schemas[1].pairs[0].src_columns, " a-b ");
        assert_eq!(PairRegistry::from_schemas(&schemas).unwrap(), registry);
    }

    #[test]
    fn invalid_schema_records() {
        let record = |src_rows: &str| DataPair {
            src_columns: "A".to_owned(),
            src_rows: src_rows.to_owned(),
            tgt_columns: "B".to_owned(),
            tgt_rows: "1-3".to_owned(),
        };
        let duplicated = vec![
            SheetSchema { sheet_id: "S".to_owned(), pairs: vec![] },
            SheetSchema { sheet_id: "S".to_owned(), pairs: vec![] },
        ];
        assert!(PairRegistry::from_schemas(&duplicated).is_err());

        let mismatched = vec![SheetSchema { sheet_id: "S".to_owned(), pairs: vec![record("1-2")] }];
        assert!(PairRegistry::from_schemas(&mismatched).is_err());

        let valid = vec![SheetSchema { sheet_id: "S".to_owned(), pairs: vec![record("1-3")] }];
        assert!(PairRegistry::from_schemas(&valid).is_ok());
    }
}
