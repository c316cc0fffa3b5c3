//! CSV item reader with full input validation.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use grove_forest::{AttributeValue, Item, Label, LabeledItem};
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ItemDataset, LabeledDataset};

/// Default name of the label column.
pub const DEFAULT_LABEL_COLUMN: &str = "label";

/// Reads categorical items from a CSV file.
///
/// Expected CSV format:
/// - Header row required: `id,<attr1>,...,<attrN>` with an optional label column
/// - First column is the item id; ids must be non-empty and unique
/// - Attribute cells are integer category codes, label cells integer labels
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::NoAttributeColumns`] | Only id and label columns |
/// | [`IoError::DuplicateColumn`] | Two attribute columns share a name |
/// | [`IoError::MissingLabelColumn`] | Labeled read without a label column |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::InvalidCategory`] | Attribute cell is not an integer |
/// | [`IoError::InvalidLabel`] | Label cell is not an integer |
/// | [`IoError::EmptyItemId`] | Id cell is empty |
/// | [`IoError::DuplicateItemId`] | Same id appears twice |
pub struct ItemReader {
    path: PathBuf,
    label_column: String,
}

/// A parsed row before it is split into labeled or unlabeled form.
struct Row {
    item: Item,
    label: Option<Label>,
}

impl ItemReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
        }
    }

    /// Set the name of the label column.
    #[must_use]
    pub fn with_label_column(mut self, label_column: impl Into<String>) -> Self {
        self.label_column = label_column.into();
        self
    }

    /// Return the label column name.
    #[must_use]
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Read unlabeled items. A label column, if present, is ignored.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<ItemDataset, IoError> {
        let (attributes, rows) = self.read_rows(false)?;
        let items: Vec<Item> = rows.into_iter().map(|row| row.item).collect();
        info!(
            n_items = items.len(),
            n_attributes = attributes.len(),
            "item dataset loaded"
        );
        Ok(ItemDataset::new(attributes, items))
    }

    /// Read labeled items. The label column is required.
    #[instrument(skip(self), fields(path = %self.path.display(), label_column = %self.label_column))]
    pub fn read_labeled(&self) -> Result<LabeledDataset, IoError> {
        let (attributes, rows) = self.read_rows(true)?;
        let items: Vec<LabeledItem> = rows
            .into_iter()
            .filter_map(|row| row.label.map(|label| LabeledItem::new(row.item, label)))
            .collect();
        info!(
            n_items = items.len(),
            n_attributes = attributes.len(),
            "labeled dataset loaded"
        );
        Ok(LabeledDataset::new(attributes, items))
    }

    fn read_rows(&self, require_label: bool) -> Result<(Vec<String>, Vec<Row>), IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so that InconsistentRowLength fires instead of CsvParse.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let expected_cols = header.len();
        debug!(expected_cols, "read CSV header");

        // Column 0 is always the id, even if it shares the label column's name.
        let label_index = header
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, name)| *name == self.label_column)
            .map(|(i, _)| i);
        if require_label && label_index.is_none() {
            return Err(IoError::MissingLabelColumn {
                path: self.path.clone(),
                column: self.label_column.clone(),
            });
        }

        let attribute_columns: Vec<(usize, String)> = header
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(i, _)| Some(i) != label_index)
            .map(|(i, name)| (i, name.to_string()))
            .collect();
        if attribute_columns.is_empty() {
            return Err(IoError::NoAttributeColumns {
                path: self.path.clone(),
            });
        }

        let mut names = HashSet::with_capacity(attribute_columns.len());
        if let Some((_, name)) = attribute_columns
            .iter()
            .find(|(_, name)| !names.insert(name.as_str()))
        {
            return Err(IoError::DuplicateColumn {
                path: self.path.clone(),
                column: name.clone(),
            });
        }

        let mut rows = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            let item_id = record.get(0).unwrap_or("").trim().to_string();

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    item_id,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            if item_id.is_empty() {
                return Err(IoError::EmptyItemId {
                    path: self.path.clone(),
                    row_index,
                });
            }
            if let Some(&first_row) = seen.get(&item_id) {
                return Err(IoError::DuplicateItemId {
                    path: self.path.clone(),
                    item_id,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(item_id.clone(), row_index);

            let mut features = Vec::with_capacity(attribute_columns.len());
            for (col_index, name) in &attribute_columns {
                let raw = record.get(*col_index).unwrap_or("");
                let code: i32 = raw.trim().parse().map_err(|_| IoError::InvalidCategory {
                    path: self.path.clone(),
                    row_index,
                    column: name.clone(),
                    raw: raw.to_string(),
                })?;
                features.push((name.clone(), AttributeValue::new(code)));
            }

            let label = match label_index.filter(|_| require_label) {
                Some(i) => {
                    let raw = record.get(i).unwrap_or("");
                    let id: i32 = raw.trim().parse().map_err(|_| IoError::InvalidLabel {
                        path: self.path.clone(),
                        row_index,
                        raw: raw.to_string(),
                    })?;
                    Some(Label::new(id))
                }
                None => None,
            };

            rows.push(Row {
                item: Item::new(item_id, features),
                label,
            });
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let attributes = attribute_columns.into_iter().map(|(_, name)| name).collect();
        Ok((attributes, rows))
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_labeled_items() {
        let csv = "id,outlook,label,wind\nd1,1,0,1\nd2,2,1,2\nd3,3,1,1\n";
        let f = write_csv(csv);
        let ds = ItemReader::new(f.path()).read_labeled().unwrap();
        assert_eq!(ds.n_items(), 3);
        assert_eq!(ds.attributes(), &["outlook", "wind"]);
        let first = &ds.items()[0];
        assert_eq!(first.item().id(), "d1");
        assert_eq!(first.label(), Label::new(0));
        assert_eq!(first.item().value("wind"), Some(AttributeValue::new(1)));
        assert_eq!(first.item().value("label"), None);
    }

    #[test]
    fn read_ignores_label_column() {
        let csv = "id,outlook,label\nd1,1,0\nd2,2,x\n";
        let f = write_csv(csv);
        let ds = ItemReader::new(f.path()).read().unwrap();
        assert_eq!(ds.n_items(), 2);
        assert_eq!(ds.attributes(), &["outlook"]);
        assert_eq!(ds.items()[1].features().len(), 1);
    }

    #[test]
    fn read_without_label_column() {
        let csv = "id,outlook,wind\nq1,3,1\n";
        let f = write_csv(csv);
        let ds = ItemReader::new(f.path()).read().unwrap();
        assert_eq!(ds.attributes(), &["outlook", "wind"]);
    }

    #[test]
    fn custom_label_column() {
        let csv = "id,outlook,play\nd1,1,1\n";
        let f = write_csv(csv);
        let ds = ItemReader::new(f.path())
            .with_label_column("play")
            .read_labeled()
            .unwrap();
        assert_eq!(ds.items()[0].label(), Label::new(1));
        assert_eq!(ds.attributes(), &["outlook"]);
    }

    #[test]
    fn missing_label_column_error() {
        let csv = "id,outlook\nd1,1\n";
        let f = write_csv(csv);
        let err = ItemReader::new(f.path()).read_labeled().unwrap_err();
        assert!(matches!(err, IoError::MissingLabelColumn { .. }));
    }

    #[test]
    fn empty_dataset_error() {
        let f = write_csv("id,outlook,label\n");
        let err = ItemReader::new(f.path()).read_labeled().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn no_attribute_columns_error() {
        let f = write_csv("id,label\nd1,0\n");
        let err = ItemReader::new(f.path()).read_labeled().unwrap_err();
        assert!(matches!(err, IoError::NoAttributeColumns { .. }));
    }

    #[test]
    fn duplicate_column_error() {
        let f = write_csv("id,a,a,label\nd1,1,2,0\n");
        let err = ItemReader::new(f.path()).read_labeled().unwrap_err();
        match err {
            IoError::DuplicateColumn { path, column } => {
                assert_eq!(path, f.path());
                assert_eq!(column, "a");
            }
            other => panic!("expected DuplicateColumn, got {other:?}"),
        }

        let err = ItemReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::DuplicateColumn { .. }));
    }

    #[test]
    fn duplicate_item_id_error() {
        let f = write_csv("id,outlook,label\nd1,1,0\nd1,2,1\n");
        let err = ItemReader::new(f.path()).read_labeled().unwrap_err();
        assert!(matches!(
            err,
            IoError::DuplicateItemId { first_row: 0, second_row: 1, .. }
        ));
    }

    #[test]
    fn empty_item_id_error() {
        let f = write_csv("id,outlook\n,1\n");
        let err = ItemReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::EmptyItemId { row_index: 0, .. }));
    }

    #[test]
    fn inconsistent_row_length_error() {
        let f = write_csv("id,outlook,wind,label\nd1,1,1,0\nd2,2,1\n");
        let err = ItemReader::new(f.path()).read_labeled().unwrap_err();
        assert!(matches!(err, IoError::InconsistentRowLength { got: 3, .. }));
    }

    #[test]
    fn invalid_category_error() {
        let f = write_csv("id,outlook,label\nd1,sunny,0\n");
        let err = ItemReader::new(f.path()).read_labeled().unwrap_err();
        match err {
            IoError::InvalidCategory { column, raw, .. } => {
                assert_eq!(column, "outlook");
                assert_eq!(raw, "sunny");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_label_error() {
        let f = write_csv("id,outlook,label\nd1,1,yes\n");
        let err = ItemReader::new(f.path()).read_labeled().unwrap_err();
        assert!(matches!(err, IoError::InvalidLabel { .. }));
    }

    #[test]
    fn file_not_found_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = ItemReader::new(&dir.path().join("missing.csv"))
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
