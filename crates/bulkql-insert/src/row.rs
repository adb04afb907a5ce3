//! Row input normalization

use crate::ColumnSet;
use bulkql_core::{BulkqlError, Result, Value};
use std::collections::{BTreeMap, HashMap};

/// One value slot of a buffered row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Value(Value),
    /// Use the column's default (batch timestamp or database default)
    Default,
}

impl Cell {
    pub fn is_default(&self) -> bool {
        matches!(self, Cell::Default)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Cell::Value(value) => Some(value),
            Cell::Default => None,
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Cell::Value(value)
    }
}

/// Caller row input, positional or keyed by column name
#[derive(Debug, Clone, PartialEq)]
pub enum RowInput {
    Positional(Vec<Cell>),
    Keyed(Vec<(String, Cell)>),
}

impl RowInput {
    pub fn positional<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        RowInput::Positional(cells.into_iter().map(Into::into).collect())
    }

    pub fn keyed<I, K, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: Into<Cell>,
    {
        RowInput::Keyed(
            pairs
                .into_iter()
                .map(|(k, c)| (k.into(), c.into()))
                .collect(),
        )
    }
}

impl From<Vec<Value>> for RowInput {
    fn from(values: Vec<Value>) -> Self {
        RowInput::positional(values)
    }
}

impl From<Vec<Cell>> for RowInput {
    fn from(cells: Vec<Cell>) -> Self {
        RowInput::Positional(cells)
    }
}

impl From<Vec<(String, Value)>> for RowInput {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        RowInput::keyed(pairs)
    }
}

impl From<Vec<(&str, Value)>> for RowInput {
    fn from(pairs: Vec<(&str, Value)>) -> Self {
        RowInput::keyed(pairs)
    }
}

impl From<Vec<(String, Cell)>> for RowInput {
    fn from(pairs: Vec<(String, Cell)>) -> Self {
        RowInput::Keyed(pairs)
    }
}

impl From<BTreeMap<String, Value>> for RowInput {
    fn from(map: BTreeMap<String, Value>) -> Self {
        RowInput::keyed(map)
    }
}

impl From<HashMap<String, Value>> for RowInput {
    fn from(map: HashMap<String, Value>) -> Self {
        RowInput::keyed(map)
    }
}

/// A row aligned positionally to a `ColumnSet`
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl ColumnSet {
    /// Align caller input to this column set.
    ///
    /// Keyed input may leave columns out; they become `Cell::Default`.
    pub fn normalize(&self, input: RowInput) -> Result<Row> {
        match input {
            RowInput::Positional(cells) => {
                if cells.len() != self.len() {
                    return Err(BulkqlError::RowShape(format!(
                        "expected {} values for columns ({}), got {}",
                        self.len(),
                        self.columns().join(", "),
                        cells.len()
                    )));
                }
                Ok(Row { cells })
            }
            RowInput::Keyed(pairs) => {
                let mut slots: Vec<Option<Cell>> = vec![None; self.len()];
                for (key, cell) in pairs {
                    let index = self.position(&key).ok_or_else(|| {
                        BulkqlError::RowShape(format!(
                            "column {} is not a target column of {}",
                            key,
                            self.table()
                        ))
                    })?;
                    if slots[index].replace(cell).is_some() {
                        return Err(BulkqlError::RowShape(format!(
                            "column {} supplied more than once",
                            key
                        )));
                    }
                }
                Ok(Row {
                    cells: slots
                        .into_iter()
                        .map(|slot| slot.unwrap_or(Cell::Default))
                        .collect(),
                })
            }
        }
    }
}
