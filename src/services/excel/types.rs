use crate::models::TypeCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCategory {
    Text,
    Numeric,
    Date,
    Empty,
    Other,
}

impl CellCategory {
    pub fn label(self) -> &'static str {
        match self {
            CellCategory::Text => "text",
            CellCategory::Numeric => "numeric",
            CellCategory::Date => "date",
            CellCategory::Empty => "empty",
            CellCategory::Other => "other",
        }
    }
}

impl TypeCounts {
    pub fn record(&mut self, category: CellCategory) {
        match category {
            CellCategory::Text => self.text += 1,
            CellCategory::Numeric => self.numeric += 1,
            CellCategory::Date => self.date += 1,
            CellCategory::Empty => self.empty += 1,
            CellCategory::Other => self.other += 1,
        }
    }

    pub fn non_empty(&self) -> usize {
        self.text + self.numeric + self.date + self.other
    }

    /// Label of the single category all non-empty cells share, `mixed` when
    /// they disagree and `empty` when there are none.
    pub fn dominant_label(&self) -> &'static str {
        let populated: Vec<CellCategory> = [
            (CellCategory::Text, self.text),
            (CellCategory::Numeric, self.numeric),
            (CellCategory::Date, self.date),
            (CellCategory::Other, self.other),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(category, _)| category)
        .collect();

        match populated.as_slice() {
            [] => CellCategory::Empty.label(),
            [single] => single.label(),
            _ => "mixed",
        }
    }
}

/// Column dtype chosen by the data frame reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    DateTime,
    Text,
}
