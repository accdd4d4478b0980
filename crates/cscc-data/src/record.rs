//! Dynamically typed CSV records.

use std::sync::Arc;

/// One cell after optional numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Number(f64),
    Text(String),
    Empty,
}

impl Field {
    /// Coerce a raw cell. Only `numeric` columns are tried as numbers, and a
    /// cell that does not parse as a finite number keeps its text.
    pub fn coerce(raw: &str, numeric: bool) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Field::Empty;
        }
        if numeric {
            if let Ok(v) = trimmed.parse::<f64>() {
                if v.is_finite() {
                    return Field::Number(v);
                }
            }
        }
        Field::Text(raw.to_string())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Field::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Raw textual form, used when writing records back out.
    pub fn to_raw(&self) -> String {
        match self {
            Field::Number(v) => v.to_string(),
            Field::Text(s) => s.clone(),
            Field::Empty => String::new(),
        }
    }
}

/// A parsed row. Headers are shared by every record of one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub line: u64,
    headers: Arc<[String]>,
    values: Vec<Field>,
}

impl Record {
    pub fn new(line: u64, headers: Arc<[String]>, values: Vec<Field>) -> Self {
        Self {
            line,
            headers,
            values,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn values(&self) -> &[Field] {
        &self.values
    }

    /// Field for a column; `None` when the column is unknown or the row was
    /// too short to contain it.
    pub fn get(&self, column: &str) -> Option<&Field> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.values.get(idx)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Field::as_text)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Field::as_number)
    }

    /// Exact textual comparison, the way the dataset's string columns are
    /// matched.
    pub fn text_eq(&self, column: &str, expected: &str) -> bool {
        self.text(column) == Some(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_only_numeric_columns() {
        assert_eq!(Field::coerce("2.5", true), Field::Number(2.5));
        assert_eq!(Field::coerce("2.5", false), Field::Text("2.5".to_string()));
        assert_eq!(Field::coerce("NA", true), Field::Text("NA".to_string()));
        assert_eq!(Field::coerce("  ", true), Field::Empty);
    }

    #[test]
    fn non_finite_text_stays_text() {
        assert_eq!(Field::coerce("NaN", true), Field::Text("NaN".to_string()));
        assert_eq!(Field::coerce("inf", true), Field::Text("inf".to_string()));
    }

    #[test]
    fn short_rows_miss_trailing_columns() {
        let headers: Arc<[String]> = vec!["a".to_string(), "b".to_string()].into();
        let record = Record::new(2, headers, vec![Field::Text("x".to_string())]);
        assert_eq!(record.text("a"), Some("x"));
        assert!(record.get("b").is_none());
        assert!(record.get("c").is_none());
    }
}
