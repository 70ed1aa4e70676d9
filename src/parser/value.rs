use crate::schema::ColumnType;

/// Parse a numeric cell. Spellings of NaN in any casing are not numbers;
/// infinities (`inf`, `-Infinity`, ...) are.
pub fn parse_real(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// A cell converted for insertion
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Convert a CSV cell according to the inferred column type
    pub fn from_cell(cell: Option<&str>, col_type: ColumnType) -> Self {
        let Some(raw) = cell else {
            return SqlValue::Null;
        };

        match col_type {
            ColumnType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(SqlValue::Integer)
                .unwrap_or_else(|_| SqlValue::Text(raw.to_string())),
            ColumnType::Real => parse_real(raw)
                .map(SqlValue::Real)
                .unwrap_or_else(|| SqlValue::Text(raw.to_string())),
            ColumnType::Text => SqlValue::Text(raw.to_string()),
        }
    }

    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cell() {
        assert_eq!(SqlValue::from_cell(None, ColumnType::Integer), SqlValue::Null);
        assert_eq!(
            SqlValue::from_cell(Some("42"), ColumnType::Integer),
            SqlValue::Integer(42)
        );
        assert_eq!(
            SqlValue::from_cell(Some(" 7 "), ColumnType::Integer),
            SqlValue::Integer(7)
        );
        assert_eq!(SqlValue::from_cell(Some("2"), ColumnType::Real), SqlValue::Real(2.0));
        assert_eq!(
            SqlValue::from_cell(Some("0.5"), ColumnType::Real),
            SqlValue::Real(0.5)
        );
        assert_eq!(
            SqlValue::from_cell(Some("007"), ColumnType::Text),
            SqlValue::Text("007".into())
        );
        assert_eq!(
            SqlValue::from_cell(Some("NAN"), ColumnType::Real),
            SqlValue::Text("NAN".into())
        );
        assert_eq!(
            SqlValue::from_cell(Some("-inf"), ColumnType::Real),
            SqlValue::Real(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn test_parse_real_rejects_nan_spellings() {
        for nan in ["NAN", "Nan", "nAn", "+nan"] {
            assert_eq!(parse_real(nan), None, "{}", nan);
        }
        assert_eq!(parse_real("INF"), Some(f64::INFINITY));
        assert_eq!(parse_real(" Infinity "), Some(f64::INFINITY));
        assert_eq!(parse_real("0.5"), Some(0.5));
        assert_eq!(parse_real("fire"), None);
    }
}
