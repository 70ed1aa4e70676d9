//! Column type and nullability inference from observed CSV cells
//!
//! Per column:
//! - INTEGER when every present value is a whole-number literal
//! - REAL when every present value is numeric and at least one is fractional,
//!   or when rows exist but every value is missing
//! - TEXT otherwise, including tables without data rows
//!
//! A column is NOT NULL when at least one row exists and no value is missing.

use crate::parser::{parse_real, RawTable};
use super::types::{Column, ColumnType, TableSchema};

/// Running observations for one column
#[derive(Debug, Default, Clone)]
struct ColumnStats {
    present: usize,
    missing: usize,
    all_whole: bool,
    all_numeric: bool,
}

impl ColumnStats {
    fn new() -> Self {
        Self {
            all_whole: true,
            all_numeric: true,
            ..Default::default()
        }
    }

    fn observe(&mut self, cell: Option<&str>) {
        let Some(raw) = cell else {
            self.missing += 1;
            return;
        };

        self.present += 1;
        if !self.all_numeric {
            return;
        }

        let value = raw.trim();
        if value.parse::<i64>().is_ok() {
            return;
        }
        self.all_whole = false;
        if parse_real(value).is_none() {
            self.all_numeric = false;
        }
    }

    fn column_type(&self) -> ColumnType {
        match (self.present, self.missing) {
            (0, 0) => ColumnType::Text,
            (0, _) => ColumnType::Real,
            _ if self.all_whole => ColumnType::Integer,
            _ if self.all_numeric => ColumnType::Real,
            _ => ColumnType::Text,
        }
    }

    fn nullable(&self) -> bool {
        self.present == 0 || self.missing > 0
    }
}

/// Infer a table schema from parsed CSV data
pub fn infer_schema(name: &str, table: &RawTable) -> TableSchema {
    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, col_name)| {
            let mut stats = ColumnStats::new();
            for cell in table.column_values(idx) {
                stats.observe(cell);
            }

            if stats.nullable() {
                Column::new(col_name.as_str(), stats.column_type())
            } else {
                Column::required(col_name.as_str(), stats.column_type())
            }
        })
        .collect();

    TableSchema {
        name: name.to_string(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv;

    fn infer(csv: &str) -> TableSchema {
        infer_schema("t", &parse_csv(csv.as_bytes()).unwrap())
    }

    fn column<'a>(schema: &'a TableSchema, name: &str) -> &'a Column {
        schema.columns.iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn test_integer_not_null() {
        let schema = infer("id,generation_id\n1,1\n2,1\n3,2\n");
        assert_eq!(column(&schema, "id"), &Column::required("id", ColumnType::Integer));
    }

    #[test]
    fn test_integer_with_missing_is_nullable() {
        let schema = infer("id,evolves_from_species_id\n1,\n2,1\n3,2\n");
        assert_eq!(
            column(&schema, "evolves_from_species_id"),
            &Column::new("evolves_from_species_id", ColumnType::Integer)
        );
    }

    #[test]
    fn test_fractional_is_real() {
        let schema = infer("id,damage_factor\n1,100\n2,0.5\n");
        assert_eq!(column(&schema, "damage_factor").col_type, ColumnType::Real);
    }

    #[test]
    fn test_whole_float_literal_is_real() {
        let schema = infer("x\n1.0\n2.0\n");
        assert_eq!(schema.columns[0].col_type, ColumnType::Real);
    }

    #[test]
    fn test_exponent_is_real() {
        let schema = infer("x\n1e3\n5\n");
        assert_eq!(schema.columns[0].col_type, ColumnType::Real);
    }

    #[test]
    fn test_text() {
        let schema = infer("id,identifier\n1,bulbasaur\n2,ivysaur\n");
        assert_eq!(
            column(&schema, "identifier"),
            &Column::required("identifier", ColumnType::Text)
        );
    }

    #[test]
    fn test_mixed_numeric_and_text_is_text() {
        let schema = infer("x\n1\nabc\n2.5\n");
        assert_eq!(schema.columns[0].col_type, ColumnType::Text);
    }

    #[test]
    fn test_all_missing_is_nullable_real() {
        let schema = infer("id,conquest_order\n1,\n2,\n");
        assert_eq!(
            column(&schema, "conquest_order"),
            &Column::new("conquest_order", ColumnType::Real)
        );
    }

    #[test]
    fn test_no_rows_is_nullable_text() {
        let schema = infer("id,identifier\n");
        assert_eq!(schema.columns, vec![
            Column::new("id", ColumnType::Text),
            Column::new("identifier", ColumnType::Text),
        ]);
    }

    #[test]
    fn test_nan_spellings_are_text() {
        let schema = infer("id,name\n1,Nan\n2,INF\n3,NAN\n");
        assert_eq!(
            column(&schema, "name"),
            &Column::required("name", ColumnType::Text)
        );
    }

    #[test]
    fn test_infinities_are_real() {
        let schema = infer("x\ninf\n-Infinity\n2\n");
        assert_eq!(schema.columns[0], Column::required("x", ColumnType::Real));
    }

    #[test]
    fn test_large_integer_falls_back_to_real() {
        let schema = infer("x\n99999999999999999999\n");
        assert_eq!(schema.columns[0].col_type, ColumnType::Real);
    }

    #[test]
    fn test_negative_and_padded_integers() {
        let schema = infer("x\n-3\n 4\n+5\n");
        assert_eq!(schema.columns[0].col_type, ColumnType::Integer);
    }

    #[test]
    fn test_schema_keeps_column_order() {
        let schema = infer("b,a,c\n1,x,2.5\n");
        assert_eq!(schema.name, "t");
        assert_eq!(schema.column_names(), vec!["b", "a", "c"]);
    }
}
