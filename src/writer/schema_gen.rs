use crate::schema::TableSchema;

/// Quote an identifier for use in SQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", quote_ident(&schema.name));

    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|col| {
            let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
            format!(
                "    {} {}{}",
                quote_ident(&col.name),
                col.col_type.sql_type(),
                null_constraint
            )
        })
        .collect();

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate the parameterised INSERT statement for a table schema
pub fn generate_insert(schema: &TableSchema) -> String {
    let columns: Vec<String> = schema.columns.iter().map(|c| quote_ident(&c.name)).collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(&schema.name),
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType};

    fn type_efficacy() -> TableSchema {
        TableSchema {
            name: "type_efficacy".into(),
            columns: vec![
                Column::required("damage_type_id", ColumnType::Integer),
                Column::required("damage_factor", ColumnType::Real),
                Column::new("note", ColumnType::Text),
            ],
        }
    }

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&type_efficacy());
        assert_eq!(
            sql,
            "CREATE TABLE \"type_efficacy\" (\n    \"damage_type_id\" INTEGER NOT NULL,\n    \"damage_factor\" REAL NOT NULL,\n    \"note\" TEXT\n)"
        );
    }

    #[test]
    fn test_generate_insert() {
        let sql = generate_insert(&type_efficacy());
        assert_eq!(
            sql,
            "INSERT INTO \"type_efficacy\" (\"damage_type_id\", \"damage_factor\", \"note\") VALUES (?, ?, ?)"
        );
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("order"), "\"order\"");
        assert_eq!(quote_ident("Unnamed: 0"), "\"Unnamed: 0\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
