//! Firebird system table queries and row decoding.

use crate::core::schema::{ColumnRow, DomainRow, ProcedureRow};
use crate::typemap::FieldTypeDescriptor;

/// User domains that are not the implicit field source of any column.
pub const DOMAINS_QUERY: &str = r#"
    SELECT F.RDB$FIELD_NAME, F.RDB$FIELD_TYPE, F.RDB$FIELD_SUB_TYPE,
           F.RDB$FIELD_LENGTH, F.RDB$FIELD_SCALE
    FROM RDB$FIELDS F
    LEFT JOIN RDB$RELATION_FIELDS RF ON F.RDB$FIELD_NAME = RF.RDB$FIELD_SOURCE
    WHERE F.RDB$SYSTEM_FLAG = 0
      AND RF.RDB$FIELD_SOURCE IS NULL
    ORDER BY F.RDB$FIELD_NAME
"#;

/// Columns of user tables. The ORDER BY is required by the exporter.
pub const COLUMNS_QUERY: &str = r#"
    SELECT RF.RDB$RELATION_NAME, RF.RDB$FIELD_NAME, RF.RDB$FIELD_POSITION,
           F.RDB$FIELD_TYPE, F.RDB$FIELD_SUB_TYPE, F.RDB$FIELD_LENGTH, F.RDB$FIELD_SCALE
    FROM RDB$RELATION_FIELDS RF
    JOIN RDB$FIELDS F ON RF.RDB$FIELD_SOURCE = F.RDB$FIELD_NAME
    WHERE RF.RDB$SYSTEM_FLAG = 0
    ORDER BY RF.RDB$RELATION_NAME, RF.RDB$FIELD_POSITION
"#;

/// User procedures with their PSQL source.
pub const PROCEDURES_QUERY: &str = r#"
    SELECT RDB$PROCEDURE_NAME, RDB$PROCEDURE_SOURCE
    FROM RDB$PROCEDURES
    WHERE RDB$SYSTEM_FLAG = 0
"#;

/// Raw domain row: name, type, sub-type, length, scale.
pub type RawDomainRow = (
    Option<String>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
);

/// Raw column row: table, column, position, type, sub-type, length, scale.
pub type RawColumnRow = (
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
);

/// Raw procedure row: name, source.
pub type RawProcedureRow = (Option<String>, Option<String>);

/// Catalog names are space-padded `CHAR` columns; NULL reads as empty.
fn name(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// NULL small integers read as 0.
fn small(value: Option<i64>) -> i16 {
    value.unwrap_or(0) as i16
}

fn field_type(
    type_code: Option<i64>,
    sub_type: Option<i64>,
    length: Option<i64>,
    scale: Option<i64>,
) -> FieldTypeDescriptor {
    FieldTypeDescriptor::new(
        small(type_code),
        small(sub_type),
        length.unwrap_or(0) as i32,
        small(scale),
    )
}

pub fn domain_row(raw: RawDomainRow) -> DomainRow {
    let (field_name, type_code, sub_type, length, scale) = raw;
    DomainRow {
        name: name(field_name),
        field_type: field_type(type_code, sub_type, length, scale),
    }
}

pub fn column_row(raw: RawColumnRow) -> ColumnRow {
    let (table, column, position, type_code, sub_type, length, scale) = raw;
    ColumnRow {
        table_name: name(table),
        column_name: name(column),
        position: position.unwrap_or(0) as i32,
        field_type: field_type(type_code, sub_type, length, scale),
    }
}

pub fn procedure_row(raw: RawProcedureRow) -> ProcedureRow {
    let (proc_name, source) = raw;
    ProcedureRow {
        name: name(proc_name),
        source,
    }
}
