//! Schema object definitions and the catalog rows they are built from.
//!
//! Each definition renders itself as the DDL statement written by the
//! exporter, one file per object.

use serde::{Deserialize, Serialize};

use crate::typemap::{map_type, FieldTypeDescriptor};

/// Domain row from `RDB$FIELDS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRow {
    pub name: String,
    pub field_type: FieldTypeDescriptor,
}

/// Column row from `RDB$RELATION_FIELDS` joined to its field source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub table_name: String,
    pub column_name: String,
    /// `RDB$FIELD_POSITION`.
    pub position: i32,
    pub field_type: FieldTypeDescriptor,
}

/// Procedure row from `RDB$PROCEDURES`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureRow {
    pub name: String,
    /// `RDB$PROCEDURE_SOURCE`, absent for procedures stored without source.
    pub source: Option<String>,
}

/// A user-defined domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDefinition {
    pub name: String,
    pub type_declaration: String,
}

impl DomainDefinition {
    pub fn from_row(row: &DomainRow) -> Self {
        Self {
            name: row.name.clone(),
            type_declaration: map_type(&row.field_type),
        }
    }

    /// `CREATE DOMAIN` statement for this domain.
    pub fn to_ddl(&self) -> String {
        format!("CREATE DOMAIN {} {};", self.name, self.type_declaration)
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub type_declaration: String,
    pub ordinal_position: i32,
}

impl ColumnDefinition {
    pub fn from_row(row: &ColumnRow) -> Self {
        Self {
            name: row.column_name.clone(),
            type_declaration: map_type(&row.field_type),
            ordinal_position: row.position,
        }
    }
}

/// A table with its columns in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// `CREATE TABLE` statement, one column per line, closed with `);`.
    pub fn to_ddl(&self) -> String {
        let mut sql = format!("CREATE TABLE {} (\n", self.name);
        for (i, col) in self.columns.iter().enumerate() {
            let lead = if i == 0 { "" } else { "," };
            sql.push_str(&format!(
                "{}    {} {}\n",
                lead, col.name, col.type_declaration
            ));
        }
        sql.push_str(");\n");
        sql
    }
}

/// A stored procedure with its PSQL body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDefinition {
    pub name: String,
    pub source_body: String,
}

impl ProcedureDefinition {
    /// Build a definition, or `None` when the catalog holds no source.
    pub fn from_row(row: &ProcedureRow) -> Option<Self> {
        let body = row.source.as_deref().map(str::trim).unwrap_or_default();
        if body.is_empty() {
            return None;
        }
        Some(Self {
            name: row.name.clone(),
            source_body: body.to_string(),
        })
    }

    /// `CREATE OR ALTER PROCEDURE` statement wrapping the stored body.
    pub fn to_ddl(&self) -> String {
        format!(
            "CREATE OR ALTER PROCEDURE {}\nAS\n{}\n\n",
            self.name, self.source_body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, decl: &str, pos: i32) -> ColumnDefinition {
        ColumnDefinition {
            name: name.into(),
            type_declaration: decl.into(),
            ordinal_position: pos,
        }
    }

    #[test]
    fn test_domain_ddl() {
        let row = DomainRow {
            name: "D_MONEY".into(),
            field_type: FieldTypeDescriptor::new(7, 2, 4, -2),
        };
        let domain = DomainDefinition::from_row(&row);
        assert_eq!(domain.to_ddl(), "CREATE DOMAIN D_MONEY NUMERIC(4, 2);");
    }

    #[test]
    fn test_table_ddl_layout() {
        let mut table = TableDefinition::new("CUSTOMERS");
        table.columns.push(column("ID", "INTEGER", 0));
        table.columns.push(column("NAME", "VARCHAR(50)", 1));
        assert_eq!(
            table.to_ddl(),
            "CREATE TABLE CUSTOMERS (\n    ID INTEGER\n,    NAME VARCHAR(50)\n);\n"
        );
    }

    #[test]
    fn test_procedure_ddl_trims_body() {
        let row = ProcedureRow {
            name: "P_TOUCH".into(),
            source: Some("\n  BEGIN\n    SUSPEND;\n  END  \n".into()),
        };
        let proc = ProcedureDefinition::from_row(&row).unwrap();
        assert_eq!(
            proc.to_ddl(),
            "CREATE OR ALTER PROCEDURE P_TOUCH\nAS\nBEGIN\n    SUSPEND;\n  END\n\n"
        );
    }

    #[test]
    fn test_procedure_without_source_is_skipped() {
        let empty = ProcedureRow {
            name: "P_EMPTY".into(),
            source: Some("   ".into()),
        };
        let missing = ProcedureRow {
            name: "P_NULL".into(),
            source: None,
        };
        assert!(ProcedureDefinition::from_row(&empty).is_none());
        assert!(ProcedureDefinition::from_row(&missing).is_none());
    }
}
