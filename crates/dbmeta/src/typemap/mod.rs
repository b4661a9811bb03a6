//! Type mapping from Firebird catalog field descriptors to SQL declarations.

use serde::{Deserialize, Serialize};

/// Field type as stored in `RDB$FIELDS` (type, sub-type, length, scale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FieldTypeDescriptor {
    /// `RDB$FIELD_TYPE`.
    pub type_code: i16,
    /// `RDB$FIELD_SUB_TYPE`.
    pub sub_type_code: i16,
    /// `RDB$FIELD_LENGTH` in bytes.
    pub length: i32,
    /// `RDB$FIELD_SCALE`, zero or negative.
    pub scale: i16,
}

impl FieldTypeDescriptor {
    pub fn new(type_code: i16, sub_type_code: i16, length: i32, scale: i16) -> Self {
        Self {
            type_code,
            sub_type_code,
            length,
            scale,
        }
    }
}

/// Closed set of catalog type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Short,
    Long,
    Float,
    Date,
    Time,
    Text,
    Int64,
    Double,
    Timestamp,
    Varying,
    CString,
    BlobId,
    Blob,
    Other(i16),
}

impl FieldType {
    /// Decode a raw `RDB$FIELD_TYPE` value.
    pub fn from_code(code: i16) -> Self {
        match code {
            7 => FieldType::Short,
            8 => FieldType::Long,
            10 => FieldType::Float,
            12 => FieldType::Date,
            13 => FieldType::Time,
            14 => FieldType::Text,
            16 => FieldType::Int64,
            27 => FieldType::Double,
            35 => FieldType::Timestamp,
            37 => FieldType::Varying,
            40 => FieldType::CString,
            45 => FieldType::BlobId,
            261 => FieldType::Blob,
            other => FieldType::Other(other),
        }
    }
}

/// Sub-type marking a SMALLINT-backed field as NUMERIC.
const NUMERIC_SUB_TYPE: i16 = 2;

/// Placeholder emitted for type codes this tool does not know.
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

/// Map a catalog field descriptor to its SQL type declaration.
///
/// Total over all inputs: unrecognized codes yield [`UNKNOWN_TYPE`].
pub fn map_type(field: &FieldTypeDescriptor) -> String {
    match FieldType::from_code(field.type_code) {
        FieldType::Short if field.sub_type_code == NUMERIC_SUB_TYPE => {
            format!("NUMERIC({}, {})", field.length, field.scale.unsigned_abs())
        }
        FieldType::Short => "SMALLINT".to_string(),
        FieldType::Long => "INTEGER".to_string(),
        FieldType::Float => "FLOAT".to_string(),
        FieldType::Date => "DATE".to_string(),
        FieldType::Time => "TIME".to_string(),
        FieldType::Text => format!("CHAR({})", field.length),
        FieldType::Int64 => "BIGINT".to_string(),
        FieldType::Double => "DOUBLE PRECISION".to_string(),
        FieldType::Timestamp => "TIMESTAMP".to_string(),
        FieldType::Varying => format!("VARCHAR({})", field.length),
        FieldType::CString => format!("CSTRING({})", field.length),
        FieldType::BlobId => "BLOB_ID".to_string(),
        FieldType::Blob => "BLOB".to_string(),
        FieldType::Other(_) => UNKNOWN_TYPE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(type_code: i16, sub_type_code: i16, length: i32, scale: i16) -> String {
        map_type(&FieldTypeDescriptor::new(type_code, sub_type_code, length, scale))
    }

    #[test]
    fn test_integer_types() {
        assert_eq!(map(7, 0, 2, 0), "SMALLINT");
        assert_eq!(map(8, 0, 4, 0), "INTEGER");
        assert_eq!(map(16, 0, 8, 0), "BIGINT");
    }

    #[test]
    fn test_numeric_uses_absolute_scale() {
        assert_eq!(map(7, 2, 4, -2), "NUMERIC(4, 2)");
        assert_eq!(map(7, 2, 9, 0), "NUMERIC(9, 0)");
        // only sub-type 2 turns a short into NUMERIC
        assert_eq!(map(7, 1, 4, -2), "SMALLINT");
    }

    #[test]
    fn test_string_types() {
        assert_eq!(map(14, 0, 10, 0), "CHAR(10)");
        assert_eq!(map(37, 0, 255, 0), "VARCHAR(255)");
        assert_eq!(map(40, 0, 32, 0), "CSTRING(32)");
    }

    #[test]
    fn test_floating_and_temporal_types() {
        assert_eq!(map(10, 0, 4, 0), "FLOAT");
        assert_eq!(map(27, 0, 8, 0), "DOUBLE PRECISION");
        assert_eq!(map(12, 0, 4, 0), "DATE");
        assert_eq!(map(13, 0, 4, 0), "TIME");
        assert_eq!(map(35, 0, 8, 0), "TIMESTAMP");
    }

    #[test]
    fn test_blob_types() {
        assert_eq!(map(45, 0, 8, 0), "BLOB_ID");
        assert_eq!(map(261, 1, 8, 0), "BLOB");
    }

    #[test]
    fn test_unknown_codes_never_fail() {
        for code in [0, 1, 9, 23, 24, 28, 29, 260, 262, i16::MIN, i16::MAX] {
            assert_eq!(map(code, 0, 0, 0), UNKNOWN_TYPE, "type code {}", code);
        }
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let field = FieldTypeDescriptor::new(7, 2, 18, -4);
        assert_eq!(map_type(&field), map_type(&field));
        assert_eq!(map_type(&field), "NUMERIC(18, 4)");
    }
}
