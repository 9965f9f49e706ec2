//! Descriptions of select-list columns, table columns and object type attributes

use crate::{Connection, Result, env::Env, oci::*, typeinfo::{TypeInfo, TypeInfoKind}};
use std::sync::Arc;

/// Oracle type of a column or an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Number,
    BinaryFloat,
    BinaryDouble,
    Text,
    Long,
    Raw,
    LongRaw,
    Date,
    Timestamp,
    TimestampTZ,
    TimestampLTZ,
    IntervalYM,
    IntervalDS,
    RowID,
    CLOB,
    NCLOB,
    BLOB,
    BFile,
    Cursor,
    Object,
    Collection,
    Ref,
    Boolean,
    Unknown(u16),
}

impl ColumnType {
    /// Maps the SQL type reported by a describe of a select-list or table column.
    pub(crate) fn from_sqlt(sqlt: u16, form: CharSetForm) -> Self {
        match sqlt {
            SQLT_NUM | SQLT_VNU | SQLT_INT | SQLT_UIN | SQLT_FLT => ColumnType::Number,
            SQLT_IBFLOAT | SQLT_BFLOAT => ColumnType::BinaryFloat,
            SQLT_IBDOUBLE | SQLT_BDOUBLE => ColumnType::BinaryDouble,
            SQLT_CHR | SQLT_VCS | SQLT_STR | SQLT_AFC | SQLT_AVC | SQLT_VST => ColumnType::Text,
            SQLT_LNG | SQLT_LVC => ColumnType::Long,
            SQLT_BIN | SQLT_VBI => ColumnType::Raw,
            SQLT_LBI | SQLT_LVB => ColumnType::LongRaw,
            SQLT_DAT | SQLT_ODT | SQLT_DATE => ColumnType::Date,
            SQLT_TIMESTAMP => ColumnType::Timestamp,
            SQLT_TIMESTAMP_TZ => ColumnType::TimestampTZ,
            SQLT_TIMESTAMP_LTZ => ColumnType::TimestampLTZ,
            SQLT_INTERVAL_YM => ColumnType::IntervalYM,
            SQLT_INTERVAL_DS => ColumnType::IntervalDS,
            SQLT_RID | SQLT_RDD => ColumnType::RowID,
            SQLT_CLOB if form == CharSetForm::NChar => ColumnType::NCLOB,
            SQLT_CLOB => ColumnType::CLOB,
            SQLT_BLOB => ColumnType::BLOB,
            SQLT_BFILE | SQLT_CFILE => ColumnType::BFile,
            SQLT_RSET | SQLT_CUR => ColumnType::Cursor,
            SQLT_NTY => ColumnType::Object,
            SQLT_NCO => ColumnType::Collection,
            SQLT_REF => ColumnType::Ref,
            SQLT_BOL => ColumnType::Boolean,
            _ => ColumnType::Unknown(sqlt),
        }
    }

    /// Maps the type code of an object attribute or a collection element.
    pub(crate) fn from_typecode(code: u16, form: CharSetForm) -> Self {
        match code {
            OCI_TYPECODE_NUMBER | OCI_TYPECODE_DECIMAL | OCI_TYPECODE_INTEGER | OCI_TYPECODE_SMALLINT
            | OCI_TYPECODE_FLOAT | OCI_TYPECODE_REAL | OCI_TYPECODE_DOUBLE => ColumnType::Number,
            OCI_TYPECODE_BFLOAT => ColumnType::BinaryFloat,
            OCI_TYPECODE_BDOUBLE => ColumnType::BinaryDouble,
            OCI_TYPECODE_VARCHAR2 | OCI_TYPECODE_VARCHAR | OCI_TYPECODE_CHAR => ColumnType::Text,
            OCI_TYPECODE_RAW => ColumnType::Raw,
            OCI_TYPECODE_DATE => ColumnType::Date,
            OCI_TYPECODE_TIMESTAMP => ColumnType::Timestamp,
            OCI_TYPECODE_TIMESTAMP_TZ => ColumnType::TimestampTZ,
            OCI_TYPECODE_TIMESTAMP_LTZ => ColumnType::TimestampLTZ,
            OCI_TYPECODE_INTERVAL_YM => ColumnType::IntervalYM,
            OCI_TYPECODE_INTERVAL_DS => ColumnType::IntervalDS,
            OCI_TYPECODE_CLOB if form == CharSetForm::NChar => ColumnType::NCLOB,
            OCI_TYPECODE_CLOB => ColumnType::CLOB,
            OCI_TYPECODE_BLOB => ColumnType::BLOB,
            OCI_TYPECODE_BFILE => ColumnType::BFile,
            OCI_TYPECODE_OBJECT => ColumnType::Object,
            OCI_TYPECODE_NAMEDCOLLECTION | OCI_TYPECODE_VARRAY | OCI_TYPECODE_TABLE => ColumnType::Collection,
            OCI_TYPECODE_REF => ColumnType::Ref,
            _ => ColumnType::Unknown(code),
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            ColumnType::Number       => "NUMBER",
            ColumnType::BinaryFloat  => "BINARY_FLOAT",
            ColumnType::BinaryDouble => "BINARY_DOUBLE",
            ColumnType::Text         => "VARCHAR2",
            ColumnType::Long         => "LONG",
            ColumnType::Raw          => "RAW",
            ColumnType::LongRaw      => "LONG RAW",
            ColumnType::Date         => "DATE",
            ColumnType::Timestamp    => "TIMESTAMP",
            ColumnType::TimestampTZ  => "TIMESTAMP WITH TIME ZONE",
            ColumnType::TimestampLTZ => "TIMESTAMP WITH LOCAL TIME ZONE",
            ColumnType::IntervalYM   => "INTERVAL YEAR TO MONTH",
            ColumnType::IntervalDS   => "INTERVAL DAY TO SECOND",
            ColumnType::RowID        => "ROWID",
            ColumnType::CLOB         => "CLOB",
            ColumnType::NCLOB        => "NCLOB",
            ColumnType::BLOB         => "BLOB",
            ColumnType::BFile        => "BFILE",
            ColumnType::Cursor       => "REF CURSOR",
            ColumnType::Object       => "OBJECT",
            ColumnType::Collection   => "COLLECTION",
            ColumnType::Ref          => "REF",
            ColumnType::Boolean      => "BOOLEAN",
            ColumnType::Unknown(_)   => "UNKNOWN",
        }
    }

    /// Whether values of this type are kept in OCI descriptors.
    pub(crate) fn is_descriptor(self) -> bool {
        matches!(self,
            ColumnType::Timestamp | ColumnType::TimestampTZ | ColumnType::TimestampLTZ
            | ColumnType::IntervalYM | ColumnType::IntervalDS | ColumnType::RowID
            | ColumnType::CLOB | ColumnType::NCLOB | ColumnType::BLOB | ColumnType::BFile
        )
    }
}

/// Where a described column comes from. Object attributes and collection elements
/// report type codes instead of SQL types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnSource {
    SelectList,
    Table,
    Attribute,
}

/**
    Description of a select-list column, a table or view column, or an object attribute.

    # Example

    ```no_run
    use oracall::{ColumnType, TypeInfoKind};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    let info = conn.describe_type("hr.employees", TypeInfoKind::Table)?;
    let col = info.column(0)?;
    assert_eq!(col.name(), "EMPLOYEE_ID");
    assert_eq!(col.column_type(), ColumnType::Number);
    assert_eq!(col.precision(), 6);
    assert!(!col.is_nullable());
    # Ok::<(),oracall::Error>(())
    ```
*/
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    sql_type: u16,
    column_type: ColumnType,
    type_name: String,
    schema_name: String,
    size: u32,
    precision: i16,
    scale: i8,
    nullable: bool,
    charset_form: CharSetForm,
    char_used: bool,
    char_size: u16,
    properties: u64,
    typeinfo: Option<Arc<TypeInfo>>,
}

impl Column {
    pub(crate) fn describe(param: &Param, source: ColumnSource, conn: &Connection) -> Result<Self> {
        let err = conn.err_ptr();
        let name : String = param.get_attr(OCI_ATTR_NAME, err)?;
        let form : u8 = param.get_attr(OCI_ATTR_CHARSET_FORM, err).unwrap_or(SQLCS_IMPLICIT);
        let charset_form = CharSetForm::from(form);

        let (sql_type, column_type, precision) = if source == ColumnSource::Attribute {
            let code : u16 = param.get_attr(OCI_ATTR_TYPECODE, err)?;
            let precision : u8 = param.get_attr(OCI_ATTR_PRECISION, err).unwrap_or(0);
            (code, ColumnType::from_typecode(code, charset_form), precision as i16)
        } else {
            let sqlt : u16 = param.get_attr(OCI_ATTR_DATA_TYPE, err)?;
            let precision : i16 = param.get_attr(OCI_ATTR_PRECISION, err).unwrap_or(0);
            (sqlt, ColumnType::from_sqlt(sqlt, charset_form), precision)
        };
        let size : u16 = param.get_attr(OCI_ATTR_DATA_SIZE, err).unwrap_or(0);
        let scale : i8 = param.get_attr(OCI_ATTR_SCALE, err).unwrap_or(0);
        let nullable = if source == ColumnSource::Attribute {
            true
        } else {
            param.get_attr::<u8>(OCI_ATTR_IS_NULL, err)? != 0
        };
        let char_used : u8 = param.get_attr(OCI_ATTR_CHAR_USED, err).unwrap_or(0);
        let char_size : u16 = param.get_attr(OCI_ATTR_CHAR_SIZE, err).unwrap_or(0);
        let properties : u64 = if source == ColumnSource::Attribute {
            0
        } else {
            param.get_attr(OCI_ATTR_COL_PROPERTIES, err).unwrap_or(0)
        };

        let mut type_name = String::new();
        let mut schema_name = String::new();
        let mut typeinfo = None;
        if matches!(column_type, ColumnType::Object | ColumnType::Collection | ColumnType::Ref) {
            type_name = param.get_attr(OCI_ATTR_TYPE_NAME, err)?;
            schema_name = param.get_attr(OCI_ATTR_SCHEMA_NAME, err)?;
            // REFs of attributes and table columns are resolved when they are read, as types may refer to themselves
            if column_type != ColumnType::Ref || source == ColumnSource::SelectList {
                let full_name = format!("\"{}\".\"{}\"", schema_name, type_name);
                typeinfo = Some( TypeInfo::get(conn, &full_name, TypeInfoKind::Type)? );
            }
        }
        // Named types of select lists are reported as SQLT_NTY for both objects and collections.
        let column_type = match (&typeinfo, column_type) {
            (Some(info), ColumnType::Object) if info.is_collection() => ColumnType::Collection,
            _ => column_type,
        };

        Ok( Self {
            name, sql_type, column_type, type_name, schema_name,
            size: size as u32, precision, scale, nullable, charset_form,
            char_used: char_used != 0, char_size, properties, typeinfo,
        } )
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the SQL type code for columns or the type code for object attributes.
    pub fn sql_type(&self) -> u16 {
        self.sql_type
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Returns the name of the named type, if the column is of an object, collection or REF type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the schema of the named type.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Returns the maximum size of the column data in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn precision(&self) -> i16 {
        self.precision
    }

    pub fn scale(&self) -> i8 {
        self.scale
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn charset_form(&self) -> CharSetForm {
        self.charset_form
    }

    /// Whether the length of the column was declared in characters.
    pub fn is_char_used(&self) -> bool {
        self.char_used
    }

    /// Returns the declared length in characters.
    pub fn char_size(&self) -> u16 {
        self.char_size
    }

    /// Whether the column is an identity column. Only table columns of 12.1+ servers report it.
    pub fn is_identity(&self) -> bool {
        self.properties & OCI_ATTR_COL_PROPERTY_IS_IDENTITY != 0
    }

    /// Whether the identity column is `GENERATED ALWAYS`.
    pub fn is_generated_always(&self) -> bool {
        self.properties & OCI_ATTR_COL_PROPERTY_IS_GEN_ALWAYS != 0
    }

    /// Whether the identity column is `GENERATED BY DEFAULT ON NULL`.
    pub fn is_generated_by_default_on_null(&self) -> bool {
        self.properties & OCI_ATTR_COL_PROPERTY_IS_GEN_BY_DEF_ON_NULL != 0
    }

    /// Returns the description of the named type of object and collection columns,
    /// and of the referenced type of select-list REF columns.
    pub fn type_info(&self) -> Option<&Arc<TypeInfo>> {
        self.typeinfo.as_ref()
    }

    /// Returns the description of the object type a REF column or attribute points to.
    pub(crate) fn referenced_type(&self, conn: &Connection) -> Result<Arc<TypeInfo>> {
        match &self.typeinfo {
            Some(info) => Ok(Arc::clone(info)),
            None => {
                let full_name = format!("\"{}\".\"{}\"", self.schema_name, self.type_name);
                TypeInfo::get(conn, &full_name, TypeInfoKind::Type)
            }
        }
    }

    /// Size of the buffer a fetched or bound value of this column needs.
    pub(crate) fn buffer_size(&self, long_max: usize) -> usize {
        match self.column_type {
            ColumnType::Number => std::mem::size_of::<OCINumber>(),
            ColumnType::BinaryFloat | ColumnType::BinaryDouble => std::mem::size_of::<f64>(),
            // Server character data can grow up to 4 bytes per character in the client charset.
            ColumnType::Text => (self.size as usize).max(self.char_size as usize) * 4 + 1,
            ColumnType::Raw => (self.size as usize).max(1),
            ColumnType::Long | ColumnType::LongRaw => long_max,
            ColumnType::Date => std::mem::size_of::<OCIDate>(),
            ColumnType::Boolean => std::mem::size_of::<i32>(),
            _ => std::mem::size_of::<*mut libc::c_void>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_types() {
        assert_eq!(ColumnType::from_sqlt(SQLT_NUM, CharSetForm::Implicit), ColumnType::Number);
        assert_eq!(ColumnType::from_sqlt(SQLT_AFC, CharSetForm::Implicit), ColumnType::Text);
        assert_eq!(ColumnType::from_sqlt(SQLT_CLOB, CharSetForm::Implicit), ColumnType::CLOB);
        assert_eq!(ColumnType::from_sqlt(SQLT_CLOB, CharSetForm::NChar), ColumnType::NCLOB);
        assert_eq!(ColumnType::from_sqlt(SQLT_RDD, CharSetForm::Undefined), ColumnType::RowID);
        assert_eq!(ColumnType::from_sqlt(SQLT_RSET, CharSetForm::Undefined), ColumnType::Cursor);
        assert_eq!(ColumnType::from_sqlt(9999, CharSetForm::Undefined), ColumnType::Unknown(9999));
    }

    #[test]
    fn type_codes() {
        // REAL shares its code with SQLT_BFLOAT, but it is an Oracle NUMBER
        assert_eq!(ColumnType::from_typecode(OCI_TYPECODE_REAL, CharSetForm::Undefined), ColumnType::Number);
        assert_eq!(ColumnType::from_sqlt(SQLT_BFLOAT, CharSetForm::Undefined), ColumnType::BinaryFloat);
        assert_eq!(ColumnType::from_typecode(OCI_TYPECODE_VARRAY, CharSetForm::Undefined), ColumnType::Collection);
        assert_eq!(ColumnType::from_typecode(OCI_TYPECODE_OBJECT, CharSetForm::Undefined), ColumnType::Object);
    }

    #[test]
    fn descriptor_types() {
        assert!(ColumnType::TimestampTZ.is_descriptor());
        assert!(ColumnType::BFile.is_descriptor());
        assert!(!ColumnType::Number.is_descriptor());
        assert!(!ColumnType::Object.is_descriptor());
    }
}
