//! Descriptions of tables, views and named types

use crate::{Connection, Error, Result, column::{Column, ColumnSource}, env::Env, err::LibError, oci::*};
use libc::c_void;
use std::{fmt, sync::Arc};

/// What kind of schema object a [`TypeInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeInfoKind {
    Table,
    View,
    Type,
}

impl TypeInfoKind {
    fn ptype(self) -> u8 {
        match self {
            TypeInfoKind::Table => OCI_PTYPE_TABLE,
            TypeInfoKind::View  => OCI_PTYPE_VIEW,
            TypeInfoKind::Type  => OCI_PTYPE_TYPE,
        }
    }

    fn name(self) -> &'static str {
        match self {
            TypeInfoKind::Table => "table",
            TypeInfoKind::View  => "view",
            TypeInfoKind::Type  => "type",
        }
    }
}

/// Kind of a collection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Varray,
    NestedTable,
    IndexedTable,
}

impl CollectionKind {
    fn from_typecode(code: u16) -> Option<Self> {
        match code {
            OCI_TYPECODE_VARRAY => Some(CollectionKind::Varray),
            OCI_TYPECODE_TABLE  => Some(CollectionKind::NestedTable),
            OCI_TYPECODE_ITABLE => Some(CollectionKind::IndexedTable),
            _ => None,
        }
    }
}

/// Splits `schema.name` into its upper-cased parts. Quoted identifiers keep their case.
fn split_name(full_name: &str, default_schema: &str) -> (String, String) {
    fn ident(part: &str) -> String {
        let part = part.trim();
        if part.len() >= 2 && part.starts_with('"') && part.ends_with('"') {
            part[1..part.len() - 1].to_string()
        } else {
            part.to_uppercase()
        }
    }
    match full_name.find('.') {
        Some(pos) => (ident(&full_name[..pos]), ident(&full_name[pos + 1..])),
        None => (default_schema.to_uppercase(), ident(full_name)),
    }
}

/**
    Description of a table, a view or a named (object or collection) type.

    Descriptions are cached by the connection that created them. The cache is
    cleared when the connection logs off.

    # Example

    ```no_run
    use oracall::{CollectionKind, ColumnType, TypeInfoKind};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    conn.execute_immediate("CREATE OR REPLACE TYPE hr.phone_list AS VARRAY(5) OF VARCHAR2(20)", ())?;
    let phones = conn.describe_type("hr.phone_list", TypeInfoKind::Type)?;
    assert!(phones.is_collection());
    assert_eq!(phones.collection_kind(), Some(CollectionKind::Varray));
    assert_eq!(phones.element().map(|e| e.column_type()), Some(ColumnType::Text));
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct TypeInfo {
    schema: String,
    name: String,
    kind: TypeInfoKind,
    columns: Vec<Column>,
    typecode: u16,
    collection: Option<CollectionKind>,
    element: Option<Column>,
    is_final: bool,
    super_type: Option<(String, String)>,
    tdo: Ptr<OCIType>,
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("schema", &self.schema)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("columns", &self.columns.len())
            .field("collection", &self.collection)
            .finish()
    }
}

impl TypeInfo {
    /// Returns the cached description of `name` or describes it.
    pub(crate) fn get(conn: &Connection, name: &str, kind: TypeInfoKind) -> Result<Arc<TypeInfo>> {
        let default_schema = match conn.current_schema() {
            Ok(schema) if !schema.is_empty() => schema,
            _ => conn.user().to_string(),
        };
        let (schema, obj_name) = split_name(name, &default_schema);
        if let Some(info) = conn.tinfs.find(|t| t.kind == kind && t.schema == schema && t.name == obj_name) {
            log::debug!("type info cache hit for {}.{}", schema, obj_name);
            return Ok(info);
        }
        let info = Arc::new(Self::describe(conn, schema, obj_name, kind)?);
        conn.tinfs.append(Arc::clone(&info));
        Ok(info)
    }

    fn describe(conn: &Connection, mut schema: String, mut name: String, kind: TypeInfoKind) -> Result<Self> {
        let err = conn.err_ptr();
        let dsc = Handle::<OCIDescribe>::new(conn.env_ptr())?;
        // Synonyms are followed once
        let mut param = None;
        for _ in 0..2 {
            let full_name = format!("\"{}\".\"{}\"", schema, name);
            catch!{err =>
                OCIDescribeAny(
                    conn.svc_ptr(), err,
                    full_name.as_ptr() as *const c_void, full_name.len() as u32,
                    OCI_OTYPE_NAME, OCI_DEFAULT as u8, OCI_PTYPE_UNK, dsc.get()
                )
            }
            let root : *mut OCIParam = dsc.get_attr(OCI_ATTR_PARAM, err)?;
            let root = Param::from(root);
            let ptype : u8 = root.get_attr(OCI_ATTR_PTYPE, err)?;
            if ptype == OCI_PTYPE_SYN {
                schema = root.get_attr(OCI_ATTR_SCHEMA_NAME, err)?;
                name = root.get_attr(OCI_ATTR_NAME, err)?;
                continue;
            }
            if ptype != kind.ptype() {
                return Err( Error::lib(LibError::TypeInfoDatatype(format!("{}.{}", schema, name), kind.name())) );
            }
            param = Some(root);
            break;
        }
        let param = param.ok_or_else(|| Error::lib(LibError::TypeInfoDatatype(format!("{}.{}", schema, name), kind.name())))?;

        let mut info = Self {
            schema, name, kind,
            columns: Vec::new(),
            typecode: 0,
            collection: None,
            element: None,
            is_final: true,
            super_type: None,
            tdo: Ptr::null(),
        };

        if kind == TypeInfoKind::Type {
            info.typecode = param.get_attr(OCI_ATTR_TYPECODE, err)?;
            let type_ref : *mut OCIRef = param.get_attr(OCI_ATTR_REF_TDO, err)?;
            catch!{err =>
                OCITypeByRef(conn.env_ptr(), err, type_ref, OCI_DURATION_SESSION, OCI_TYPEGET_ALL, info.tdo.as_mut_ptr())
            }
            info.is_final = param.get_attr::<u8>(OCI_ATTR_IS_FINAL_TYPE, err).unwrap_or(1) != 0;
            if param.get_attr::<u8>(OCI_ATTR_IS_SUBTYPE, err).unwrap_or(0) != 0 {
                let super_schema : String = param.get_attr(OCI_ATTR_SUPERTYPE_SCHEMA_NAME, err)?;
                let super_name : String = param.get_attr(OCI_ATTR_SUPERTYPE_NAME, err)?;
                info.super_type = Some((super_schema, super_name));
            }
            if info.typecode == OCI_TYPECODE_NAMEDCOLLECTION {
                let coll_code : u16 = param.get_attr(OCI_ATTR_COLLECTION_TYPECODE, err)?;
                info.collection = CollectionKind::from_typecode(coll_code);
                let elem : *mut OCIParam = param.get_attr(OCI_ATTR_COLLECTION_ELEMENT, err)?;
                info.element = Some( Column::describe(&Param::from(elem), ColumnSource::Attribute, conn)? );
            } else {
                let num_attrs : u16 = param.get_attr(OCI_ATTR_NUM_TYPE_ATTRS, err)?;
                for pos in 1..=num_attrs as u32 {
                    let attr = param.list_item(OCI_ATTR_LIST_TYPE_ATTRS, pos, err)?;
                    info.columns.push( Column::describe(&attr, ColumnSource::Attribute, conn)? );
                }
            }
        } else {
            let num_cols : u16 = param.get_attr(OCI_ATTR_NUM_COLS, err)?;
            for pos in 1..=num_cols as u32 {
                let col = param.list_item(OCI_ATTR_LIST_COLUMNS, pos, err)?;
                info.columns.push( Column::describe(&col, ColumnSource::Table, conn)? );
            }
        }
        log::debug!("described {} {}.{} ({} columns)", kind.name(), info.schema, info.name, info.columns.len());
        Ok(info)
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeInfoKind {
        self.kind
    }

    /// Returns the number of columns of a table or a view, or the number of attributes of an object type.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column or attribute at the 0-based `pos`.
    pub fn column(&self, pos: usize) -> Result<&Column> {
        self.columns.get(pos).ok_or_else(|| Error::lib(LibError::OutOfBounds(pos)))
    }

    /// Returns the column or attribute with the given name (case-insensitive).
    pub fn column_by_name(&self, name: &str) -> Result<&Column> {
        self.columns.iter()
            .find(|col| col.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::lib(LibError::ColumnNotFound(name.to_string())))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the OCI type code of a named type, 0 for tables and views.
    pub fn typecode(&self) -> u16 {
        self.typecode
    }

    pub fn is_collection(&self) -> bool {
        self.collection.is_some()
    }

    pub fn collection_kind(&self) -> Option<CollectionKind> {
        self.collection
    }

    /// Returns the description of the element type of a collection.
    pub fn element(&self) -> Option<&Column> {
        self.element.as_ref()
    }

    /// Whether the type can have subtypes.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Returns the description of the super type, if this type is a subtype.
    pub fn super_type(&self, conn: &Connection) -> Result<Option<Arc<TypeInfo>>> {
        match &self.super_type {
            Some((schema, name)) => {
                let full_name = format!("\"{}\".\"{}\"", schema, name);
                TypeInfo::get(conn, &full_name, TypeInfoKind::Type).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Returns the pinned type descriptor object of a named type.
    pub(crate) fn tdo(&self) -> *mut OCIType {
        self.tdo.get()
    }

    /// Returns the TDO or an error when this is not a named type.
    pub(crate) fn check_type(&self, what: &'static str) -> Result<*mut OCIType> {
        if self.kind != TypeInfoKind::Type || self.tdo.is_null() {
            return Err( Error::lib(LibError::TypeInfoDatatype(format!("{}.{}", self.schema, self.name), what)) );
        }
        Ok(self.tdo.get())
    }

    pub(crate) fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(split_name("hr.employees", "SCOTT"), ("HR".to_string(), "EMPLOYEES".to_string()));
        assert_eq!(split_name("employees", "hr"), ("HR".to_string(), "EMPLOYEES".to_string()));
        assert_eq!(split_name("\"Hr\".\"MixedCase\"", "X"), ("Hr".to_string(), "MixedCase".to_string()));
    }

    #[test]
    fn collection_kinds() {
        assert_eq!(CollectionKind::from_typecode(OCI_TYPECODE_VARRAY), Some(CollectionKind::Varray));
        assert_eq!(CollectionKind::from_typecode(OCI_TYPECODE_TABLE), Some(CollectionKind::NestedTable));
        assert_eq!(CollectionKind::from_typecode(OCI_TYPECODE_OBJECT), None);
    }
}
