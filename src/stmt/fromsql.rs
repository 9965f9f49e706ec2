//! Conversions of fetched column values

use super::cursor::Cursor;
use crate::{
    BFile, Collection, Connection, Error, Object, Ref, Result, RowID,
    column::ColumnType,
    env::{Env, FormatKind},
    err::LibError,
    lob::{InternalLob, LOB},
    oci::*,
    typeinfo::TypeInfo,
    types::{Date, Number, number, rowid, interval::{self, Interval}, timestamp::{self, Timestamp}},
};
use libc::c_void;
use std::{cell::Cell, mem::size_of, ptr, sync::Arc};

/// Column value in a fetch buffer or in a RETURNING buffer.
#[doc(hidden)]
pub struct SqlValue<'a, 'b> {
    pub(crate) conn: &'a Connection<'a>,
    pub(crate) column_type: ColumnType,
    pub(crate) type_info: Option<&'b Arc<TypeInfo>>,
    pub(crate) lfprec: u8,
    pub(crate) fsprec: u8,
    /// Value bytes of types that are fetched inline
    pub(crate) data: &'b [u8],
    /// Slot with a descriptor, a statement handle or an object instance
    pub(crate) ptr: Option<&'b Cell<*mut c_void>>,
    pub(crate) obj_ind: *mut c_void,
}

impl<'a> SqlValue<'a, '_> {
    fn err(&self) -> *mut OCIError {
        self.conn.err_ptr()
    }

    fn read<T: Copy>(&self) -> Result<T> {
        if self.data.len() < size_of::<T>() {
            return Err( Error::lib(LibError::NullPointer) );
        }
        Ok( unsafe { ptr::read_unaligned(self.data.as_ptr() as *const T) } )
    }

    fn number(&self) -> Result<OCINumber> {
        self.read::<OCINumber>()
    }

    fn double(&self) -> Result<f64> {
        self.read::<f64>()
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(self.data).into_owned()
    }

    fn desc_ptr<T>(&self) -> Result<*mut T> {
        match self.ptr.map(Cell::get) {
            Some(ptr) if !ptr.is_null() => Ok(ptr as *mut T),
            _ => Err( Error::lib(LibError::NullPointer) ),
        }
    }

    fn type_info(&self) -> Result<&Arc<TypeInfo>> {
        self.type_info.ok_or_else(|| Error::lib(LibError::DatatypeNotSupported(SQLT_NTY)))
    }

    fn not_convertible<T>(&self, into: &'static str) -> Result<T> {
        Err( Error::lib(LibError::Conversion(self.column_type.name(), into)) )
    }
}

/// Types that fetched column values can be converted into.
pub trait FromSql<'a> : Sized {
    #[doc(hidden)]
    fn value(val: &SqlValue<'a, '_>) -> Result<Self>;
}

macro_rules! impl_int_from_sql {
    ($($t:ty),+) => {
        $(
            impl<'a> FromSql<'a> for $t {
                fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
                    match val.column_type {
                        ColumnType::Number => number::to_int::<$t>(&val.number()?, val.err()),
                        ColumnType::BinaryFloat | ColumnType::BinaryDouble => Ok( val.double()? as $t ),
                        ColumnType::Boolean => Ok( val.read::<i32>()? as $t ),
                        ColumnType::Text | ColumnType::Long => val.text().trim().parse::<$t>()
                            .map_err(|_| Error::lib(LibError::Conversion("VARCHAR2", stringify!($t)))),
                        _ => val.not_convertible(stringify!($t)),
                    }
                }
            }
        )+
    };
}

impl_int_from_sql!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_real_from_sql {
    ($($t:ty),+) => {
        $(
            impl<'a> FromSql<'a> for $t {
                fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
                    match val.column_type {
                        ColumnType::Number => number::to_real::<$t>(&val.number()?, val.err()),
                        ColumnType::BinaryFloat | ColumnType::BinaryDouble => Ok( val.double()? as $t ),
                        ColumnType::Text | ColumnType::Long => val.text().trim().parse::<$t>()
                            .map_err(|_| Error::lib(LibError::Conversion("VARCHAR2", stringify!($t)))),
                        _ => val.not_convertible(stringify!($t)),
                    }
                }
            }
        )+
    };
}

impl_real_from_sql!(f32, f64);

impl<'a> FromSql<'a> for bool {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        match val.column_type {
            ColumnType::Boolean => Ok( val.read::<i32>()? != 0 ),
            ColumnType::Number  => Ok( number::to_int::<i64>(&val.number()?, val.err())? != 0 ),
            _ => val.not_convertible("bool"),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut txt = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(txt, "{:02X}", byte);
    }
    txt
}

/// Binary floating point values are converted with the connection format when
/// there is one, and into the shortest text that reads back the same otherwise.
fn binary_to_string(val: &SqlValue, kind: FormatKind) -> Result<String> {
    let num = val.double()?;
    let fmt = val.conn.format(kind);
    if !fmt.is_empty() {
        let num = number::real_into_number(num, val.err())?;
        return number::to_string(&fmt, &num, val.err());
    }
    if kind == FormatKind::BinaryFloat {
        Ok( (num as f32).to_string() )
    } else {
        Ok( num.to_string() )
    }
}

impl<'a> FromSql<'a> for String {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        match val.column_type {
            ColumnType::Text | ColumnType::Long => Ok( val.text() ),
            ColumnType::Number => number::to_string(&val.conn.format(FormatKind::Numeric), &val.number()?, val.err()),
            ColumnType::BinaryFloat => binary_to_string(val, FormatKind::BinaryFloat),
            ColumnType::BinaryDouble => binary_to_string(val, FormatKind::BinaryDouble),
            ColumnType::Date => {
                let date = Date::from_oci(val.read::<OCIDate>()?, val.conn);
                date.to_string(&val.conn.format(FormatKind::Date))
            }
            ColumnType::Timestamp | ColumnType::TimestampLTZ => {
                timestamp::to_string(&val.conn.format(FormatKind::Timestamp), val.fsprec, val.desc_ptr()?, val.conn)
            }
            ColumnType::TimestampTZ => {
                timestamp::to_string(&val.conn.format(FormatKind::TimestampTz), val.fsprec, val.desc_ptr()?, val.conn)
            }
            ColumnType::IntervalYM | ColumnType::IntervalDS => {
                interval::to_string(val.lfprec, val.fsprec, val.desc_ptr()?, val.conn)
            }
            ColumnType::RowID => rowid::to_string(val.desc_ptr()?, val.err()),
            ColumnType::Raw | ColumnType::LongRaw => Ok( hex(val.data) ),
            ColumnType::Boolean => Ok( if val.read::<i32>()? != 0 { "TRUE" } else { "FALSE" }.to_string() ),
            ColumnType::CLOB | ColumnType::NCLOB => {
                let lob = LOB::<OCICLobLocator>::from_locator(val.desc_ptr()?, val.conn)?;
                let len = lob.len()?;
                lob.read(0, len)
            }
            _ => val.not_convertible("String"),
        }
    }
}

impl<'a> FromSql<'a> for Vec<u8> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        match val.column_type {
            ColumnType::Raw | ColumnType::LongRaw | ColumnType::Text | ColumnType::Long => Ok( val.data.to_vec() ),
            ColumnType::BLOB => {
                let lob = LOB::<OCIBLobLocator>::from_locator(val.desc_ptr()?, val.conn)?;
                let len = lob.len()?;
                lob.read(0, len)
            }
            _ => val.not_convertible("Vec<u8>"),
        }
    }
}

impl<'a> FromSql<'a> for Date<'a> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        match val.column_type {
            ColumnType::Date => Ok( Date::from_oci(val.read::<OCIDate>()?, val.conn) ),
            ColumnType::Text => Date::from_string(&val.text(), &val.conn.format(FormatKind::Date), val.conn),
            _ => val.not_convertible("Date"),
        }
    }
}

impl<'a> FromSql<'a> for Number<'a> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        match val.column_type {
            ColumnType::Number => Ok( Number::from_oci(val.number()?, val.conn) ),
            ColumnType::BinaryFloat | ColumnType::BinaryDouble => Number::from_real(val.double()?, val.conn),
            ColumnType::Text => Number::from_string(&val.text(), &val.conn.format(FormatKind::Numeric), val.conn),
            _ => val.not_convertible("Number"),
        }
    }
}

impl<'a, T> FromSql<'a> for Timestamp<'a, T> where T: DescriptorType<OCIType=OCIDateTime> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        let dtype = match val.column_type {
            ColumnType::Timestamp    => OCI_DTYPE_TIMESTAMP,
            ColumnType::TimestampTZ  => OCI_DTYPE_TIMESTAMP_TZ,
            ColumnType::TimestampLTZ => OCI_DTYPE_TIMESTAMP_LTZ,
            _ => return val.not_convertible("Timestamp"),
        };
        let src : *mut OCIDateTime = val.desc_ptr()?;
        if dtype == T::get_type() {
            return timestamp::from_timestamp(src, val.conn);
        }
        match dtype {
            OCI_DTYPE_TIMESTAMP => timestamp::from_timestamp::<OCITimestamp>(src, val.conn)?.convert_into(),
            OCI_DTYPE_TIMESTAMP_TZ => timestamp::from_timestamp::<OCITimestampTZ>(src, val.conn)?.convert_into(),
            _ => timestamp::from_timestamp::<OCITimestampLTZ>(src, val.conn)?.convert_into(),
        }
    }
}

impl<'a, T> FromSql<'a> for Interval<'a, T> where T: DescriptorType<OCIType=OCIInterval> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        let dtype = match val.column_type {
            ColumnType::IntervalYM => OCI_DTYPE_INTERVAL_YM,
            ColumnType::IntervalDS => OCI_DTYPE_INTERVAL_DS,
            _ => return val.not_convertible("Interval"),
        };
        if dtype != T::get_type() {
            return val.not_convertible("Interval");
        }
        interval::from_interval(val.desc_ptr()?, val.conn)
    }
}

impl<'a> FromSql<'a> for RowID {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        match val.column_type {
            ColumnType::RowID => RowID::from_descriptor(val.desc_ptr()?, val.err()),
            ColumnType::Text => Ok( RowID::new(val.text()) ),
            _ => val.not_convertible("RowID"),
        }
    }
}

impl<'a, T: InternalLob> FromSql<'a> for LOB<'a, T> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        let sql_type = match val.column_type {
            ColumnType::CLOB | ColumnType::NCLOB => SQLT_CLOB,
            ColumnType::BLOB => SQLT_BLOB,
            _ => return val.not_convertible("LOB"),
        };
        if sql_type != T::SQL_TYPE {
            return val.not_convertible(if T::SQL_TYPE == SQLT_BLOB { "BLOB" } else { "CLOB" });
        }
        LOB::from_locator(val.desc_ptr()?, val.conn)
    }
}

impl<'a> FromSql<'a> for BFile<'a> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        match val.column_type {
            ColumnType::BFile => BFile::from_locator(val.desc_ptr()?, val.conn),
            _ => val.not_convertible("BFile"),
        }
    }
}

impl<'a> FromSql<'a> for Object<'a> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        match val.column_type {
            ColumnType::Object => Object::from_instance(val.conn, val.type_info()?, val.desc_ptr()?, val.obj_ind),
            _ => val.not_convertible("Object"),
        }
    }
}

impl<'a> FromSql<'a> for Collection<'a> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        match val.column_type {
            ColumnType::Collection => Collection::from_coll(val.conn, val.type_info()?, val.desc_ptr::<OCIColl>()?),
            _ => val.not_convertible("Collection"),
        }
    }
}

impl<'a> FromSql<'a> for Ref<'a> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        match val.column_type {
            ColumnType::Ref => Ref::from_ref(val.conn, val.type_info()?, val.desc_ptr::<OCIRef>()?),
            _ => val.not_convertible("Ref"),
        }
    }
}

/// A cursor column value can be taken once. The fetch buffer gets a new statement
/// handle for the following fetches.
impl<'a> FromSql<'a> for Cursor<'a> {
    fn value(val: &SqlValue<'a, '_>) -> Result<Self> {
        if val.column_type != ColumnType::Cursor {
            return val.not_convertible("Cursor");
        }
        let slot = val.ptr.ok_or_else(|| Error::lib(LibError::NullPointer))?;
        let mut fresh = Handle::<OCIStmt>::new(val.conn.env_ptr())?;
        let stmt = slot.replace(fresh.release() as *mut c_void);
        Ok( Cursor::from_handle(val.conn, Handle::from(stmt as *mut OCIStmt)) )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_print_as_hex() {
        assert_eq!(hex(&[0x00, 0x1f, 0xab, 0xff]), "001FABFF");
        assert_eq!(hex(&[]), "");
    }
}
