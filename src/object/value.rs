//! Conversions of object attributes and collection elements

use super::{Object, Ref};
use crate::{
    BFile, Collection, Connection, Error, Result,
    column::{Column, ColumnType},
    env::{Env, FormatKind},
    err::LibError,
    lob::LOB,
    oci::*,
    types::{Ctx, Date, Number, number, interval::{self, Interval}, timestamp::{self, Timestamp}},
};
use libc::c_void;
use std::ptr;

static NOT_NULL : OCIInd = OCI_IND_NOTNULL;

/// Where an attribute or element value lives in object memory.
#[doc(hidden)]
pub struct ValueRef<'a, 'b> {
    pub(crate) conn: &'a Connection<'a>,
    pub(crate) desc: &'b Column,
    pub(crate) value: *mut c_void,
    pub(crate) ind: *mut c_void,
}

impl<'a> ValueRef<'a, '_> {
    fn err(&self) -> *mut OCIError {
        self.conn.err_ptr()
    }

    fn ctx(&self) -> &'a dyn Ctx {
        self.conn
    }

    fn column_type(&self) -> ColumnType {
        self.desc.column_type()
    }

    /// Attribute values that are not stored inline are referenced by pointer.
    unsafe fn deref<T>(&self) -> *mut T {
        *(self.value as *mut *mut T)
    }

    fn number(&self) -> &OCINumber {
        unsafe { &*(self.value as *const OCINumber) }
    }

    fn not_convertible<T>(&self, into: &'static str) -> Result<T> {
        Err( Error::lib(LibError::Conversion(self.desc.column_type().name(), into)) )
    }
}

/// Value prepared for storing into an attribute or a collection element.
#[doc(hidden)]
pub enum Value {
    Number(OCINumber),
    Float(f32),
    Double(f64),
    Date(OCIDate),
    Text { ptr: Ptr<OCIString>, env: Ptr<OCIEnv>, err: Ptr<OCIError> },
    Raw { ptr: Ptr<OCIRaw>, env: Ptr<OCIEnv>, err: Ptr<OCIError> },
    Ptr(*mut c_void),
    Object(*mut c_void, *mut c_void),
}

impl Drop for Value {
    fn drop(&mut self) {
        match self {
            Value::Text { ptr, env, err } => unsafe {
                OCIStringResize(env.get(), err.get(), 0, ptr.as_mut_ptr());
            },
            Value::Raw { ptr, env, err } => unsafe {
                OCIRawResize(env.get(), err.get(), 0, ptr.as_mut_ptr());
            },
            _ => {}
        }
    }
}

impl Value {
    pub(crate) fn as_ptr(&self) -> *const c_void {
        match self {
            Value::Number(num)        => num as *const OCINumber as *const c_void,
            Value::Float(val)         => val as *const f32 as *const c_void,
            Value::Double(val)        => val as *const f64 as *const c_void,
            Value::Date(date)         => date as *const OCIDate as *const c_void,
            Value::Text { ptr, .. }   => ptr.get() as *const c_void,
            Value::Raw { ptr, .. }    => ptr.get() as *const c_void,
            Value::Ptr(ptr)           => *ptr as *const c_void,
            Value::Object(inst, _)    => *inst as *const c_void,
        }
    }

    /// Null structure of an object value, null otherwise.
    pub(crate) fn null_struct(&self) -> *const c_void {
        match self {
            Value::Object(_, ind) => *ind as *const c_void,
            _ => ptr::null(),
        }
    }

    /// Indicator of a collection element.
    pub(crate) fn ind_ptr(&self) -> *const c_void {
        match self {
            Value::Object(_, ind) => *ind as *const c_void,
            _ => &NOT_NULL as *const OCIInd as *const c_void,
        }
    }

    fn text(txt: &str, conn: &Connection) -> Result<Self> {
        let mut ptr = Ptr::<OCIString>::null();
        catch!{conn.err_ptr() =>
            OCIStringAssignText(conn.env_ptr(), conn.err_ptr(), txt.as_ptr(), txt.len() as u32, ptr.as_mut_ptr())
        }
        Ok( Value::Text { ptr, env: Ptr::new(conn.env_ptr()), err: Ptr::new(conn.err_ptr()) } )
    }

    fn raw(data: &[u8], conn: &Connection) -> Result<Self> {
        let mut ptr = Ptr::<OCIRaw>::null();
        catch!{conn.err_ptr() =>
            OCIRawAssignBytes(conn.env_ptr(), conn.err_ptr(), data.as_ptr(), data.len() as u32, ptr.as_mut_ptr())
        }
        Ok( Value::Raw { ptr, env: Ptr::new(conn.env_ptr()), err: Ptr::new(conn.err_ptr()) } )
    }
}

/// Returns the pointer that represents the current value of an attribute or an element.
pub(crate) fn current_value(desc: &Column, value: *mut c_void) -> *const c_void {
    match desc.column_type() {
        ColumnType::Number | ColumnType::BinaryFloat | ColumnType::BinaryDouble
        | ColumnType::Date | ColumnType::Object => value as *const c_void,
        _ if value.is_null() => ptr::null(),
        _ => unsafe { *(value as *mut *mut c_void) as *const c_void },
    }
}

/// Types that can be read from object attributes and collection elements.
pub trait FromValue<'a> : Sized {
    #[doc(hidden)]
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self>;
}

/// Types that can be stored in object attributes and collection elements.
pub trait ToValue {
    #[doc(hidden)]
    fn to_value(&self, conn: &Connection, desc: &Column) -> Result<Value>;
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self, conn: &Connection, desc: &Column) -> Result<Value> {
        (**self).to_value(conn, desc)
    }
}

fn wrong_type<T>(desc: &Column, from: &'static str) -> Result<T> {
    Err( Error::lib(LibError::Conversion(from, desc.column_type().name())) )
}

macro_rules! impl_int_value {
    ($($t:ty),+) => {
        $(
            impl<'a> FromValue<'a> for $t {
                fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
                    match value.column_type() {
                        ColumnType::Number       => number::to_int::<$t>(value.number(), value.err()),
                        ColumnType::BinaryFloat  => Ok( unsafe { *(value.value as *const f32) } as $t ),
                        ColumnType::BinaryDouble => Ok( unsafe { *(value.value as *const f64) } as $t ),
                        _ => value.not_convertible(stringify!($t)),
                    }
                }
            }

            impl ToValue for $t {
                fn to_value(&self, conn: &Connection, desc: &Column) -> Result<Value> {
                    match desc.column_type() {
                        ColumnType::Number       => Ok( Value::Number(number::int_into_number(*self, conn.err_ptr())?) ),
                        ColumnType::BinaryFloat  => Ok( Value::Float(*self as f32) ),
                        ColumnType::BinaryDouble => Ok( Value::Double(*self as f64) ),
                        _ => wrong_type(desc, stringify!($t)),
                    }
                }
            }
        )+
    };
}

impl_int_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_real_value {
    ($($t:ty),+) => {
        $(
            impl<'a> FromValue<'a> for $t {
                fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
                    match value.column_type() {
                        ColumnType::Number       => number::to_real::<$t>(value.number(), value.err()),
                        ColumnType::BinaryFloat  => Ok( unsafe { *(value.value as *const f32) } as $t ),
                        ColumnType::BinaryDouble => Ok( unsafe { *(value.value as *const f64) } as $t ),
                        _ => value.not_convertible(stringify!($t)),
                    }
                }
            }

            impl ToValue for $t {
                fn to_value(&self, conn: &Connection, desc: &Column) -> Result<Value> {
                    match desc.column_type() {
                        ColumnType::Number       => Ok( Value::Number(number::real_into_number(*self, conn.err_ptr())?) ),
                        ColumnType::BinaryFloat  => Ok( Value::Float(*self as f32) ),
                        ColumnType::BinaryDouble => Ok( Value::Double(*self as f64) ),
                        _ => wrong_type(desc, stringify!($t)),
                    }
                }
            }
        )+
    };
}

impl_real_value!(f32, f64);

impl<'a> FromValue<'a> for String {
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        match value.column_type() {
            ColumnType::Text => {
                let env = value.conn.env_ptr();
                let txt = unsafe { value.deref::<OCIString>() };
                let (ptr, len) = unsafe { (OCIStringPtr(env, txt), OCIStringSize(env, txt) as usize) };
                if ptr.is_null() || len == 0 {
                    return Ok(String::new());
                }
                let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
                Ok( String::from_utf8_lossy(bytes).into_owned() )
            }
            ColumnType::Number => number::to_string(&value.conn.format(FormatKind::Numeric), value.number(), value.err()),
            ColumnType::Date => {
                let date = Date::from_oci(unsafe { *(value.value as *const OCIDate) }, value.ctx());
                date.to_string(&value.conn.format(FormatKind::Date))
            }
            _ => value.not_convertible("String"),
        }
    }
}

impl ToValue for str {
    fn to_value(&self, conn: &Connection, desc: &Column) -> Result<Value> {
        match desc.column_type() {
            ColumnType::Text => Value::text(self, conn),
            ColumnType::Number => {
                let num = number::from_string(self, &conn.format(FormatKind::Numeric), conn.err_ptr())?;
                Ok( Value::Number(num) )
            }
            _ => wrong_type(desc, "&str"),
        }
    }
}

impl ToValue for String {
    fn to_value(&self, conn: &Connection, desc: &Column) -> Result<Value> {
        self.as_str().to_value(conn, desc)
    }
}

impl<'a> FromValue<'a> for Vec<u8> {
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        match value.column_type() {
            ColumnType::Raw => {
                let env = value.conn.env_ptr();
                let raw = unsafe { value.deref::<OCIRaw>() };
                let (ptr, len) = unsafe { (OCIRawPtr(env, raw), OCIRawSize(env, raw) as usize) };
                if ptr.is_null() || len == 0 {
                    return Ok(Vec::new());
                }
                Ok( unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec() )
            }
            _ => value.not_convertible("Vec<u8>"),
        }
    }
}

impl ToValue for [u8] {
    fn to_value(&self, conn: &Connection, desc: &Column) -> Result<Value> {
        match desc.column_type() {
            ColumnType::Raw => Value::raw(self, conn),
            _ => wrong_type(desc, "&[u8]"),
        }
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self, conn: &Connection, desc: &Column) -> Result<Value> {
        self.as_slice().to_value(conn, desc)
    }
}

impl<'a> FromValue<'a> for Date<'a> {
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        match value.column_type() {
            ColumnType::Date => Ok( Date::from_oci(unsafe { *(value.value as *const OCIDate) }, value.ctx()) ),
            _ => value.not_convertible("Date"),
        }
    }
}

impl ToValue for Date<'_> {
    fn to_value(&self, _conn: &Connection, desc: &Column) -> Result<Value> {
        match desc.column_type() {
            ColumnType::Date => Ok( Value::Date(*self.as_oci()) ),
            _ => wrong_type(desc, "Date"),
        }
    }
}

impl<'a> FromValue<'a> for Number<'a> {
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        match value.column_type() {
            ColumnType::Number       => Ok( Number::from_oci(*value.number(), value.ctx()) ),
            ColumnType::BinaryFloat  => Number::from_real(unsafe { *(value.value as *const f32) }, value.ctx()),
            ColumnType::BinaryDouble => Number::from_real(unsafe { *(value.value as *const f64) }, value.ctx()),
            _ => value.not_convertible("Number"),
        }
    }
}

impl ToValue for Number<'_> {
    fn to_value(&self, _conn: &Connection, desc: &Column) -> Result<Value> {
        match desc.column_type() {
            ColumnType::Number       => Ok( Value::Number(*self.as_oci()) ),
            ColumnType::BinaryFloat  => Ok( Value::Float(self.to_real()?) ),
            ColumnType::BinaryDouble => Ok( Value::Double(self.to_real()?) ),
            _ => wrong_type(desc, "Number"),
        }
    }
}

impl<'a, T> FromValue<'a> for Timestamp<'a, T>
    where T: DescriptorType<OCIType=OCIDateTime>
{
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        let src = unsafe { value.deref::<OCIDateTime>() } as *const OCIDateTime;
        let src_type = match value.column_type() {
            ColumnType::Timestamp    => OCI_DTYPE_TIMESTAMP,
            ColumnType::TimestampTZ  => OCI_DTYPE_TIMESTAMP_TZ,
            ColumnType::TimestampLTZ => OCI_DTYPE_TIMESTAMP_LTZ,
            _ => return value.not_convertible("Timestamp"),
        };
        if src_type == T::get_type() {
            return timestamp::from_timestamp(src, value.ctx());
        }
        match value.column_type() {
            ColumnType::TimestampTZ  => timestamp::from_timestamp::<OCITimestampTZ>(src, value.ctx())?.convert_into(),
            ColumnType::TimestampLTZ => timestamp::from_timestamp::<OCITimestampLTZ>(src, value.ctx())?.convert_into(),
            _ => timestamp::from_timestamp::<OCITimestamp>(src, value.ctx())?.convert_into(),
        }
    }
}

impl<T> ToValue for Timestamp<'_, T>
    where T: DescriptorType<OCIType=OCIDateTime>
{
    fn to_value(&self, _conn: &Connection, desc: &Column) -> Result<Value> {
        match desc.column_type() {
            ColumnType::Timestamp | ColumnType::TimestampTZ | ColumnType::TimestampLTZ => Ok( Value::Ptr(self.as_ptr() as *mut c_void) ),
            _ => wrong_type(desc, "Timestamp"),
        }
    }
}

impl<'a, T> FromValue<'a> for Interval<'a, T>
    where T: DescriptorType<OCIType=OCIInterval>
{
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        let expected = match value.column_type() {
            ColumnType::IntervalYM => OCI_DTYPE_INTERVAL_YM,
            ColumnType::IntervalDS => OCI_DTYPE_INTERVAL_DS,
            _ => return value.not_convertible("Interval"),
        };
        if expected != T::get_type() {
            return value.not_convertible("Interval");
        }
        interval::from_interval(unsafe { value.deref::<OCIInterval>() }, value.ctx())
    }
}

impl<T> ToValue for Interval<'_, T>
    where T: DescriptorType<OCIType=OCIInterval>
{
    fn to_value(&self, _conn: &Connection, desc: &Column) -> Result<Value> {
        let expected = match desc.column_type() {
            ColumnType::IntervalYM => OCI_DTYPE_INTERVAL_YM,
            ColumnType::IntervalDS => OCI_DTYPE_INTERVAL_DS,
            _ => return wrong_type(desc, "Interval"),
        };
        if expected != T::get_type() {
            return wrong_type(desc, "Interval");
        }
        Ok( Value::Ptr(self.as_ptr() as *mut c_void) )
    }
}

impl<'a> FromValue<'a> for LOB<'a, OCICLobLocator> {
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        match value.column_type() {
            ColumnType::CLOB | ColumnType::NCLOB => LOB::from_locator(unsafe { value.deref::<OCILobLocator>() }, value.conn),
            _ => value.not_convertible("CLOB"),
        }
    }
}

impl<'a> FromValue<'a> for LOB<'a, OCIBLobLocator> {
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        match value.column_type() {
            ColumnType::BLOB => LOB::from_locator(unsafe { value.deref::<OCILobLocator>() }, value.conn),
            _ => value.not_convertible("BLOB"),
        }
    }
}

impl<'a> FromValue<'a> for BFile<'a> {
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        match value.column_type() {
            ColumnType::BFile => BFile::from_locator(unsafe { value.deref::<OCILobLocator>() }, value.conn),
            _ => value.not_convertible("BFile"),
        }
    }
}

impl<'a> FromValue<'a> for Object<'a> {
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        match (value.column_type(), value.desc.type_info()) {
            (ColumnType::Object, Some(info)) => Object::from_instance(value.conn, info, value.value, value.ind),
            _ => value.not_convertible("Object"),
        }
    }
}

impl ToValue for Object<'_> {
    fn to_value(&self, _conn: &Connection, desc: &Column) -> Result<Value> {
        match (desc.column_type(), desc.type_info()) {
            (ColumnType::Object, Some(info)) if info.full_name() == self.type_info().full_name() => {
                Ok( Value::Object(self.instance(), self.null_struct()) )
            }
            _ => wrong_type(desc, "Object"),
        }
    }
}

impl<'a> FromValue<'a> for Collection<'a> {
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        match (value.column_type(), value.desc.type_info()) {
            (ColumnType::Collection, Some(info)) => Collection::from_coll(value.conn, info, unsafe { value.deref::<OCIColl>() }),
            _ => value.not_convertible("Collection"),
        }
    }
}

impl ToValue for Collection<'_> {
    fn to_value(&self, _conn: &Connection, desc: &Column) -> Result<Value> {
        match (desc.column_type(), desc.type_info()) {
            (ColumnType::Collection, Some(info)) if info.full_name() == self.type_info().full_name() => {
                Ok( Value::Ptr(self.as_ptr() as *mut c_void) )
            }
            _ => wrong_type(desc, "Collection"),
        }
    }
}

impl<'a> FromValue<'a> for Ref<'a> {
    fn from_value(value: &ValueRef<'a, '_>) -> Result<Self> {
        match value.column_type() {
            ColumnType::Ref => {
                let info = value.desc.referenced_type(value.conn)?;
                Ref::from_ref(value.conn, &info, unsafe { value.deref::<OCIRef>() })
            }
            _ => value.not_convertible("Ref"),
        }
    }
}

impl ToValue for Ref<'_> {
    fn to_value(&self, conn: &Connection, desc: &Column) -> Result<Value> {
        match desc.column_type() {
            ColumnType::Ref if desc.referenced_type(conn)?.full_name() == self.type_info().full_name() => {
                Ok( Value::Ptr(self.as_ptr() as *mut c_void) )
            }
            _ => wrong_type(desc, "Ref"),
        }
    }
}
