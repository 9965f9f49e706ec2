//! SQL statement arguments

use super::{bind::Params, cursor::Cursor};
use crate::{
    BFile, Collection, Date, Error, Number, Object, Ref, Result, RowID,
    err::LibError,
    lob::{InternalLob, LOB},
    oci::*,
    types::{interval::Interval, timestamp::Timestamp},
};
use libc::c_void;
use std::{mem::size_of, ptr};

/// Buffer size of OUT strings and byte vectors that were passed without capacity.
const DEFAULT_OUT_SIZE : usize = 32767;
/// Maximum length of a ROWID or a UROWID in its text form.
const ROWID_TEXT_SIZE : usize = 4000;

/**
    A trait for types that can be used as SQL arguments.

    Arguments are passed to `execute` and `query` either as a single value or as a tuple.
    Tuple elements are bound by position, unless an element is a `(name, value)` pair,
    which is bound to the named placeholder:

    ```no_run
    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    let mut stmt = conn.prepare("
        UPDATE hr.departments
           SET manager_id = :manager_id
         WHERE department_id = :department_id
    ")?;
    let num_updated = stmt.execute(((":DEPARTMENT_ID", 120), (":MANAGER_ID", 101)))?;
    assert_eq!(num_updated, 1);
    # conn.rollback()?;
    # Ok::<(),oracall::Error>(())
    ```

    `None` binds NULL, `&mut` references are OUT (or IN OUT) arguments, and slices
    are bound as arrays for array DML. A two element tuple is a `(name, value)` pair,
    thus two arguments are either passed as a tuple of two pairs or positionally as
    a tuple that ends with `()`.
*/
pub trait ToSql {
    /**
        Binds itself to the placeholder at index `pos`. Returns the index of the
        placeholder for the next argument.
    */
    #[doc(hidden)]
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize>;

    /// Reads the value returned by OUT arguments. Returns the index of the next argument.
    #[doc(hidden)]
    fn update_from_bind(&mut self, pos: usize, _params: &Params) -> Result<usize> {
        Ok(pos + 1)
    }

    /// SQL type that NULL values of this type are bound as.
    #[doc(hidden)]
    fn sql_null_type() -> u16 {
        SQLT_CHR
    }
}

/**
    A trait for types that can be used as OUT and IN OUT arguments. These are passed
    to the statement as `&mut` references.
*/
pub trait ToSqlOut {
    #[doc(hidden)]
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()>;

    #[doc(hidden)]
    fn update_out(&mut self, _pos: usize, _params: &Params) -> Result<()> {
        Ok(())
    }
}

fn as_bytes<T>(val: &T) -> &[u8] {
    unsafe { std::slice::from_raw_parts(val as *const T as *const u8, size_of::<T>()) }
}

fn read_value<T: Copy>(bytes: &[u8]) -> Option<T> {
    if bytes.len() < size_of::<T>() {
        None
    } else {
        Some( unsafe { ptr::read_unaligned(bytes.as_ptr() as *const T) } )
    }
}

impl ToSql for () {
    fn bind_to(&self, pos: usize, _params: &mut Params) -> Result<usize> {
        Ok(pos)
    }

    fn update_from_bind(&mut self, pos: usize, _params: &Params) -> Result<usize> {
        Ok(pos)
    }
}

impl<T: ToSql + ?Sized> ToSql for &T {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        (**self).bind_to(pos, params)
    }

    fn sql_null_type() -> u16 {
        T::sql_null_type()
    }
}

impl<T: ToSqlOut + ?Sized> ToSql for &mut T {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        (**self).bind_out(pos, params)?;
        Ok(pos + 1)
    }

    fn update_from_bind(&mut self, pos: usize, params: &Params) -> Result<usize> {
        (**self).update_out(pos, params)?;
        Ok(pos + 1)
    }
}

impl<T: ToSql> ToSql for Option<T> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        match self {
            Some(val) => val.bind_to(pos, params),
            None => {
                params.bind_null(pos, T::sql_null_type(), 0)?;
                Ok(pos + 1)
            }
        }
    }

    fn sql_null_type() -> u16 {
        T::sql_null_type()
    }
}

impl<T: ToSql> ToSql for (&str, T) {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        let idx = params.index_of(self.0)?;
        self.1.bind_to(idx, params)?;
        Ok(pos + 1)
    }

    fn update_from_bind(&mut self, pos: usize, params: &Params) -> Result<usize> {
        let idx = params.index_of(self.0)?;
        self.1.update_from_bind(idx, params)?;
        Ok(pos + 1)
    }
}

macro_rules! impl_num_args {
    ($($t:ty),+ => $sqlt:ident) => {
        $(
            impl ToSql for $t {
                fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
                    params.bind_value(pos, $sqlt, &self.to_ne_bytes(), size_of::<$t>())?;
                    Ok(pos + 1)
                }

                fn sql_null_type() -> u16 {
                    $sqlt
                }
            }

            impl ToSqlOut for $t {
                fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
                    params.bind_value(pos, $sqlt, &self.to_ne_bytes(), size_of::<$t>())
                }

                fn update_out(&mut self, pos: usize, params: &Params) -> Result<()> {
                    if let Some(val) = params.out_data(pos).and_then(read_value::<$t>) {
                        *self = val;
                    }
                    Ok(())
                }
            }

            impl ToSqlOut for Option<$t> {
                fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
                    match self {
                        Some(val) => params.bind_value(pos, $sqlt, &val.to_ne_bytes(), size_of::<$t>()),
                        None => params.bind_null(pos, $sqlt, size_of::<$t>()),
                    }
                }

                fn update_out(&mut self, pos: usize, params: &Params) -> Result<()> {
                    *self = params.out_data(pos).and_then(read_value::<$t>);
                    Ok(())
                }
            }
        )+
    };
}

impl_num_args!{ i8, i16, i32, i64, isize => SQLT_INT }
impl_num_args!{ u8, u16, u32, u64, usize => SQLT_UIN }
impl_num_args!{ f32 => SQLT_BFLOAT }
impl_num_args!{ f64 => SQLT_BDOUBLE }

impl ToSql for bool {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        let val = *self as i32;
        params.bind_value(pos, SQLT_INT, &val.to_ne_bytes(), size_of::<i32>())?;
        Ok(pos + 1)
    }

    fn sql_null_type() -> u16 {
        SQLT_INT
    }
}

impl ToSqlOut for bool {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        let val = *self as i32;
        params.bind_value(pos, SQLT_INT, &val.to_ne_bytes(), size_of::<i32>())
    }

    fn update_out(&mut self, pos: usize, params: &Params) -> Result<()> {
        if let Some(val) = params.out_data(pos).and_then(read_value::<i32>) {
            *self = val != 0;
        }
        Ok(())
    }
}

impl ToSql for str {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_value(pos, SQLT_CHR, self.as_bytes(), self.len())?;
        Ok(pos + 1)
    }
}

impl ToSql for String {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        self.as_str().bind_to(pos, params)
    }
}

fn out_capacity(len: usize, capacity: usize) -> usize {
    let size = len.max(capacity);
    if size == 0 { DEFAULT_OUT_SIZE } else { size }
}

fn text_from_bind(pos: usize, params: &Params) -> Result<Option<String>> {
    match params.out_data(pos) {
        Some(bytes) => String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|_| Error::lib(LibError::Conversion("VARCHAR2", "String"))),
        None => Ok(None),
    }
}

impl ToSqlOut for String {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_value(pos, SQLT_CHR, self.as_bytes(), out_capacity(self.len(), self.capacity()))
    }

    fn update_out(&mut self, pos: usize, params: &Params) -> Result<()> {
        self.clear();
        if let Some(text) = text_from_bind(pos, params)? {
            self.push_str(&text);
        }
        Ok(())
    }
}

impl ToSqlOut for Option<String> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        match self {
            Some(text) => params.bind_value(pos, SQLT_CHR, text.as_bytes(), out_capacity(text.len(), text.capacity())),
            None => params.bind_null(pos, SQLT_CHR, DEFAULT_OUT_SIZE),
        }
    }

    fn update_out(&mut self, pos: usize, params: &Params) -> Result<()> {
        *self = text_from_bind(pos, params)?;
        Ok(())
    }
}

impl ToSql for [u8] {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_value(pos, SQLT_LBI, self, self.len())?;
        Ok(pos + 1)
    }

    fn sql_null_type() -> u16 {
        SQLT_LBI
    }
}

impl ToSql for Vec<u8> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        self.as_slice().bind_to(pos, params)
    }

    fn sql_null_type() -> u16 {
        SQLT_LBI
    }
}

impl ToSqlOut for Vec<u8> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_value(pos, SQLT_LBI, self, out_capacity(self.len(), self.capacity()))
    }

    fn update_out(&mut self, pos: usize, params: &Params) -> Result<()> {
        self.clear();
        if let Some(bytes) = params.out_data(pos) {
            self.extend_from_slice(bytes);
        }
        Ok(())
    }
}

impl ToSqlOut for Option<Vec<u8>> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        match self {
            Some(bytes) => params.bind_value(pos, SQLT_LBI, bytes, out_capacity(bytes.len(), bytes.capacity())),
            None => params.bind_null(pos, SQLT_LBI, DEFAULT_OUT_SIZE),
        }
    }

    fn update_out(&mut self, pos: usize, params: &Params) -> Result<()> {
        *self = params.out_data(pos).map(|bytes| bytes.to_vec());
        Ok(())
    }
}

impl ToSql for Date<'_> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_value(pos, SQLT_ODT, as_bytes(self.as_oci()), size_of::<OCIDate>())?;
        Ok(pos + 1)
    }

    fn sql_null_type() -> u16 {
        SQLT_ODT
    }
}

impl ToSqlOut for Date<'_> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_value(pos, SQLT_ODT, as_bytes(self.as_oci()), size_of::<OCIDate>())
    }

    fn update_out(&mut self, pos: usize, params: &Params) -> Result<()> {
        if let Some(date) = params.out_data(pos).and_then(read_value::<OCIDate>) {
            *self.as_oci_mut() = date;
        }
        Ok(())
    }
}

impl ToSql for Number<'_> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_value(pos, SQLT_VNU, as_bytes(self.as_oci()), size_of::<OCINumber>())?;
        Ok(pos + 1)
    }

    fn sql_null_type() -> u16 {
        SQLT_VNU
    }
}

impl ToSqlOut for Number<'_> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_value(pos, SQLT_VNU, as_bytes(self.as_oci()), size_of::<OCINumber>())
    }

    fn update_out(&mut self, pos: usize, params: &Params) -> Result<()> {
        if let Some(num) = params.out_data(pos).and_then(read_value::<OCINumber>) {
            *self.as_oci_mut() = num;
        }
        Ok(())
    }
}

/// Maps a datetime or an interval descriptor type to its SQL type.
pub(crate) fn descriptor_sql_type(dtype: u32) -> u16 {
    match dtype {
        OCI_DTYPE_TIMESTAMP     => SQLT_TIMESTAMP,
        OCI_DTYPE_TIMESTAMP_TZ  => SQLT_TIMESTAMP_TZ,
        OCI_DTYPE_TIMESTAMP_LTZ => SQLT_TIMESTAMP_LTZ,
        OCI_DTYPE_INTERVAL_YM   => SQLT_INTERVAL_YM,
        OCI_DTYPE_INTERVAL_DS   => SQLT_INTERVAL_DS,
        _ => SQLT_CHR,
    }
}

impl<T> ToSql for Timestamp<'_, T> where T: DescriptorType<OCIType=OCIDateTime> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        self.bind_out(pos, params)?;
        Ok(pos + 1)
    }

    fn sql_null_type() -> u16 {
        descriptor_sql_type(T::get_type())
    }
}

impl<T> ToSqlOut for Timestamp<'_, T> where T: DescriptorType<OCIType=OCIDateTime> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_ptr(pos, descriptor_sql_type(T::get_type()), self.as_ptr() as *mut c_void, false)
    }
}

impl<T> ToSql for Interval<'_, T> where T: DescriptorType<OCIType=OCIInterval> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        self.bind_out(pos, params)?;
        Ok(pos + 1)
    }

    fn sql_null_type() -> u16 {
        descriptor_sql_type(T::get_type())
    }
}

impl<T> ToSqlOut for Interval<'_, T> where T: DescriptorType<OCIType=OCIInterval> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_ptr(pos, descriptor_sql_type(T::get_type()), self.as_ptr() as *mut c_void, false)
    }
}

impl ToSql for RowID {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        self.as_str().bind_to(pos, params)
    }
}

impl ToSqlOut for RowID {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_value(pos, SQLT_CHR, self.as_str().as_bytes(), ROWID_TEXT_SIZE)
    }

    fn update_out(&mut self, pos: usize, params: &Params) -> Result<()> {
        *self = RowID::new(text_from_bind(pos, params)?.unwrap_or_default());
        Ok(())
    }
}

impl<T: InternalLob> ToSql for LOB<'_, T> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        self.bind_out(pos, params)?;
        Ok(pos + 1)
    }

    fn sql_null_type() -> u16 {
        T::SQL_TYPE
    }
}

impl<T: InternalLob> ToSqlOut for LOB<'_, T> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_ptr(pos, T::SQL_TYPE, self.as_ptr() as *mut c_void, false)
    }
}

impl ToSql for BFile<'_> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        self.bind_out(pos, params)?;
        Ok(pos + 1)
    }

    fn sql_null_type() -> u16 {
        SQLT_BFILE
    }
}

impl ToSqlOut for BFile<'_> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_ptr(pos, SQLT_BFILE, self.as_ptr() as *mut c_void, false)
    }
}

impl ToSql for Object<'_> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        self.bind_out(pos, params)?;
        Ok(pos + 1)
    }
}

impl ToSqlOut for Object<'_> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_object(pos, SQLT_NTY, self.type_info().tdo(), self.instance(), self.null_struct())
    }
}

impl ToSql for Collection<'_> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        self.bind_out(pos, params)?;
        Ok(pos + 1)
    }
}

impl ToSqlOut for Collection<'_> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_object(pos, SQLT_NTY, self.type_info().tdo(), self.as_ptr() as *mut c_void, ptr::null_mut())
    }
}

/// A null REF is bound as a `Ref` that `is_null`.
impl ToSql for Ref<'_> {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        self.bind_out(pos, params)?;
        Ok(pos + 1)
    }
}

impl ToSqlOut for Ref<'_> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_object(pos, SQLT_REF, self.type_info().tdo(), self.as_ptr() as *mut c_void, ptr::null_mut())
    }
}

impl ToSqlOut for Cursor<'_> {
    fn bind_out(&self, pos: usize, params: &mut Params) -> Result<()> {
        params.bind_ptr(pos, SQLT_RSET, self.stmt_ptr() as *mut c_void, false)
    }

    fn update_out(&mut self, _pos: usize, _params: &Params) -> Result<()> {
        self.set_executed();
        Ok(())
    }
}

/// Element of an array that is bound for array DML.
trait ArrayItem {
    const SQL_TYPE : u16;
    fn size(&self) -> usize;
    fn data(&self) -> Option<&[u8]>;
}

macro_rules! impl_num_array_item {
    ($($t:ty),+ => $sqlt:ident) => {
        $(
            impl ArrayItem for $t {
                const SQL_TYPE : u16 = $sqlt;
                fn size(&self) -> usize { size_of::<$t>() }
                fn data(&self) -> Option<&[u8]> { Some(as_bytes(self)) }
            }
        )+
    };
}

impl_num_array_item!{ i8, i16, i32, i64, isize => SQLT_INT }
impl_num_array_item!{ u16, u32, u64, usize => SQLT_UIN }
impl_num_array_item!{ f32 => SQLT_BFLOAT }
impl_num_array_item!{ f64 => SQLT_BDOUBLE }

impl ArrayItem for &str {
    const SQL_TYPE : u16 = SQLT_CHR;
    fn size(&self) -> usize { self.len() }
    fn data(&self) -> Option<&[u8]> { Some(self.as_bytes()) }
}

impl ArrayItem for String {
    const SQL_TYPE : u16 = SQLT_CHR;
    fn size(&self) -> usize { self.len() }
    fn data(&self) -> Option<&[u8]> { Some(self.as_bytes()) }
}

impl ArrayItem for Vec<u8> {
    const SQL_TYPE : u16 = SQLT_LBI;
    fn size(&self) -> usize { self.len() }
    fn data(&self) -> Option<&[u8]> { Some(self.as_slice()) }
}

impl ArrayItem for &[u8] {
    const SQL_TYPE : u16 = SQLT_LBI;
    fn size(&self) -> usize { self.len() }
    fn data(&self) -> Option<&[u8]> { Some(self) }
}

impl ArrayItem for Date<'_> {
    const SQL_TYPE : u16 = SQLT_ODT;
    fn size(&self) -> usize { size_of::<OCIDate>() }
    fn data(&self) -> Option<&[u8]> { Some(as_bytes(self.as_oci())) }
}

impl ArrayItem for Number<'_> {
    const SQL_TYPE : u16 = SQLT_VNU;
    fn size(&self) -> usize { size_of::<OCINumber>() }
    fn data(&self) -> Option<&[u8]> { Some(as_bytes(self.as_oci())) }
}

impl<T: ArrayItem> ArrayItem for Option<T> {
    const SQL_TYPE : u16 = T::SQL_TYPE;
    fn size(&self) -> usize { self.as_ref().map(ArrayItem::size).unwrap_or(0) }
    fn data(&self) -> Option<&[u8]> { self.as_ref().and_then(ArrayItem::data) }
}

fn bind_array<T: ArrayItem>(items: &[T], pos: usize, params: &mut Params) -> Result<usize> {
    let elem_size = items.iter().map(ArrayItem::size).max().unwrap_or(0).max(1);
    params.bind_array(pos, T::SQL_TYPE, elem_size, items.iter().map(ArrayItem::data))?;
    Ok(pos + 1)
}

macro_rules! impl_array_args {
    ($($t:ty),+) => {
        $(
            impl ToSql for [$t] {
                fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
                    bind_array(self, pos, params)
                }
            }

            impl ToSql for Vec<$t> {
                fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
                    bind_array(self.as_slice(), pos, params)
                }
            }

            impl ToSql for [Option<$t>] {
                fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
                    bind_array(self, pos, params)
                }
            }

            impl ToSql for Vec<Option<$t>> {
                fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
                    bind_array(self.as_slice(), pos, params)
                }
            }
        )+
    };
}

impl_array_args!{ i8, i16, i32, i64, isize, u16, u32, u64, usize, f32, f64, &str, String, Vec<u8>, &[u8] }

macro_rules! impl_array_args_with_lifetime {
    ($($t:ident),+) => {
        $(
            impl ToSql for [$t<'_>] {
                fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
                    bind_array(self, pos, params)
                }
            }

            impl ToSql for Vec<$t<'_>> {
                fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
                    bind_array(self.as_slice(), pos, params)
                }
            }

            impl ToSql for [Option<$t<'_>>] {
                fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
                    bind_array(self, pos, params)
                }
            }
        )+
    };
}

impl_array_args_with_lifetime!{ Date, Number }

macro_rules! impl_tuple_args {
    ($($t:ident),+) => {
        impl<$($t),+> ToSql for ($($t,)+) where $($t: ToSql),+ {
            #[allow(non_snake_case)]
            fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
                let ($(ref $t,)+) = *self;
                $(
                    let pos = $t.bind_to(pos, params)?;
                )+
                Ok(pos)
            }

            #[allow(non_snake_case)]
            fn update_from_bind(&mut self, pos: usize, params: &Params) -> Result<usize> {
                let ($(ref mut $t,)+) = *self;
                $(
                    let pos = $t.update_from_bind(pos, params)?;
                )+
                Ok(pos)
            }
        }
    };
}

impl_tuple_args!{ A }
impl_tuple_args!{ A, B, C }
impl_tuple_args!{ A, B, C, D }
impl_tuple_args!{ A, B, C, D, E }
impl_tuple_args!{ A, B, C, D, E, F }
impl_tuple_args!{ A, B, C, D, E, F, G }
impl_tuple_args!{ A, B, C, D, E, F, G, H }
impl_tuple_args!{ A, B, C, D, E, F, G, H, I }
impl_tuple_args!{ A, B, C, D, E, F, G, H, I, J }
impl_tuple_args!{ A, B, C, D, E, F, G, H, I, J, K }
impl_tuple_args!{ A, B, C, D, E, F, G, H, I, J, K, L }
impl_tuple_args!{ A, B, C, D, E, F, G, H, I, J, K, L, M }
impl_tuple_args!{ A, B, C, D, E, F, G, H, I, J, K, L, M, N }
impl_tuple_args!{ A, B, C, D, E, F, G, H, I, J, K, L, M, N, O }
impl_tuple_args!{ A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P }

impl<A: ToSql, B: ToSql> ToSql for ((&str, A), (&str, B)) {
    fn bind_to(&self, pos: usize, params: &mut Params) -> Result<usize> {
        let pos = self.0.bind_to(pos, params)?;
        self.1.bind_to(pos, params)
    }

    fn update_from_bind(&mut self, pos: usize, params: &Params) -> Result<usize> {
        let pos = self.0.update_from_bind(pos, params)?;
        self.1.update_from_bind(pos, params)
    }
}
