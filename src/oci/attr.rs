//! Typed access to handle and descriptor attributes

use crate::Result;
use super::*;
use libc::c_void;
use std::mem;

pub(crate) trait AttrGet {
    type ValueType;
    fn new(val: Self::ValueType, len: usize) -> Self;
}

pub(crate) trait AttrSet {
    fn as_ptr(&self) -> *const c_void;
    fn len(&self) -> usize { 0 }
}

pub(crate) fn get<A: AttrGet>(attr_type: u32, obj_type: u32, obj: *const c_void, err: *mut OCIError) -> Result<A> {
    let mut attr_val  = mem::MaybeUninit::<A::ValueType>::zeroed();
    let mut attr_size = 0u32;
    attr_get(obj, obj_type, attr_val.as_mut_ptr() as _, &mut attr_size, attr_type, err)?;
    Ok( AttrGet::new( unsafe { attr_val.assume_init() }, attr_size as usize) )
}

pub(crate) fn set<A: AttrSet>(attr_type: u32, attr_val: A, obj_type: u32, obj: *mut c_void, err: *mut OCIError) -> Result<()> {
    attr_set(obj, obj_type, attr_val.as_ptr(), attr_val.len() as u32, attr_type, err)
}

macro_rules! impl_int_attr {
    ($($t:ty),+) => {
        $(
            impl AttrGet for $t {
                type ValueType = $t;
                fn new(val: $t, _len: usize) -> Self {
                    val
                }
            }
            impl AttrSet for $t {
                fn as_ptr(&self) -> *const c_void {
                    self as *const $t as _
                }
            }
        )+
    };
}

impl_int_attr!{ u8, i8, u16, i16, u32, i32, u64 }

impl<T: OCIStruct> AttrGet for *mut T {
    type ValueType = *mut T;
    fn new(val: *mut T, _len: usize) -> Self {
        val
    }
}

/// Handle-valued attributes are passed by pointer value.
impl<T: OCIStruct> AttrSet for *mut T {
    fn as_ptr(&self) -> *const c_void {
        *self as *const c_void
    }
}

impl AttrGet for OCIDate {
    type ValueType = OCIDate;
    fn new(val: OCIDate, _len: usize) -> Self {
        val
    }
}

/// Text attributes are returned as pointers into OCI-owned memory, which
/// are only valid until the next call that changes them, thus they are copied.
impl AttrGet for String {
    type ValueType = *const u8;
    fn new(ptr: *const u8, len: usize) -> Self {
        if ptr.is_null() || len == 0 {
            String::new()
        } else {
            let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

impl AttrSet for &str {
    fn as_ptr(&self) -> *const c_void {
        (*self).as_ptr() as _
    }
    fn len(&self) -> usize {
        (*self).len()
    }
}

impl AttrSet for &[u8] {
    fn as_ptr(&self) -> *const c_void {
        (*self).as_ptr() as _
    }
    fn len(&self) -> usize {
        (*self).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_attributes_are_copied() {
        let text = b"SCOTT";
        let s = <String as AttrGet>::new(text.as_ptr(), text.len());
        assert_eq!(s, "SCOTT");
        let s = <String as AttrGet>::new(std::ptr::null(), 10);
        assert_eq!(s, "");
    }

    #[test]
    fn str_attributes_report_length() {
        let val = "oracall";
        assert_eq!(AttrSet::len(&val), 7);
        assert_eq!(AttrSet::len(&42u32), 0);
    }
}
