//! Send-able pointers to OCI handles and descriptors

use std::ptr;
use super::OCIStruct;

/// Send-able wrapper around a pointer to an OCI handle or descriptor.
///
/// OCI handles are thread safe when the environment is created in threaded
/// mode, which is the default.
pub(crate) struct Ptr<T: OCIStruct> {
    value: *mut T
}

impl<T: OCIStruct> Ptr<T> {
    pub(crate) fn new(ptr: *mut T) -> Self {
        Self { value: ptr }
    }

    pub(crate) fn null() -> Self {
        Self { value: ptr::null_mut() }
    }

    pub(crate) fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.value, &mut other.value);
    }

    /// Leaves null in place of the pointer and returns it.
    pub(crate) fn take(&mut self) -> *mut T {
        std::mem::replace(&mut self.value, ptr::null_mut())
    }

    pub(crate) fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub(crate) fn get(&self) -> *mut T {
        self.value
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut *mut T {
        &mut self.value as *mut *mut T
    }
}

impl<T: OCIStruct> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self { value: self.value }
    }
}

impl<T: OCIStruct> Copy for Ptr<T> {}

impl<T: OCIStruct> Default for Ptr<T> {
    fn default() -> Self {
        Self::null()
    }
}

unsafe impl<T: OCIStruct> Send for Ptr<T> {}
unsafe impl<T: OCIStruct> Sync for Ptr<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oci::OCIStmt;

    #[test]
    fn take_leaves_null() {
        let mut raw = 0u8;
        let mut p = Ptr::new(&mut raw as *mut u8 as *mut OCIStmt);
        assert!(!p.is_null());
        let taken = p.take();
        assert!(p.is_null());
        assert!(!taken.is_null());
    }

    #[test]
    fn swap_exchanges_values() {
        let mut raw = 0u8;
        let mut a = Ptr::new(&mut raw as *mut u8 as *mut OCIStmt);
        let mut b = Ptr::<OCIStmt>::null();
        a.swap(&mut b);
        assert!(a.is_null());
        assert!(!b.is_null());
    }
}
