//! Parameter descriptors of statements, describe handles and lists

use crate::Result;
use super::*;
use libc::c_void;

/// A parameter descriptor. These are owned by their parent and are never freed explicitly.
#[derive(Clone, Copy)]
pub(crate) struct Param {
    ptr: Ptr<OCIParam>,
}

impl Param {
    /// Returns the descriptor at the 1-based `pos` of the parent.
    pub(crate) fn get(parent: *const c_void, parent_type: u32, pos: u32, err: *mut OCIError) -> Result<Self> {
        let mut ptr = Ptr::<OCIParam>::null();
        param_get(parent, parent_type, err, ptr.as_mut_ptr() as *mut *mut c_void, pos)?;
        Ok( Self { ptr } )
    }

    pub(crate) fn from(ptr: *mut OCIParam) -> Self {
        Self { ptr: Ptr::new(ptr) }
    }

    pub(crate) fn get_ptr(&self) -> *mut OCIParam {
        self.ptr.get()
    }

    pub(crate) fn get_attr<V: attr::AttrGet>(&self, attr_type: u32, err: *mut OCIError) -> Result<V> {
        attr::get::<V>(attr_type, OCI_DTYPE_PARAM, self.ptr.get() as *const c_void, err)
    }

    /// Returns the list parameter stored in `attr_type` and its element at `pos`.
    pub(crate) fn list_item(&self, attr_type: u32, pos: u32, err: *mut OCIError) -> Result<Param> {
        let list : *mut OCIParam = self.get_attr(attr_type, err)?;
        Param::get(list as *const c_void, OCI_DTYPE_PARAM, pos, err)
    }
}
