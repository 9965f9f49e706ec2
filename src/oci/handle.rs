//! OCI handles.

use crate::{Result, Error, err::LibError};
use super::*;
use libc::c_void;

pub trait HandleType : OCIStruct {
    fn get_type() -> u32;
}

macro_rules! impl_handle_type {
    ($($oci_handle:ident => $id:ident),+) => {
        $(
            impl HandleType for $oci_handle {
                fn get_type() -> u32 { $id }
            }
        )+
    };
}

impl_handle_type!{
    OCIEnv              => OCI_HTYPE_ENV,
    OCIError            => OCI_HTYPE_ERROR,
    OCISvcCtx           => OCI_HTYPE_SVCCTX,
    OCIStmt             => OCI_HTYPE_STMT,
    OCIDescribe         => OCI_HTYPE_DESCRIBE,
    OCIServer           => OCI_HTYPE_SERVER,
    OCISession          => OCI_HTYPE_SESSION,
    OCIAuthInfo         => OCI_HTYPE_AUTHINFO,
    OCITrans            => OCI_HTYPE_TRANS,
    OCICPool            => OCI_HTYPE_CPOOL,
    OCISPool            => OCI_HTYPE_SPOOL,
    OCIAdmin            => OCI_HTYPE_ADMIN,
    OCIDirPathCtx       => OCI_HTYPE_DIRPATH_CTX,
    OCIDirPathColArray  => OCI_HTYPE_DIRPATH_COLUMN_ARRAY,
    OCIDirPathStream    => OCI_HTYPE_DIRPATH_STREAM
}

/// Owned OCI handle. The handle is freed when dropped.
pub(crate) struct Handle<T: HandleType> (Ptr<T>);

impl<T: HandleType> Drop for Handle<T> {
    fn drop(&mut self) {
        let ptr = self.0.take();
        if !ptr.is_null() {
            unsafe {
                OCIHandleFree(ptr as *mut c_void, T::get_type());
            }
        }
    }
}

impl<T: HandleType> Handle<T> {
    /// Allocates a new handle in the environment.
    pub(crate) fn new(env: *mut OCIEnv) -> Result<Self> {
        let mut ptr = Ptr::<T>::null();
        handle_alloc(env, ptr.as_mut_ptr() as *mut *mut c_void, T::get_type())?;
        if ptr.is_null() {
            Err( Error::lib(LibError::Memory) )
        } else {
            Ok( Self(ptr) )
        }
    }

    /// Same as `new`, but allocates a child handle of another handle (e.g. a direct path
    /// column array of its context).
    pub(crate) fn new_child(parent: *mut c_void, env: *mut OCIEnv, err: *mut OCIError) -> Result<Self> {
        let mut ptr = Ptr::<T>::null();
        let res = unsafe { OCIHandleAlloc(parent as *mut OCIEnv, ptr.as_mut_ptr() as *mut *mut c_void, T::get_type(), 0, std::ptr::null()) };
        if res != OCI_SUCCESS {
            return Err( if err.is_null() { Error::env(env, res) } else { Error::oci(err, res) } );
        }
        Ok( Self(ptr) )
    }

    /// Takes ownership of a handle allocated by OCI itself (e.g. by OCIEnvNlsCreate).
    pub(crate) fn from(ptr: *mut T) -> Self {
        Self(Ptr::new(ptr))
    }

    /// An empty handle slot.
    pub(crate) fn null() -> Self {
        Self(Ptr::null())
    }

    pub(crate) fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub(crate) fn get(&self) -> *mut T {
        self.0.get()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut *mut T {
        self.0.as_mut_ptr()
    }

    /// Gives up ownership of the handle without freeing it.
    pub(crate) fn release(&mut self) -> *mut T {
        self.0.take()
    }

    /// Frees the handle now. Subsequent calls do nothing.
    pub(crate) fn free(&mut self) {
        let ptr = self.0.take();
        if !ptr.is_null() {
            unsafe {
                OCIHandleFree(ptr as *mut c_void, T::get_type());
            }
        }
    }

    pub(crate) fn get_attr<V: attr::AttrGet>(&self, attr_type: u32, err: *mut OCIError) -> Result<V> {
        attr::get::<V>(attr_type, T::get_type(), self.get() as *const c_void, err)
    }

    pub(crate) fn set_attr<V: attr::AttrSet>(&self, attr_type: u32, attr_val: V, err: *mut OCIError) -> Result<()> {
        attr::set::<V>(attr_type, attr_val, T::get_type(), self.get() as *mut c_void, err)
    }
}

/// Reads an attribute of a handle that is not owned by the caller.
pub(crate) fn get_attr<T: HandleType, V: attr::AttrGet>(handle: *mut T, attr_type: u32, err: *mut OCIError) -> Result<V> {
    attr::get::<V>(attr_type, T::get_type(), handle as *const c_void, err)
}

/// Sets an attribute of a handle that is not owned by the caller.
pub(crate) fn set_attr<T: HandleType, V: attr::AttrSet>(handle: *mut T, attr_type: u32, attr_val: V, err: *mut OCIError) -> Result<()> {
    attr::set::<V>(attr_type, attr_val, T::get_type(), handle as *mut c_void, err)
}
