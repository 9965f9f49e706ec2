//! OCI descriptors

use crate::{Result, Error, err::LibError};
use super::*;
use libc::c_void;

pub trait DescriptorType : OCIStruct {
    type OCIType : OCIStruct;
    fn get_type() -> u32;
}

macro_rules! impl_descr_type {
    ($($oci_desc:ident => $id:ident, $ret:ident),+) => {
        $(
            impl DescriptorType for $oci_desc {
                type OCIType = $ret;
                fn get_type() -> u32 { $id }
            }
        )+
    };
}

impl_descr_type!{
    OCICLobLocator          => OCI_DTYPE_LOB,               OCILobLocator,
    OCIBLobLocator          => OCI_DTYPE_LOB,               OCILobLocator,
    OCIBFileLocator         => OCI_DTYPE_FILE,              OCILobLocator,
    OCIRowid                => OCI_DTYPE_ROWID,             OCIRowid,
    OCIResult               => OCI_DTYPE_RSET,              OCIResult,
    OCITimestamp            => OCI_DTYPE_TIMESTAMP,         OCIDateTime,
    OCITimestampTZ          => OCI_DTYPE_TIMESTAMP_TZ,      OCIDateTime,
    OCITimestampLTZ         => OCI_DTYPE_TIMESTAMP_LTZ,     OCIDateTime,
    OCIIntervalYearToMonth  => OCI_DTYPE_INTERVAL_YM,       OCIInterval,
    OCIIntervalDayToSecond  => OCI_DTYPE_INTERVAL_DS,       OCIInterval,
    OCIAQEnqOptions         => OCI_DTYPE_AQENQ_OPTIONS,     OCIAQEnqOptions,
    OCIAQDeqOptions         => OCI_DTYPE_AQDEQ_OPTIONS,     OCIAQDeqOptions,
    OCIAQMsgProperties      => OCI_DTYPE_AQMSG_PROPERTIES,  OCIAQMsgProperties,
    OCIAQAgent              => OCI_DTYPE_AQAGENT,           OCIAQAgent
}

/// Owned OCI descriptor. The descriptor is freed when dropped.
pub(crate) struct Descriptor<T: DescriptorType> {
    ptr: Ptr<T::OCIType>,
}

impl<T: DescriptorType> Drop for Descriptor<T> {
    fn drop(&mut self) {
        let ptr = self.ptr.take();
        if !ptr.is_null() {
            unsafe {
                OCIDescriptorFree(ptr as *mut c_void, T::get_type());
            }
        }
    }
}

impl<T: DescriptorType> Descriptor<T> {
    pub(crate) fn new(env: *mut OCIEnv) -> Result<Self> {
        let mut ptr = Ptr::<T::OCIType>::null();
        descriptor_alloc(env, ptr.as_mut_ptr() as *mut *mut c_void, T::get_type())?;
        if ptr.is_null() {
            Err( Error::lib(LibError::Memory) )
        } else {
            Ok( Self { ptr } )
        }
    }

    /// Takes ownership of a descriptor allocated elsewhere.
    pub(crate) fn from(ptr: *mut T::OCIType) -> Self {
        Self { ptr: Ptr::new(ptr) }
    }

    pub(crate) fn get(&self) -> *mut T::OCIType {
        self.ptr.get()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut *mut T::OCIType {
        self.ptr.as_mut_ptr()
    }

    /// Gives up ownership of the descriptor without freeing it.
    pub(crate) fn release(&mut self) -> *mut T::OCIType {
        self.ptr.take()
    }

    pub(crate) fn get_attr<V: attr::AttrGet>(&self, attr_type: u32, err: *mut OCIError) -> Result<V> {
        attr::get::<V>(attr_type, T::get_type(), self.get() as *const c_void, err)
    }

    pub(crate) fn set_attr<V: attr::AttrSet>(&self, attr_type: u32, attr_val: V, err: *mut OCIError) -> Result<()> {
        attr::set::<V>(attr_type, attr_val, T::get_type(), self.get() as *mut c_void, err)
    }
}
