//! Instances of named object types

mod reference;
mod value;

pub use reference::Ref;
pub use value::{FromValue, ToValue};
pub(crate) use value::{Value, ValueRef, current_value};

use crate::{Connection, Error, Result, column::Column, env::Env, err::LibError, oci::*, typeinfo::TypeInfo};
use libc::c_void;
use std::{fmt, ptr, sync::Arc};

/**
    Instance of an Oracle object type.

    Objects created by `new` or read from a column, an attribute or a collection element
    are independent copies that are freed when dropped.

    # Example

    ```no_run
    use oracall::{Object, TypeInfoKind};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    conn.execute_immediate("
        CREATE OR REPLACE TYPE hr.location_t AS OBJECT (
            street  VARCHAR2(40),
            city    VARCHAR2(30),
            zip     NUMBER(5)
        )
    ", ())?;
    let info = conn.describe_type("hr.location_t", TypeInfoKind::Type)?;
    let mut loc = Object::new(&conn, &info)?;
    loc.set("street", "2004 Charade Rd")?;
    loc.set("city", "Seattle")?;
    assert!(loc.is_null("zip")?);
    loc.set("zip", &98199)?;

    let city : Option<String> = loc.get("city")?;
    assert_eq!(city.as_deref(), Some("Seattle"));
    let zip : Option<u32> = loc.get("zip")?;
    assert_eq!(zip, Some(98199));
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct Object<'a> {
    conn: &'a Connection<'a>,
    info: Arc<TypeInfo>,
    instance: *mut c_void,
    ind: *mut c_void,
}

impl Drop for Object<'_> {
    fn drop(&mut self) {
        if self.instance.is_null() {
            return;
        }
        let res = unsafe { OCIObjectFree(self.conn.env_ptr(), self.conn.err_ptr(), self.instance, OCI_OBJECTFREE_FORCE) };
        if res != OCI_SUCCESS {
            log::debug!("cannot free {} instance: {}", self.info.full_name(), Error::oci(self.conn.err_ptr(), res));
        }
    }
}

impl fmt::Debug for Object<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Object({})", self.info.full_name())
    }
}

/// Attribute of an object instance as `OCIObjectGetAttr` reports it.
struct Attr<'b> {
    desc: &'b Column,
    null_status: OCIInd,
    null_struct: *mut c_void,
    value: *mut c_void,
}

impl<'a> Object<'a> {
    /// Creates a new instance of the object type `info` describes. All attributes are null.
    pub fn new(conn: &'a Connection<'a>, info: &Arc<TypeInfo>) -> Result<Self> {
        if info.is_collection() {
            return Err( Error::lib(LibError::TypeInfoDatatype(info.full_name(), "object type")) );
        }
        let tdo = info.check_type("object type")?;
        let mut instance = ptr::null_mut::<c_void>();
        catch!{conn.err_ptr() =>
            OCIObjectNew(
                conn.env_ptr(), conn.err_ptr(), conn.svc_ptr(),
                OCI_TYPECODE_OBJECT, tdo, ptr::null_mut(),
                OCI_DURATION_SESSION, 1, &mut instance
            )
        }
        let mut obj = Self { conn, info: Arc::clone(info), instance, ind: ptr::null_mut() };
        catch!{conn.err_ptr() =>
            OCIObjectGetInd(conn.env_ptr(), conn.err_ptr(), obj.instance, &mut obj.ind)
        }
        // the instance itself is not null, its attributes are
        if !obj.ind.is_null() {
            unsafe { *(obj.ind as *mut OCIInd) = OCI_IND_NOTNULL; }
        }
        Ok(obj)
    }

    /// Makes an owned copy of an instance that lives in a fetch buffer or in another object.
    pub(crate) fn from_instance(conn: &'a Connection<'a>, info: &Arc<TypeInfo>, src: *mut c_void, src_ind: *mut c_void) -> Result<Self> {
        let obj = Self::new(conn, info)?;
        catch!{conn.err_ptr() =>
            OCIObjectCopy(
                conn.env_ptr(), conn.err_ptr(), conn.svc_ptr(),
                src, src_ind, obj.instance, obj.ind,
                obj.info.tdo(), OCI_DURATION_SESSION, 0
            )
        }
        Ok(obj)
    }

    pub(crate) fn instance(&self) -> *mut c_void {
        self.instance
    }

    pub(crate) fn null_struct(&self) -> *mut c_void {
        self.ind
    }

    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.info
    }

    fn attr(&self, name: &str) -> Result<Attr<'_>> {
        let desc = self.info.column_by_name(name)?;
        let names = [desc.name().as_ptr()];
        let lens = [desc.name().len() as u32];
        let mut null_status = OCI_IND_NULL;
        let mut null_struct = ptr::null_mut::<c_void>();
        let mut value = ptr::null_mut::<c_void>();
        let mut attr_tdo = ptr::null_mut::<OCIType>();
        catch!{self.conn.err_ptr() =>
            OCIObjectGetAttr(
                self.conn.env_ptr(), self.conn.err_ptr(),
                self.instance, self.ind, self.info.tdo(),
                names.as_ptr(), lens.as_ptr(), 1, ptr::null(), 0,
                &mut null_status, &mut null_struct, &mut value, &mut attr_tdo
            )
        }
        Ok( Attr { desc, null_status, null_struct, value } )
    }

    fn set_attr(&self, desc: &Column, null_status: OCIInd, null_struct: *const c_void, value: *const c_void) -> Result<()> {
        let names = [desc.name().as_ptr()];
        let lens = [desc.name().len() as u32];
        catch!{self.conn.err_ptr() =>
            OCIObjectSetAttr(
                self.conn.env_ptr(), self.conn.err_ptr(),
                self.instance, self.ind, self.info.tdo(),
                names.as_ptr(), lens.as_ptr(), 1, ptr::null(), 0,
                null_status, null_struct, value
            )
        }
        Ok(())
    }

    /// Returns `true` if the attribute is null. Attribute names are case-insensitive.
    pub fn is_null(&self, name: &str) -> Result<bool> {
        let attr = self.attr(name)?;
        Ok( attr.null_status == OCI_IND_NULL )
    }

    pub fn set_null(&mut self, name: &str) -> Result<()> {
        let attr = self.attr(name)?;
        let value = current_value(attr.desc, attr.value);
        self.set_attr(attr.desc, OCI_IND_NULL, attr.null_struct, value)
    }

    /**
        Returns the value of an attribute, or `None` if it is null.

        Numbers can be read as integers, floats, [`Number`](crate::Number) or `String`.
        LOB attributes are returned as new locators of the same LOB.
    */
    pub fn get<T: FromValue<'a>>(&self, name: &str) -> Result<Option<T>> {
        let attr = self.attr(name)?;
        if attr.null_status == OCI_IND_NULL {
            return Ok(None);
        }
        let value = ValueRef { conn: self.conn, desc: attr.desc, value: attr.value, ind: attr.null_struct };
        T::from_value(&value).map(Some)
    }

    /// Sets the value of an attribute. LOB attributes cannot be set.
    pub fn set<T: ToValue + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        let desc = self.info.column_by_name(name)?;
        let value = value.to_value(self.conn, desc)?;
        self.set_attr(desc, OCI_IND_NOTNULL, value.null_struct(), value.as_ptr())
    }
}
