//! References to row objects

use super::Object;
use crate::{Connection, Error, Result, env::Env, err::LibError, oci::*, typeinfo::TypeInfo};
use libc::c_void;
use std::{fmt, ptr, sync::Arc};

/**
    Reference (REF) to a row object of an object table.

    REFs read from columns, attributes or collection elements are independent copies.
    The referenced object is pinned only while `object` copies it.

    # Example

    ```no_run
    use oracall::{Object, Ref};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    conn.execute_immediate("CREATE OR REPLACE TYPE hr.dept_t AS OBJECT (id NUMBER, name VARCHAR2(30))", ())?;
    conn.execute_immediate("CREATE TABLE hr.depts OF hr.dept_t", ())?;
    conn.execute_immediate("INSERT INTO hr.depts VALUES (hr.dept_t(10, 'Administration'))", ())?;

    let mut stmt = conn.prepare("SELECT REF(d) FROM hr.depts d WHERE d.id = :id")?;
    let mut rows = stmt.query(10)?;
    let row = rows.next()?.expect("a row");
    let dept : Ref = row.get(0)?.expect("REF");
    assert!(!dept.is_null());

    let obj : Object = dept.object()?.expect("referenced object");
    let name : Option<String> = obj.get("name")?;
    assert_eq!(name.as_deref(), Some("Administration"));
    # conn.rollback()?;
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct Ref<'a> {
    conn: &'a Connection<'a>,
    info: Arc<TypeInfo>,
    oref: *mut OCIRef,
}

impl Drop for Ref<'_> {
    fn drop(&mut self) {
        if self.oref.is_null() {
            return;
        }
        let res = unsafe { OCIObjectFree(self.conn.env_ptr(), self.conn.err_ptr(), self.oref as *mut c_void, OCI_OBJECTFREE_FORCE) };
        if res != OCI_SUCCESS {
            log::debug!("cannot free REF {}: {}", self.info.full_name(), Error::oci(self.conn.err_ptr(), res));
        }
    }
}

impl fmt::Debug for Ref<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ref({})", self.info.full_name())
    }
}

impl<'a> Ref<'a> {
    /// Creates a null reference to objects of the type `info` describes.
    pub fn new(conn: &'a Connection<'a>, info: &Arc<TypeInfo>) -> Result<Self> {
        if info.is_collection() {
            return Err( Error::lib(LibError::TypeInfoDatatype(info.full_name(), "object type")) );
        }
        info.check_type("object type")?;
        let mut oref = ptr::null_mut::<c_void>();
        catch!{conn.err_ptr() =>
            OCIObjectNew(
                conn.env_ptr(), conn.err_ptr(), conn.svc_ptr(),
                OCI_TYPECODE_REF, ptr::null_mut(), ptr::null_mut(),
                OCI_DURATION_SESSION, 0, &mut oref
            )
        }
        Ok( Self { conn, info: Arc::clone(info), oref: oref as *mut OCIRef } )
    }

    /// Makes an owned copy of a REF that lives in a fetch buffer or in an object.
    pub(crate) fn from_ref(conn: &'a Connection<'a>, info: &Arc<TypeInfo>, src: *const OCIRef) -> Result<Self> {
        let mut oref = Self::new(conn, info)?;
        catch!{conn.err_ptr() =>
            OCIRefAssign(conn.env_ptr(), conn.err_ptr(), src, &mut oref.oref)
        }
        Ok(oref)
    }

    pub(crate) fn as_ptr(&self) -> *mut OCIRef {
        self.oref
    }

    /// Returns the description of the referenced object type.
    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.info
    }

    pub fn is_null(&self) -> bool {
        unsafe { OCIRefIsNull(self.conn.env_ptr(), self.oref) != 0 }
    }

    /// Makes the REF null.
    pub fn set_null(&mut self) {
        unsafe { OCIRefClear(self.conn.env_ptr(), self.oref) }
    }

    /// Makes this REF point to the object `other` references.
    pub fn assign(&mut self, other: &Ref) -> Result<()> {
        if self.info.full_name() != other.info.full_name() {
            return Err( Error::lib(LibError::NotCompatible(other.info.full_name(), self.info.full_name())) );
        }
        catch!{self.conn.err_ptr() =>
            OCIRefAssign(self.conn.env_ptr(), self.conn.err_ptr(), other.oref, &mut self.oref)
        }
        Ok(())
    }

    /**
        Returns a copy of the referenced object, or `None` if the REF is null.
        The object is pinned in the client object cache for the duration of the copy.
    */
    pub fn object(&self) -> Result<Option<Object<'a>>> {
        if self.is_null() {
            return Ok(None);
        }
        let env = self.conn.env_ptr();
        let err = self.conn.err_ptr();
        let mut instance = ptr::null_mut::<c_void>();
        catch!{err =>
            OCIObjectPin(env, err, self.oref, ptr::null_mut(), OCI_PIN_ANY, OCI_DURATION_SESSION, OCI_LOCK_NONE, &mut instance)
        }
        let copy = (|| {
            let mut ind = ptr::null_mut::<c_void>();
            catch!{err =>
                OCIObjectGetInd(env, err, instance, &mut ind)
            }
            Object::from_instance(self.conn, &self.info, instance, ind)
        })();
        let res = unsafe { OCIObjectUnpin(env, err, instance) };
        let obj = copy?;
        crate::err::check(res, err)?;
        Ok(Some(obj))
    }

    /// Returns the hexadecimal form of the REF, an empty string when it is null.
    pub fn to_hex(&self) -> Result<String> {
        if self.is_null() {
            return Ok(String::new());
        }
        let size = unsafe { OCIRefHexSize(self.conn.env_ptr(), self.oref) };
        let mut buf = vec![0u8; size as usize];
        let mut len = size;
        catch!{self.conn.err_ptr() =>
            OCIRefToHex(self.conn.env_ptr(), self.conn.err_ptr(), self.oref, buf.as_mut_ptr(), &mut len)
        }
        Ok( crate::types::text_from(&buf, len as usize) )
    }
}
