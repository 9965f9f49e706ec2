//! VARRAYs, nested tables and PL/SQL index-by tables

use crate::{
    Connection, Error, Result,
    column::Column,
    env::Env,
    err::LibError,
    object::{FromValue, ToValue, ValueRef, current_value},
    oci::*,
    typeinfo::{CollectionKind, TypeInfo},
};
use libc::c_void;
use std::{fmt, marker::PhantomData, ptr, sync::Arc};

/**
    Instance of a collection type. Element indexes are 0-based.

    # Example

    ```no_run
    use oracall::{Collection, CollectionKind, TypeInfoKind};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    conn.execute_immediate("CREATE OR REPLACE TYPE hr.phone_list AS VARRAY(5) OF VARCHAR2(20)", ())?;
    let info = conn.describe_type("hr.phone_list", TypeInfoKind::Type)?;
    let mut phones = Collection::new(&conn, &info)?;
    assert_eq!(phones.kind(), CollectionKind::Varray);
    assert_eq!(phones.max(), 5);

    phones.append("515.123.4567")?;
    phones.append("515.123.4568")?;
    assert_eq!(phones.size()?, 2);

    let phone : Option<String> = phones.get(1)?;
    assert_eq!(phone.as_deref(), Some("515.123.4568"));

    phones.trim(1)?;
    assert_eq!(phones.size()?, 1);
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct Collection<'a> {
    conn: &'a Connection<'a>,
    info: Arc<TypeInfo>,
    coll: *mut OCIColl,
}

impl Drop for Collection<'_> {
    fn drop(&mut self) {
        if self.coll.is_null() {
            return;
        }
        let res = unsafe { OCIObjectFree(self.conn.env_ptr(), self.conn.err_ptr(), self.coll as *mut c_void, OCI_OBJECTFREE_FORCE) };
        if res != OCI_SUCCESS {
            log::debug!("cannot free {} instance: {}", self.info.full_name(), Error::oci(self.conn.err_ptr(), res));
        }
    }
}

impl fmt::Debug for Collection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Collection({})", self.info.full_name())
    }
}

impl<'a> Collection<'a> {
    /// Creates an empty collection of the type `info` describes.
    pub fn new(conn: &'a Connection<'a>, info: &Arc<TypeInfo>) -> Result<Self> {
        let kind = info.collection_kind()
            .ok_or_else(|| Error::lib(LibError::TypeInfoDatatype(info.full_name(), "collection type")))?;
        let tdo = info.check_type("collection type")?;
        let typecode = match kind {
            CollectionKind::Varray => OCI_TYPECODE_VARRAY,
            CollectionKind::NestedTable | CollectionKind::IndexedTable => OCI_TYPECODE_TABLE,
        };
        let mut coll = ptr::null_mut::<c_void>();
        catch!{conn.err_ptr() =>
            OCIObjectNew(
                conn.env_ptr(), conn.err_ptr(), conn.svc_ptr(),
                typecode, tdo, ptr::null_mut(),
                OCI_DURATION_SESSION, 1, &mut coll
            )
        }
        Ok( Self { conn, info: Arc::clone(info), coll: coll as *mut OCIColl } )
    }

    /// Makes an owned copy of a collection that lives in a fetch buffer or in an object.
    pub(crate) fn from_coll(conn: &'a Connection<'a>, info: &Arc<TypeInfo>, src: *const OCIColl) -> Result<Self> {
        let coll = Self::new(conn, info)?;
        catch!{conn.err_ptr() =>
            OCICollAssign(conn.env_ptr(), conn.err_ptr(), src, coll.coll)
        }
        Ok(coll)
    }

    pub(crate) fn as_ptr(&self) -> *mut OCIColl {
        self.coll
    }

    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.info
    }

    pub fn kind(&self) -> CollectionKind {
        self.info.collection_kind().unwrap_or(CollectionKind::NestedTable)
    }

    fn element(&self) -> Result<&Column> {
        self.info.element()
            .ok_or_else(|| Error::lib(LibError::TypeInfoDatatype(self.info.full_name(), "collection type")))
    }

    /// Returns the maximum number of elements of a VARRAY, 0 for unbounded collections.
    pub fn max(&self) -> usize {
        let max = unsafe { OCICollMax(self.conn.env_ptr(), self.coll) };
        max.max(0) as usize
    }

    /// Returns the number of elements, including deleted elements of a nested table.
    pub fn size(&self) -> Result<usize> {
        let mut size = 0i32;
        catch!{self.conn.err_ptr() =>
            OCICollSize(self.conn.env_ptr(), self.conn.err_ptr(), self.coll, &mut size)
        }
        Ok( size.max(0) as usize )
    }

    /// Returns the number of elements. Deleted elements of nested tables are not counted.
    pub fn count(&self) -> Result<usize> {
        if self.kind() == CollectionKind::Varray {
            return self.size();
        }
        let mut size = 0i32;
        catch!{self.conn.err_ptr() =>
            OCITableSize(self.conn.env_ptr(), self.conn.err_ptr(), self.coll, &mut size)
        }
        Ok( size.max(0) as usize )
    }

    /// Removes `num` elements from the end of the collection.
    pub fn trim(&mut self, num: usize) -> Result<()> {
        let size = self.size()?;
        if num > size {
            return Err( Error::lib(LibError::OutOfBounds(num)) );
        }
        catch!{self.conn.err_ptr() =>
            OCICollTrim(self.conn.env_ptr(), self.conn.err_ptr(), num as i32, self.coll)
        }
        Ok(())
    }

    /// Removes all elements.
    pub fn clear(&mut self) -> Result<()> {
        let size = self.size()?;
        if size > 0 {
            self.trim(size)?;
        }
        Ok(())
    }

    /// Appends an element. Fails when a VARRAY is full.
    pub fn append<T: ToValue + ?Sized>(&mut self, value: &T) -> Result<()> {
        let max = self.max();
        if max > 0 && self.size()? >= max {
            return Err( Error::lib(LibError::OutOfBounds(max)) );
        }
        let desc = self.element()?;
        let value = value.to_value(self.conn, desc)?;
        catch!{self.conn.err_ptr() =>
            OCICollAppend(self.conn.env_ptr(), self.conn.err_ptr(), value.as_ptr(), value.ind_ptr(), self.coll)
        }
        Ok(())
    }

    fn item(&self, index: usize) -> Result<Option<(*mut c_void, *mut c_void)>> {
        let mut exists = 0u8;
        let mut elem = ptr::null_mut::<c_void>();
        let mut ind = ptr::null_mut::<c_void>();
        catch!{self.conn.err_ptr() =>
            OCICollGetItem(self.conn.env_ptr(), self.conn.err_ptr(), self.coll, index as i32, &mut exists, &mut elem, &mut ind)
        }
        if exists == 0 || elem.is_null() {
            Ok(None)
        } else {
            Ok(Some((elem, ind)))
        }
    }

    /// Returns `true` if the element at `index` exists, i.e. it is in range and it was not deleted.
    pub fn exists(&self, index: usize) -> Result<bool> {
        if self.kind() == CollectionKind::Varray {
            return Ok( index < self.size()? );
        }
        let mut exists = 0u8;
        catch!{self.conn.err_ptr() =>
            OCITableExists(self.conn.env_ptr(), self.conn.err_ptr(), self.coll, index as i32, &mut exists)
        }
        Ok( exists != 0 )
    }

    /// Returns the element at `index`, or `None` if the element is null or does not exist.
    pub fn get<T: FromValue<'a>>(&self, index: usize) -> Result<Option<T>> {
        let (elem, ind) = match self.item(index)? {
            Some(item) => item,
            None => return Ok(None),
        };
        if !ind.is_null() && unsafe { *(ind as *const OCIInd) } == OCI_IND_NULL {
            return Ok(None);
        }
        let desc = self.element()?;
        let value = ValueRef { conn: self.conn, desc, value: elem, ind };
        T::from_value(&value).map(Some)
    }

    /// Replaces the element at `index`.
    pub fn set<T: ToValue + ?Sized>(&mut self, index: usize, value: &T) -> Result<()> {
        let size = self.size()?;
        if index >= size {
            return Err( Error::lib(LibError::OutOfBounds(index)) );
        }
        let desc = self.element()?;
        let value = value.to_value(self.conn, desc)?;
        catch!{self.conn.err_ptr() =>
            OCICollAssignElem(self.conn.env_ptr(), self.conn.err_ptr(), index as i32, value.as_ptr(), value.ind_ptr(), self.coll)
        }
        Ok(())
    }

    /// Sets the element at `index` to null.
    pub fn set_null(&mut self, index: usize) -> Result<()> {
        let (elem, ind) = self.item(index)?.ok_or_else(|| Error::lib(LibError::OutOfBounds(index)))?;
        let desc = self.element()?;
        if desc.type_info().is_some() && !ind.is_null() {
            // atomic null indicator of an object element
            unsafe { *(ind as *mut OCIInd) = OCI_IND_NULL; }
            return Ok(());
        }
        let value = current_value(desc, elem);
        let null_ind = OCI_IND_NULL;
        catch!{self.conn.err_ptr() =>
            OCICollAssignElem(
                self.conn.env_ptr(), self.conn.err_ptr(), index as i32,
                value, &null_ind as *const OCIInd as *const c_void, self.coll
            )
        }
        Ok(())
    }

    /// Deletes the element at `index` of a nested table. Other elements keep their indexes.
    pub fn delete(&mut self, index: usize) -> Result<()> {
        if self.kind() == CollectionKind::Varray {
            return Err( Error::lib(LibError::NotCompatible("VARRAY".to_string(), "delete".to_string())) );
        }
        catch!{self.conn.err_ptr() =>
            OCITableDelete(self.conn.env_ptr(), self.conn.err_ptr(), index as i32, self.coll)
        }
        Ok(())
    }

    /**
        Returns an iterator over the elements. Null elements are returned as `None`,
        deleted elements of nested tables are skipped.

        # Example

        ```no_run
        use oracall::{Collection, TypeInfoKind};

        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let info = conn.describe_type("SYS.ODCINUMBERLIST", TypeInfoKind::Type)?;
        let mut nums = Collection::new(&conn, &info)?;
        nums.append(&1)?;
        nums.append(&2)?;
        nums.append(&3)?;

        let mut total = 0;
        for num in nums.iter::<i32>()? {
            total += num?.unwrap_or_default();
        }
        assert_eq!(total, 6);

        let mut iter = nums.iter::<i32>()?;
        iter.nth(1);
        assert_eq!(iter.prev().transpose()?, Some(Some(1)));
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn iter<'c, T: FromValue<'a>>(&'c self) -> Result<CollectionIter<'c, 'a, T>> {
        let desc = self.element()?;
        let mut iter = ptr::null_mut::<OCIIter>();
        catch!{self.conn.err_ptr() =>
            OCIIterCreate(self.conn.env_ptr(), self.conn.err_ptr(), self.coll, &mut iter)
        }
        Ok( CollectionIter { coll: self, desc, iter, _elem: PhantomData } )
    }

    /// Returns the elements of the collection. Deleted and null elements are `None`.
    pub fn to_vec<T: FromValue<'a>>(&self) -> Result<Vec<Option<T>>> {
        let size = self.size()?;
        let mut items = Vec::with_capacity(size);
        for index in 0..size {
            items.push(self.get(index)?);
        }
        Ok(items)
    }
}

/// Iterator over collection elements. See [`Collection::iter`].
pub struct CollectionIter<'c, 'a, T> {
    coll: &'c Collection<'a>,
    desc: &'c Column,
    iter: *mut OCIIter,
    _elem: PhantomData<T>,
}

impl<T> Drop for CollectionIter<'_, '_, T> {
    fn drop(&mut self) {
        let conn = self.coll.conn;
        let res = unsafe { OCIIterDelete(conn.env_ptr(), conn.err_ptr(), &mut self.iter) };
        if res != OCI_SUCCESS {
            log::debug!("cannot free {} iterator: {}", self.coll.info.full_name(), Error::oci(conn.err_ptr(), res));
        }
    }
}

impl<'a, T: FromValue<'a>> CollectionIter<'_, 'a, T> {
    fn element(&self, elem: *mut c_void, ind: *mut c_void) -> Result<Option<T>> {
        if elem.is_null() || !ind.is_null() && unsafe { *(ind as *const OCIInd) } == OCI_IND_NULL {
            return Ok(None);
        }
        let value = ValueRef { conn: self.coll.conn, desc: self.desc, value: elem, ind };
        T::from_value(&value).map(Some)
    }

    fn step(&mut self, forward: bool) -> Option<Result<Option<T>>> {
        let conn = self.coll.conn;
        let mut elem = ptr::null_mut::<c_void>();
        let mut ind = ptr::null_mut::<c_void>();
        let mut at_edge = 0i32;
        let res = unsafe {
            if forward {
                OCIIterNext(conn.env_ptr(), conn.err_ptr(), self.iter, &mut elem, &mut ind, &mut at_edge)
            } else {
                OCIIterPrev(conn.env_ptr(), conn.err_ptr(), self.iter, &mut elem, &mut ind, &mut at_edge)
            }
        };
        if let Err(err) = crate::err::check(res, conn.err_ptr()) {
            return Some(Err(err));
        }
        if at_edge != 0 {
            None
        } else {
            Some(self.element(elem, ind))
        }
    }

    /// Moves back to the previous element. Returns `None` when the iterator is at the first element.
    pub fn prev(&mut self) -> Option<Result<Option<T>>> {
        self.step(false)
    }

    /// Moves the iterator before the first element.
    pub fn reset(&mut self) -> Result<()> {
        let conn = self.coll.conn;
        catch!{conn.err_ptr() =>
            OCIIterInit(conn.env_ptr(), conn.err_ptr(), self.coll.coll, self.iter)
        }
        Ok(())
    }
}

impl<'a, T: FromValue<'a>> Iterator for CollectionIter<'_, 'a, T> {
    type Item = Result<Option<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step(true)
    }
}
