//! Parameter placeholders and the buffers bound to them

use crate::{Error, Result, err::LibError, oci::{self, *}};
use libc::c_void;
use std::{collections::HashMap, mem, ptr};

/// Maximum number of placeholders OCI accepts in a statement.
pub(crate) const MAX_BINDS : usize = 65535;

/// Buffer that stays bound to a placeholder between executions.
struct Bind {
    handle: Ptr<OCIBind>,
    sql_type: u16,
    elem_size: usize,
    count: usize,
    data: Vec<u64>,
    inds: Vec<OCIInd>,
    lens: Vec<u16>,
    objs: Vec<*mut c_void>,
    obj_inds: Vec<*mut c_void>,
    dynamic: bool,
}

impl Bind {
    fn new() -> Self {
        Self {
            handle: Ptr::null(),
            sql_type: 0,
            elem_size: 0,
            count: 0,
            data: Vec::new(),
            inds: Vec::new(),
            lens: Vec::new(),
            objs: Vec::new(),
            obj_inds: Vec::new(),
            dynamic: false,
        }
    }

    /// Resizes the buffers for `count` elements of `elem_size` bytes each.
    fn reserve(&mut self, elem_size: usize, count: usize) {
        let words = (elem_size * count + 7) / 8;
        self.data.clear();
        self.data.resize(words.max(1), 0);
        self.inds.clear();
        self.inds.resize(count, OCI_IND_NOTNULL);
        self.lens.clear();
        self.lens.resize(count, 0);
        self.elem_size = elem_size;
        self.count = count;
        self.dynamic = false;
    }

    /// Number of iterations the bound buffers can serve.
    fn rows(&self) -> usize {
        if self.dynamic { usize::MAX } else { self.count }
    }

    fn bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.data.as_ptr() as *const u8, self.elem_size * self.count) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.data.as_mut_ptr() as *mut u8, self.elem_size * self.count) }
    }

    fn element_mut(&mut self, idx: usize) -> &mut [u8] {
        let size = self.elem_size;
        &mut self.bytes_mut()[idx * size .. (idx + 1) * size]
    }
}

/**
    Placeholders of a prepared statement.

    Placeholder names are kept in the order in which they first appear in the SQL text.
    Positional arguments are bound to them in that order, named arguments are found
    by name. Bound values are copied into buffers owned by the statement, so arguments
    do not have to outlive the call that binds them.
*/
pub struct Params {
    stmt: Ptr<OCIStmt>,
    err: Ptr<OCIError>,
    env: Ptr<OCIEnv>,
    names: Vec<String>,
    idxs: HashMap<String, usize>,
    binds: Vec<Bind>,
    used: Vec<bool>,
    array_size: usize,
}

fn strip_colon(name: &str) -> &str {
    name.strip_prefix(':').unwrap_or(name)
}

impl Params {
    pub(crate) fn new(stmt: *mut OCIStmt, err: *mut OCIError, env: *mut OCIEnv) -> Result<Self> {
        let num_binds : u32 = oci::handle::get_attr(stmt, OCI_ATTR_BIND_COUNT, err)?;
        let num_binds = num_binds as usize;
        if num_binds > MAX_BINDS {
            return Err( Error::lib(LibError::MaxBind) );
        }
        let mut names = Vec::with_capacity(num_binds);
        let mut idxs = HashMap::with_capacity(num_binds);
        if num_binds > 0 {
            let mut bind_names     = vec![ptr::null_mut::<u8>(); num_binds];
            let mut bind_name_lens = vec![0u8; num_binds];
            let mut ind_names      = vec![ptr::null_mut::<u8>(); num_binds];
            let mut ind_name_lens  = vec![0u8; num_binds];
            let mut dups           = vec![0u8; num_binds];
            let mut oci_binds      = vec![ptr::null_mut::<OCIBind>(); num_binds];
            let mut found = 0i32;
            catch!{err =>
                OCIStmtGetBindInfo(
                    stmt, err, num_binds as u32, 1, &mut found,
                    bind_names.as_mut_ptr(), bind_name_lens.as_mut_ptr(),
                    ind_names.as_mut_ptr(), ind_name_lens.as_mut_ptr(),
                    dups.as_mut_ptr(), oci_binds.as_mut_ptr()
                )
            }
            let found = (found.max(0) as usize).min(num_binds);
            for i in 0..found {
                if dups[i] != 0 {
                    continue;
                }
                let name = unsafe { std::slice::from_raw_parts(bind_names[i], bind_name_lens[i] as usize) };
                let name = String::from_utf8_lossy(name).to_uppercase();
                idxs.insert(name.clone(), names.len());
                names.push(name);
            }
        }
        let count = names.len();
        let binds = (0..count).map(|_| Bind::new()).collect();
        Ok( Self {
            stmt: Ptr::new(stmt), err: Ptr::new(err), env: Ptr::new(env),
            names, idxs, binds,
            used: vec![false; count],
            array_size: 0,
        } )
    }

    pub(crate) fn env_ptr(&self) -> *mut OCIEnv {
        self.env.get()
    }

    pub(crate) fn err_ptr(&self) -> *mut OCIError {
        self.err.get()
    }

    /// Number of unique placeholders.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the name of the placeholder at `idx`.
    pub(crate) fn name(&self, idx: usize) -> &str {
        self.names.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Returns the index of the placeholder. Names are case-insensitive and the leading colon is optional.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        let name = strip_colon(name);
        if let Some(&idx) = self.idxs.get(name) {
            return Ok(idx);
        }
        self.idxs.get(name.to_uppercase().as_str()).copied()
            .ok_or_else(|| Error::lib(LibError::MapArgument(name.to_string())))
    }

    /// Prepares for binding the arguments of the next execution.
    pub(crate) fn start(&mut self) {
        self.used.iter_mut().for_each(|used| *used = false);
        self.array_size = 0;
    }

    /// Size of the arrays bound for the next execution, 0 if there are none.
    pub(crate) fn array_size(&self) -> usize {
        self.array_size
    }

    /**
        Checks that every bound placeholder holds a value for each of `iters` iterations.
        OCI reads element `i` of every bound buffer in iteration `i`, thus a scalar cannot
        be mixed with arrays.
    */
    pub(crate) fn check_iterations(&self, iters: usize) -> Result<()> {
        if iters <= 1 {
            return Ok(());
        }
        let short = self.binds.iter().zip(self.used.iter())
            .filter(|(bind, &used)| used || !bind.handle.is_null())
            .map(|(bind, _)| bind.rows())
            .find(|&rows| rows < iters);
        match short {
            Some(rows) => Err( Error::lib(LibError::BindArraySize(iters, rows)) ),
            None => Ok(()),
        }
    }

    /// Claims the placeholder at `idx` for the current execution.
    fn claim(&mut self, idx: usize, sql_type: u16) -> Result<()> {
        if idx >= self.names.len() {
            return Err( Error::lib(if idx >= MAX_BINDS { LibError::MaxBind } else { LibError::OutOfBounds(idx) }) );
        }
        if self.used[idx] {
            return Err( Error::lib(LibError::BindAlreadyUsed(self.names[idx].clone())) );
        }
        let bound_type = self.binds[idx].sql_type;
        if bound_type != 0 && bound_type != sql_type {
            return Err( Error::lib(LibError::RebindBadDatatype(self.names[idx].clone())) );
        }
        self.used[idx] = true;
        Ok(())
    }

    fn bind(&mut self, idx: usize, sql_type: u16, with_lens: bool) -> Result<()> {
        let stmt = self.stmt.get();
        let err = self.err.get();
        let name = self.names[idx].clone();
        let bind = &mut self.binds[idx];
        bind.sql_type = sql_type;
        let value_sz = if bind.elem_size > i32::MAX as usize { i32::MAX } else { bind.elem_size as i32 };
        let (valuep, value_sz) = if sql_type == SQLT_NTY || sql_type == SQLT_REF {
            (ptr::null_mut(), 0)
        } else {
            (bind.data.as_mut_ptr() as *mut c_void, value_sz)
        };
        let alenp = if with_lens { bind.lens.as_mut_ptr() } else { ptr::null_mut() };
        let placeholder = format!(":{}", name);
        catch!{err =>
            OCIBindByName(
                stmt, bind.handle.as_mut_ptr(), err,
                placeholder.as_ptr(), placeholder.len() as i32,
                valuep, value_sz, sql_type,
                bind.inds.as_mut_ptr() as *mut c_void, alenp, ptr::null_mut(),
                0, ptr::null_mut(), OCI_DEFAULT
            )
        }
        Ok(())
    }

    /**
        Binds a single value. `data` is copied into a buffer of `capacity` bytes
        (at least `data.len()`), so the placeholder can also return up to `capacity`
        bytes when it is an OUT parameter.
    */
    pub(crate) fn bind_value(&mut self, idx: usize, sql_type: u16, data: &[u8], capacity: usize) -> Result<()> {
        self.claim(idx, sql_type)?;
        let capacity = capacity.max(data.len()).max(1);
        let bind = &mut self.binds[idx];
        bind.reserve(capacity, 1);
        bind.bytes_mut()[..data.len()].copy_from_slice(data);
        bind.lens[0] = data.len().min(u16::MAX as usize) as u16;
        let with_lens = capacity <= u16::MAX as usize;
        if !with_lens {
            bind.elem_size = data.len().max(1);
        }
        self.bind(idx, sql_type, with_lens)
    }

    /**
        Binds NULL. OUT parameters get a buffer of `capacity` bytes for the returned value.
        A placeholder that was bound before keeps its SQL type.
    */
    pub(crate) fn bind_null(&mut self, idx: usize, sql_type: u16, capacity: usize) -> Result<()> {
        let sql_type = match self.binds.get(idx) {
            Some(bind) if bind.sql_type != 0 && bind.sql_type != SQLT_NTY => bind.sql_type,
            _ => sql_type,
        };
        self.claim(idx, sql_type)?;
        let bind = &mut self.binds[idx];
        bind.reserve(capacity.max(mem::size_of::<*mut c_void>()), 1);
        bind.inds[0] = OCI_IND_NULL;
        let with_lens = capacity <= u16::MAX as usize;
        self.bind(idx, sql_type, with_lens)
    }

    /// Binds a descriptor or a handle. OCI reads and writes the value it points to.
    pub(crate) fn bind_ptr(&mut self, idx: usize, sql_type: u16, val: *mut c_void, is_null: bool) -> Result<()> {
        self.claim(idx, sql_type)?;
        let bind = &mut self.binds[idx];
        bind.reserve(mem::size_of::<*mut c_void>(), 1);
        bind.data[0] = val as usize as u64;
        bind.inds[0] = if is_null { OCI_IND_NULL } else { OCI_IND_NOTNULL };
        // statement handles are bound by the address of the handle pointer and have no size
        if sql_type == SQLT_RSET {
            bind.elem_size = 0;
        }
        self.bind(idx, sql_type, false)
    }

    /// Binds an object or a collection instance (`SQLT_NTY`), or a REF (`SQLT_REF`).
    pub(crate) fn bind_object(&mut self, idx: usize, sql_type: u16, tdo: *mut OCIType, instance: *mut c_void, null_struct: *mut c_void) -> Result<()> {
        self.claim(idx, sql_type)?;
        {
            let bind = &mut self.binds[idx];
            bind.reserve(0, 1);
            bind.objs.clear();
            bind.objs.push(instance);
            bind.obj_inds.clear();
            bind.obj_inds.push(null_struct);
        }
        self.bind(idx, sql_type, false)?;
        let err = self.err.get();
        let bind = &mut self.binds[idx];
        let inds = if null_struct.is_null() { ptr::null_mut() } else { bind.obj_inds.as_mut_ptr() };
        catch!{err =>
            OCIBindObject(bind.handle.get(), err, tdo, bind.objs.as_mut_ptr(), ptr::null_mut(), inds, ptr::null_mut())
        }
        Ok(())
    }

    /**
        Binds an array for array DML. Every element takes `elem_size` bytes, elements
        that are `None` are bound as NULL. All arrays of one execution must have the same size.
    */
    pub(crate) fn bind_array<'v>(
        &mut self, idx: usize, sql_type: u16, elem_size: usize,
        values: impl ExactSizeIterator<Item=Option<&'v [u8]>>
    ) -> Result<()> {
        let count = values.len();
        if count == 0 {
            return Err( Error::lib(LibError::MinValue(0, 1)) );
        }
        if self.array_size > 0 && self.array_size != count {
            return Err( Error::lib(LibError::BindArraySize(count, self.array_size)) );
        }
        if elem_size > u16::MAX as usize {
            return Err( Error::lib(LibError::OutOfBounds(elem_size)) );
        }
        self.claim(idx, sql_type)?;
        let bind = &mut self.binds[idx];
        bind.reserve(elem_size.max(1), count);
        for (i, value) in values.enumerate() {
            match value {
                Some(data) => {
                    let len = data.len().min(elem_size);
                    bind.element_mut(i)[..len].copy_from_slice(&data[..len]);
                    bind.lens[i] = len as u16;
                    bind.inds[i] = OCI_IND_NOTNULL;
                }
                None => {
                    bind.lens[i] = 0;
                    bind.inds[i] = OCI_IND_NULL;
                }
            }
        }
        self.array_size = count;
        self.bind(idx, sql_type, true)
    }

    /// Returns `true` if the value returned for the placeholder at `idx` is NULL.
    pub(crate) fn is_null(&self, idx: usize) -> bool {
        self.binds.get(idx).and_then(|bind| bind.inds.first()).map(|&ind| ind == OCI_IND_NULL).unwrap_or(true)
    }

    /// Returns the data the placeholder at `idx` holds after the execution.
    pub(crate) fn out_data(&self, idx: usize) -> Option<&[u8]> {
        let bind = self.binds.get(idx)?;
        if bind.inds.first().copied().unwrap_or(OCI_IND_NULL) == OCI_IND_NULL {
            return None;
        }
        let bytes = bind.bytes();
        let len = if bind.elem_size <= u16::MAX as usize { bind.lens[0] as usize } else { bind.elem_size };
        Some( &bytes[..len.min(bytes.len())] )
    }

    /// Returns the handle or descriptor pointer bound at `idx`.
    pub(crate) fn out_ptr(&self, idx: usize) -> *mut c_void {
        self.binds.get(idx).and_then(|bind| bind.data.first()).map(|&val| val as usize as *mut c_void).unwrap_or(ptr::null_mut())
    }

    /// Binds a placeholder for values that OCI delivers through callbacks (RETURNING INTO).
    pub(crate) fn bind_dynamic(
        &mut self, idx: usize, sql_type: u16, max_size: usize,
        ctx: *mut c_void, in_cb: OCICallbackInBind, out_cb: OCICallbackOutBind
    ) -> Result<()> {
        self.claim(idx, sql_type)?;
        let stmt = self.stmt.get();
        let err = self.err.get();
        let placeholder = format!(":{}", self.names[idx]);
        let bind = &mut self.binds[idx];
        bind.sql_type = sql_type;
        bind.dynamic = true;
        catch!{err =>
            OCIBindByName(
                stmt, bind.handle.as_mut_ptr(), err,
                placeholder.as_ptr(), placeholder.len() as i32,
                ptr::null_mut(), max_size.min(i32::MAX as usize) as i32, sql_type,
                ptr::null_mut(), ptr::null_mut(), ptr::null_mut(),
                0, ptr::null_mut(), OCI_DATA_AT_EXEC
            )
        }
        catch!{err =>
            OCIBindDynamic(bind.handle.get(), err, ctx, in_cb, ctx, out_cb)
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_is_optional() {
        assert_eq!(strip_colon(":ID"), "ID");
        assert_eq!(strip_colon("ID"), "ID");
        assert_eq!(strip_colon("::ID"), ":ID");
    }

    #[test]
    fn buffers_are_sized_per_element() {
        let mut bind = Bind::new();
        bind.reserve(5, 3);
        assert_eq!(bind.bytes().len(), 15);
        assert_eq!(bind.data.len(), 2);
        assert_eq!(bind.inds, vec![OCI_IND_NOTNULL; 3]);
        bind.element_mut(2).copy_from_slice(b"abcde");
        assert_eq!(&bind.bytes()[10..], b"abcde");
    }

    fn unbound_params(names: &[&str]) -> Params {
        let names : Vec<String> = names.iter().map(|name| name.to_string()).collect();
        let idxs = names.iter().enumerate().map(|(i, name)| (name.clone(), i)).collect();
        let count = names.len();
        Params {
            stmt: Ptr::null(), err: Ptr::null(), env: Ptr::null(),
            names, idxs,
            binds: (0..count).map(|_| Bind::new()).collect(),
            used: vec![false; count],
            array_size: 0,
        }
    }

    #[test]
    fn scalars_cannot_serve_array_iterations() {
        let mut params = unbound_params(&["ID", "NAME"]);
        params.binds[0].reserve(22, 4);
        params.binds[1].reserve(8, 1);
        params.used = vec![true, true];
        assert!(params.check_iterations(1).is_ok());
        let res = params.check_iterations(4);
        assert_eq!(res.err().and_then(|err| err.internal().cloned()), Some(LibError::BindArraySize(4, 1)));

        params.binds[1].reserve(8, 4);
        assert!(params.check_iterations(4).is_ok());
        assert!(params.check_iterations(5).is_err());
    }

    #[test]
    fn returning_binds_serve_any_iteration() {
        let mut params = unbound_params(&["ID", "NEW_ID"]);
        params.binds[0].reserve(22, 3);
        params.binds[1].dynamic = true;
        params.used = vec![true, true];
        assert!(params.check_iterations(3).is_ok());
    }

    #[test]
    fn placeholders_index_ignores_case_and_colon() {
        let params = unbound_params(&["REGION", "PREFIX"]);
        assert_eq!(params.index_of(":region").ok(), Some(0));
        assert_eq!(params.index_of("PREFIX").ok(), Some(1));
        assert!(params.index_of(":missing").is_err());
    }
}
