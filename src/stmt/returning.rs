//! Buffers for `RETURNING ... INTO` placeholders

use crate::{column::ColumnType, oci::*};
use libc::c_void;
use std::{mem::size_of, ptr};

static NULL_IND : OCIInd = OCI_IND_NULL;

/// Type of the values a RETURNING placeholder receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReturnType {
    Number,
    Double,
    Text(usize),
    Raw(usize),
    Date,
}

impl ReturnType {
    pub(crate) fn sql_type(self) -> u16 {
        match self {
            ReturnType::Number  => SQLT_VNU,
            ReturnType::Double  => SQLT_BDOUBLE,
            ReturnType::Text(_) => SQLT_CHR,
            ReturnType::Raw(_)  => SQLT_BIN,
            ReturnType::Date    => SQLT_ODT,
        }
    }

    pub(crate) fn column_type(self) -> ColumnType {
        match self {
            ReturnType::Number  => ColumnType::Number,
            ReturnType::Double  => ColumnType::BinaryDouble,
            ReturnType::Text(_) => ColumnType::Text,
            ReturnType::Raw(_)  => ColumnType::Raw,
            ReturnType::Date    => ColumnType::Date,
        }
    }

    pub(crate) fn size(self) -> usize {
        match self {
            ReturnType::Number  => size_of::<OCINumber>(),
            ReturnType::Double  => size_of::<f64>(),
            ReturnType::Text(len) => len.max(1),
            ReturnType::Raw(len)  => len.max(1),
            ReturnType::Date    => size_of::<OCIDate>(),
        }
    }
}

/// Rows returned into one placeholder by one iteration of the statement.
#[derive(Default)]
struct Returned {
    data: Vec<u8>,
    lens: Vec<u32>,
    inds: Vec<OCIInd>,
    codes: Vec<u16>,
}

/**
    Values returned into a placeholder. OCI asks for the buffer of every returned
    row through the out-bind callback. The buffers of all rows of an iteration are
    allocated when OCI asks for the first one, after it reports how many rows were
    returned.
*/
pub(crate) struct ReturnBuffer {
    pub(crate) name: String,
    pub(crate) kind: ReturnType,
    err: Ptr<OCIError>,
    iters: Vec<Returned>,
}

impl ReturnBuffer {
    pub(crate) fn new(name: &str, kind: ReturnType, err: *mut OCIError) -> Self {
        Self { name: name.to_string(), kind, err: Ptr::new(err), iters: Vec::new() }
    }

    pub(crate) fn reset(&mut self) {
        self.iters.clear();
    }

    /// Number of rows returned by all iterations.
    pub(crate) fn len(&self) -> usize {
        self.iters.iter().map(|iter| iter.inds.len()).sum()
    }

    /// Returns the value of the row at `pos` counting over all iterations, `None` for NULLs.
    pub(crate) fn value(&self, pos: usize) -> Option<&[u8]> {
        let mut pos = pos;
        for iter in self.iters.iter() {
            if pos < iter.inds.len() {
                if iter.inds[pos] == OCI_IND_NULL {
                    return None;
                }
                let size = self.kind.size();
                let start = pos * size;
                let len = match self.kind {
                    ReturnType::Text(_) | ReturnType::Raw(_) => (iter.lens[pos] as usize).min(size),
                    _ => size,
                };
                return iter.data.get(start..start + len);
            }
            pos -= iter.inds.len();
        }
        None
    }

    fn prepare_iteration(&mut self, bind: *mut OCIBind, iter: usize) -> usize {
        let mut rows = 0u32;
        let res = attr::get::<u32>(OCI_ATTR_ROWS_RETURNED, OCI_HTYPE_BIND, bind as *const c_void, self.err.get());
        if let Ok(num) = res {
            rows = num;
        }
        let rows = rows as usize;
        while self.iters.len() <= iter {
            self.iters.push(Returned::default());
        }
        let size = self.kind.size();
        let buf = &mut self.iters[iter];
        buf.data = vec![0; rows * size];
        buf.lens = vec![size as u32; rows];
        buf.inds = vec![OCI_IND_NOTNULL; rows];
        buf.codes = vec![0; rows];
        rows
    }
}

/// Supplies NULL for the IN side of a RETURNING placeholder.
pub(crate) unsafe extern "C" fn in_bind_callback(
    _ictxp: *mut c_void, _bindp: *mut OCIBind, _iter: u32, _index: u32,
    bufpp: *mut *mut c_void, alenp: *mut u32, piecep: *mut u8, indp: *mut *mut c_void
) -> i32 {
    *bufpp = ptr::null_mut();
    *alenp = 0;
    *indp = &NULL_IND as *const OCIInd as *mut c_void;
    *piecep = OCI_ONE_PIECE;
    OCI_CONTINUE
}

/// Hands OCI the buffer for the returned row `index` of iteration `iter`.
pub(crate) unsafe extern "C" fn out_bind_callback(
    octxp: *mut c_void, bindp: *mut OCIBind, iter: u32, index: u32,
    bufpp: *mut *mut c_void, alenpp: *mut *mut u32, piecep: *mut u8,
    indpp: *mut *mut c_void, rcodepp: *mut *mut u16
) -> i32 {
    let buffer = &mut *(octxp as *mut ReturnBuffer);
    let iter = iter as usize;
    let index = index as usize;
    if index == 0 || buffer.iters.len() <= iter {
        buffer.prepare_iteration(bindp, iter);
    }
    let size = buffer.kind.size();
    let rows = &mut buffer.iters[iter];
    if index >= rows.inds.len() {
        return OCI_ERROR;
    }
    *bufpp = rows.data.as_mut_ptr().add(index * size) as *mut c_void;
    *alenpp = rows.lens.as_mut_ptr().add(index);
    *indpp = rows.inds.as_mut_ptr().add(index) as *mut c_void;
    *rcodepp = rows.codes.as_mut_ptr().add(index);
    *piecep = OCI_ONE_PIECE;
    OCI_CONTINUE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_counted_across_iterations() {
        let mut buf = ReturnBuffer::new("ID", ReturnType::Text(4), ptr::null_mut());
        buf.iters.push(Returned { data: b"ab__cd__".to_vec(), lens: vec![2, 4], inds: vec![OCI_IND_NOTNULL, OCI_IND_NOTNULL], codes: vec![0, 0] });
        buf.iters.push(Returned { data: vec![0; 4], lens: vec![0], inds: vec![OCI_IND_NULL], codes: vec![0] });
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.value(0), Some(&b"ab"[..]));
        assert_eq!(buf.value(1), Some(&b"cd__"[..]));
        assert_eq!(buf.value(2), None);
        assert_eq!(buf.value(3), None);
        buf.reset();
        assert_eq!(buf.len(), 0);
    }
}
