//! Result set rows

use super::fromsql::{FromSql, SqlValue};
use crate::{
    Connection, Error, Result,
    column::{Column, ColumnSource, ColumnType},
    env::Env,
    err::LibError,
    oci::{self, *},
};
use libc::c_void;
use std::{cell::Cell, mem::size_of, ptr};

/// Row position for scrollable fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    /// Seek to the 1-based row number
    Absolute,
    /// Seek relative to the current row
    Relative,
}

/// How rows are fetched by the result set of a query.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FetchSettings {
    pub(crate) fetch_size: usize,
    pub(crate) long_max: usize,
    pub(crate) scrollable: bool,
}

/// Fetch buffer of one select-list column.
struct ColumnBuffer {
    define: Ptr<OCIDefine>,
    column_type: ColumnType,
    dtype: u32,
    elem_size: usize,
    data: Vec<u64>,
    inds: Vec<OCIInd>,
    lens: Vec<u16>,
    ptrs: Vec<Cell<*mut c_void>>,
    obj_inds: Vec<*mut c_void>,
}

/// Maps a column type to the SQL type it is defined as and the descriptor type of its values.
fn define_type(col: &Column) -> Result<(u16, u32)> {
    let types = match col.column_type() {
        ColumnType::Number       => (SQLT_VNU, 0),
        ColumnType::BinaryFloat
        | ColumnType::BinaryDouble => (SQLT_BDOUBLE, 0),
        ColumnType::Text
        | ColumnType::Long       => (SQLT_CHR, 0),
        ColumnType::Raw
        | ColumnType::LongRaw    => (SQLT_BIN, 0),
        ColumnType::Date         => (SQLT_ODT, 0),
        ColumnType::Boolean      => (SQLT_INT, 0),
        ColumnType::Timestamp    => (SQLT_TIMESTAMP, OCI_DTYPE_TIMESTAMP),
        ColumnType::TimestampTZ  => (SQLT_TIMESTAMP_TZ, OCI_DTYPE_TIMESTAMP_TZ),
        ColumnType::TimestampLTZ => (SQLT_TIMESTAMP_LTZ, OCI_DTYPE_TIMESTAMP_LTZ),
        ColumnType::IntervalYM   => (SQLT_INTERVAL_YM, OCI_DTYPE_INTERVAL_YM),
        ColumnType::IntervalDS   => (SQLT_INTERVAL_DS, OCI_DTYPE_INTERVAL_DS),
        ColumnType::RowID        => (SQLT_RDD, OCI_DTYPE_ROWID),
        ColumnType::CLOB
        | ColumnType::NCLOB      => (SQLT_CLOB, OCI_DTYPE_LOB),
        ColumnType::BLOB         => (SQLT_BLOB, OCI_DTYPE_LOB),
        ColumnType::BFile        => (SQLT_BFILE, OCI_DTYPE_FILE),
        ColumnType::Cursor       => (SQLT_RSET, 0),
        ColumnType::Object
        | ColumnType::Collection => (SQLT_NTY, 0),
        ColumnType::Ref          => (SQLT_REF, 0),
        ColumnType::Unknown(_)   => {
            return Err( Error::lib(LibError::DatatypeNotSupported(col.sql_type())) );
        }
    };
    Ok(types)
}

impl ColumnBuffer {
    fn new(col: &Column, num_rows: usize, long_max: usize) -> Self {
        let elem_size = col.buffer_size(long_max).min(u16::MAX as usize);
        Self {
            define: Ptr::null(),
            column_type: col.column_type(),
            dtype: 0,
            elem_size,
            data: Vec::new(),
            inds: vec![OCI_IND_NULL; num_rows],
            lens: vec![0; num_rows],
            ptrs: Vec::new(),
            obj_inds: Vec::new(),
        }
    }

    fn is_named_type(&self) -> bool {
        matches!(self.column_type, ColumnType::Object | ColumnType::Collection | ColumnType::Ref)
    }

    fn is_inline(&self) -> bool {
        self.ptrs.is_empty() && !self.is_named_type()
    }

    fn value_data(&self, row: usize) -> &[u8] {
        if !self.is_inline() {
            return &[];
        }
        let bytes = unsafe { std::slice::from_raw_parts(self.data.as_ptr() as *const u8, self.data.len() * 8) };
        let start = row * self.elem_size;
        let len = match self.column_type {
            ColumnType::Text | ColumnType::Long | ColumnType::Raw | ColumnType::LongRaw => self.lens[row] as usize,
            _ => self.elem_size,
        };
        bytes.get(start..start + len.min(self.elem_size)).unwrap_or(&[])
    }

    fn is_null(&self, row: usize) -> bool {
        match self.column_type {
            ColumnType::Object | ColumnType::Collection => {
                match self.obj_inds.get(row) {
                    Some(&ind) if !ind.is_null() => unsafe { *(ind as *const OCIInd) == OCI_IND_NULL },
                    _ => true,
                }
            }
            _ => self.inds.get(row).map(|&ind| ind == OCI_IND_NULL).unwrap_or(true),
        }
    }
}

/// Select-list descriptions and their fetch buffers.
pub(crate) struct Columns {
    env: Ptr<OCIEnv>,
    err: Ptr<OCIError>,
    descs: Vec<Column>,
    bufs: Vec<ColumnBuffer>,
}

impl Drop for Columns {
    fn drop(&mut self) {
        let env = self.env.get();
        let err = self.err.get();
        for buf in self.bufs.iter_mut() {
            match buf.column_type {
                ColumnType::Object | ColumnType::Collection | ColumnType::Ref => {
                    for cell in buf.ptrs.iter() {
                        let obj = cell.replace(ptr::null_mut());
                        if !obj.is_null() {
                            unsafe { OCIObjectFree(env, err, obj, OCI_OBJECTFREE_FORCE); }
                        }
                    }
                }
                ColumnType::Cursor => {
                    for cell in buf.ptrs.iter() {
                        let stmt = cell.replace(ptr::null_mut());
                        if !stmt.is_null() {
                            unsafe { OCIHandleFree(stmt, OCI_HTYPE_STMT); }
                        }
                    }
                }
                _ if buf.dtype != 0 => {
                    for cell in buf.ptrs.iter() {
                        let desc = cell.replace(ptr::null_mut());
                        if !desc.is_null() {
                            unsafe { OCIDescriptorFree(desc, buf.dtype); }
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

impl Columns {
    /// Describes the select list of an executed (or described) statement.
    pub(crate) fn describe(stmt: *mut OCIStmt, err: *mut OCIError, conn: &Connection) -> Result<Vec<Column>> {
        let num_cols : u32 = oci::handle::get_attr(stmt, OCI_ATTR_PARAM_COUNT, err)?;
        let mut descs = Vec::with_capacity(num_cols as usize);
        for pos in 1..=num_cols {
            let param = Param::get(stmt as *const c_void, OCI_HTYPE_STMT, pos, err)?;
            descs.push(Column::describe(&param, ColumnSource::SelectList, conn)?);
        }
        Ok(descs)
    }

    /// Describes the select list and defines fetch buffers for `num_rows` rows.
    fn new(stmt: *mut OCIStmt, err: *mut OCIError, conn: &Connection, num_rows: usize, long_max: usize) -> Result<Self> {
        let descs = Self::describe(stmt, err, conn)?;
        let mut cols = Self {
            env: Ptr::new(conn.env_ptr()),
            err: Ptr::new(err),
            bufs: Vec::with_capacity(descs.len()),
            descs: Vec::new(),
        };
        let env = conn.env_ptr();
        for (idx, desc) in descs.iter().enumerate() {
            let (sql_type, dtype) = define_type(desc)?;
            let mut buf = ColumnBuffer::new(desc, num_rows, long_max);
            buf.dtype = dtype;
            // owned by the columns before anything is allocated, so Drop frees partial allocations
            cols.bufs.push(buf);
            let buf = &mut cols.bufs[idx];
            Self::alloc(env, buf, desc, sql_type, num_rows)?;
            Self::define(stmt, err, buf, desc, idx as u32 + 1, sql_type)?;
        }
        cols.descs = descs;
        Ok(cols)
    }

    fn alloc(env: *mut OCIEnv, buf: &mut ColumnBuffer, desc: &Column, sql_type: u16, num_rows: usize) -> Result<()> {
        match sql_type {
            SQLT_NTY | SQLT_REF => {
                buf.ptrs = (0..num_rows).map(|_| Cell::new(ptr::null_mut())).collect();
                buf.obj_inds = vec![ptr::null_mut(); num_rows];
                if desc.type_info().is_none() {
                    return Err( Error::lib(LibError::DatatypeNotSupported(desc.sql_type())) );
                }
            }
            SQLT_RSET => {
                buf.ptrs = Vec::with_capacity(num_rows);
                for _ in 0..num_rows {
                    let mut stmt = Handle::<OCIStmt>::new(env)?;
                    buf.ptrs.push(Cell::new(stmt.release() as *mut c_void));
                }
            }
            _ if buf.dtype != 0 => {
                buf.ptrs = Vec::with_capacity(num_rows);
                for _ in 0..num_rows {
                    let mut desc = ptr::null_mut::<c_void>();
                    oci::descriptor_alloc(env, &mut desc, buf.dtype)?;
                    buf.ptrs.push(Cell::new(desc));
                }
            }
            _ => {
                buf.data = vec![0u64; (buf.elem_size * num_rows + 7) / 8];
            }
        }
        Ok(())
    }

    fn define(stmt: *mut OCIStmt, err: *mut OCIError, buf: &mut ColumnBuffer, desc: &Column, pos: u32, sql_type: u16) -> Result<()> {
        match sql_type {
            SQLT_NTY | SQLT_REF => {
                // REFs report null in the define indicators, objects in their null structures
                let inds = if sql_type == SQLT_REF { buf.inds.as_mut_ptr() as *mut c_void } else { ptr::null_mut() };
                catch!{err =>
                    OCIDefineByPos(
                        stmt, buf.define.as_mut_ptr(), err, pos,
                        ptr::null_mut(), 0, sql_type,
                        inds, ptr::null_mut(), ptr::null_mut(), OCI_DEFAULT
                    )
                }
                let tdo = desc.type_info().map(|info| info.tdo()).unwrap_or(ptr::null_mut());
                catch!{err =>
                    OCIDefineObject(
                        buf.define.get(), err, tdo,
                        buf.ptrs.as_mut_ptr() as *mut *mut c_void, ptr::null_mut(),
                        buf.obj_inds.as_mut_ptr(), ptr::null_mut()
                    )
                }
            }
            _ if !buf.ptrs.is_empty() => {
                catch!{err =>
                    OCIDefineByPos(
                        stmt, buf.define.as_mut_ptr(), err, pos,
                        buf.ptrs.as_mut_ptr() as *mut c_void, size_of::<*mut c_void>() as i32, sql_type,
                        buf.inds.as_mut_ptr() as *mut c_void, ptr::null_mut(), ptr::null_mut(), OCI_DEFAULT
                    )
                }
            }
            _ => {
                catch!{err =>
                    OCIDefineByPos(
                        stmt, buf.define.as_mut_ptr(), err, pos,
                        buf.data.as_mut_ptr() as *mut c_void, buf.elem_size as i32, sql_type,
                        buf.inds.as_mut_ptr() as *mut c_void, buf.lens.as_mut_ptr(), ptr::null_mut(), OCI_DEFAULT
                    )
                }
            }
        }
        Ok(())
    }
}

/// Identifies a column of a row: a 0-based index or a case-insensitive name.
pub trait Position {
    #[doc(hidden)]
    fn index(&self, cols: &[Column]) -> Result<usize>;
}

impl Position for usize {
    fn index(&self, cols: &[Column]) -> Result<usize> {
        if *self < cols.len() {
            Ok(*self)
        } else {
            Err( Error::lib(LibError::OutOfBounds(*self)) )
        }
    }
}

impl Position for &str {
    fn index(&self, cols: &[Column]) -> Result<usize> {
        cols.iter()
            .position(|col| col.name().eq_ignore_ascii_case(self))
            .ok_or_else(|| Error::lib(LibError::ColumnNotFound(self.to_string())))
    }
}

/**
    Result set of a query.

    Rows are fetched from the server in batches of the statement's fetch size.

    # Example

    ```no_run
    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    let mut stmt = conn.prepare("
        SELECT employee_id, last_name
          FROM hr.employees
         WHERE department_id = :dept
      ORDER BY employee_id
    ")?;
    let mut rows = stmt.query(30)?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let id : u32 = row.get(0)?.unwrap_or_default();
        let _name : Option<String> = row.get("LAST_NAME")?;
        ids.push(id);
    }
    assert_eq!(ids, [114, 115, 116, 117, 118, 119]);
    assert_eq!(rows.row_count()?, 6);
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct Rows<'a> {
    conn: &'a Connection<'a>,
    stmt: Ptr<OCIStmt>,
    err: Ptr<OCIError>,
    cols: Columns,
    settings: FetchSettings,
    fetched: usize,
    current: usize,
    current_row: usize,
    eof: bool,
}

impl<'a> Rows<'a> {
    pub(crate) fn new(conn: &'a Connection<'a>, stmt: *mut OCIStmt, err: *mut OCIError, settings: FetchSettings) -> Result<Self> {
        let num_rows = if settings.scrollable { 1 } else { settings.fetch_size.max(1) };
        let cols = Columns::new(stmt, err, conn, num_rows, settings.long_max)?;
        Ok( Self {
            conn, stmt: Ptr::new(stmt), err: Ptr::new(err), cols, settings,
            fetched: 0, current: 0, current_row: 0, eof: false,
        } )
    }

    /// Returns the number of columns in the select list.
    pub fn column_count(&self) -> usize {
        self.cols.descs.len()
    }

    /// Returns the description of the column at 0-based `pos`.
    pub fn column(&self, pos: usize) -> Option<&Column> {
        self.cols.descs.get(pos)
    }

    pub fn columns(&self) -> &[Column] {
        &self.cols.descs
    }

    /// Fetches rows into the column buffers. Returns the number of fetched rows.
    fn fetch(&mut self, nrows: usize, orientation: u16, offset: i32) -> Result<usize> {
        let stmt = self.stmt.get();
        let err = self.err.get();
        let res = unsafe { OCIStmtFetch2(stmt, err, nrows as u32, orientation, offset, OCI_DEFAULT) };
        if res != OCI_NO_DATA {
            crate::err::check(res, err)?;
        }
        let fetched : u32 = oci::handle::get_attr(stmt, OCI_ATTR_ROWS_FETCHED, err)?;
        if res == OCI_NO_DATA && !self.settings.scrollable {
            self.eof = true;
        }
        self.fetched = fetched as usize;
        self.current = 0;
        Ok( fetched as usize )
    }

    fn scroll(&mut self, orientation: u16, offset: i32) -> Result<Option<Row<'_, 'a>>> {
        if !self.settings.scrollable {
            return Err( Error::lib(LibError::StmtNotScrollable) );
        }
        if self.fetch(1, orientation, offset)? == 0 {
            return Ok(None);
        }
        let pos : u32 = oci::handle::get_attr(self.stmt.get(), OCI_ATTR_CURRENT_POSITION, self.err.get())?;
        self.current_row = pos as usize;
        Ok( Some( Row { rows: self, idx: 0 } ) )
    }

    /**
        Returns the next row, or `None` when there are no more rows.
    */
    pub fn next(&mut self) -> Result<Option<Row<'_, 'a>>> {
        if self.settings.scrollable {
            return self.scroll(OCI_FETCH_NEXT, 0);
        }
        if self.fetched > 0 && self.current + 1 < self.fetched {
            self.current += 1;
        } else if self.eof || self.fetch(self.settings.fetch_size.max(1), OCI_FETCH_NEXT, 0)? == 0 {
            self.fetched = 0;
            return Ok(None);
        }
        self.current_row += 1;
        let idx = self.current;
        Ok( Some( Row { rows: self, idx } ) )
    }

    /// Returns the previous row. Requires a scrollable statement.
    pub fn prev(&mut self) -> Result<Option<Row<'_, 'a>>> {
        self.scroll(OCI_FETCH_PRIOR, 0)
    }

    /// Returns the first row. Requires a scrollable statement.
    pub fn first(&mut self) -> Result<Option<Row<'_, 'a>>> {
        self.scroll(OCI_FETCH_FIRST, 0)
    }

    /// Returns the last row. Requires a scrollable statement.
    pub fn last(&mut self) -> Result<Option<Row<'_, 'a>>> {
        self.scroll(OCI_FETCH_LAST, 0)
    }

    /**
        Moves to the row at the 1-based position `offset`, or `offset` rows away from
        the current one. Requires a scrollable statement.

        # Example

        ```no_run
        use oracall::{FetchMode, SeekMode};

        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let mut stmt = conn.prepare("SELECT level FROM dual CONNECT BY level <= 10")?;
        stmt.set_fetch_mode(FetchMode::Scrollable);
        let mut rows = stmt.query(())?;
        let row = rows.seek(SeekMode::Absolute, 7)?.expect("7th row");
        let num : u32 = row.get(0)?.unwrap();
        assert_eq!(num, 7);
        let row = rows.seek(SeekMode::Relative, -2)?.expect("5th row");
        let num : u32 = row.get(0)?.unwrap();
        assert_eq!(num, 5);
        assert_eq!(rows.current_row(), 5);
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn seek(&mut self, mode: SeekMode, offset: i32) -> Result<Option<Row<'_, 'a>>> {
        match mode {
            SeekMode::Absolute => self.scroll(OCI_FETCH_ABSOLUTE, offset),
            SeekMode::Relative => self.scroll(OCI_FETCH_RELATIVE, offset),
        }
    }

    /// Returns the 1-based position of the current row, 0 before the first fetch.
    pub fn current_row(&self) -> usize {
        self.current_row
    }

    /// Returns the number of rows fetched so far.
    pub fn row_count(&self) -> Result<usize> {
        let count : u32 = oci::handle::get_attr(self.stmt.get(), OCI_ATTR_ROW_COUNT, self.err.get())?;
        Ok( count as usize )
    }
}

/// A row of a result set.
pub struct Row<'r, 'a> {
    rows: &'r Rows<'a>,
    idx: usize,
}

impl<'r, 'a> Row<'r, 'a> {
    /// Returns `true` if the column value is NULL.
    pub fn is_null(&self, pos: impl Position) -> Result<bool> {
        let col = pos.index(&self.rows.cols.descs)?;
        Ok( self.rows.cols.bufs[col].is_null(self.idx) )
    }

    /**
        Returns the value of the column at `pos`, or `None` if the value is NULL.

        Columns can be referred to by their 0-based index or by their name.
    */
    pub fn get<T: FromSql<'a>>(&self, pos: impl Position) -> Result<Option<T>> {
        let col = pos.index(&self.rows.cols.descs)?;
        let buf = &self.rows.cols.bufs[col];
        if buf.is_null(self.idx) {
            return Ok(None);
        }
        let desc = &self.rows.cols.descs[col];
        let value = SqlValue {
            conn: self.rows.conn,
            column_type: desc.column_type(),
            type_info: desc.type_info(),
            lfprec: desc.precision().max(0) as u8,
            fsprec: desc.scale().max(0) as u8,
            data: buf.value_data(self.idx),
            ptr: buf.ptrs.get(self.idx),
            obj_ind: buf.obj_inds.get(self.idx).copied().unwrap_or(ptr::null_mut()),
        };
        T::value(&value).map(Some)
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.rows.column_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_buffers_use_lengths() {
        let mut buf = ColumnBuffer {
            define: Ptr::null(),
            column_type: ColumnType::Text,
            dtype: 0,
            elem_size: 6,
            data: vec![0u64; 2],
            inds: vec![OCI_IND_NOTNULL, OCI_IND_NULL],
            lens: vec![3, 0],
            ptrs: Vec::new(),
            obj_inds: Vec::new(),
        };
        let bytes = unsafe { std::slice::from_raw_parts_mut(buf.data.as_mut_ptr() as *mut u8, 16) };
        bytes[..3].copy_from_slice(b"abc");
        assert_eq!(buf.value_data(0), b"abc");
        assert!(!buf.is_null(0));
        assert!(buf.is_null(1));
        assert!(buf.is_null(2));
    }
}
