//! Direct path loading

use crate::{Connection, Error, Result, column::ColumnType, env::Env, err::{self, LibError}, oci::*, typeinfo::{TypeInfo, TypeInfoKind}, types::number, version::OciVersion};
use libc::c_void;
use std::{fmt, ptr, sync::Arc};

/// Outcome of `convert` and `load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirPathResult {
    /// All rows were processed
    Complete,
    /// Some rows could not be converted
    Error,
    /// The stream is full and has to be loaded before the rest of the rows are converted
    Full,
    /// A partially set entry needs more data
    Partial,
    /// There was nothing to process
    Empty,
}

/// How `convert` treats rows it cannot convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    /// Conversion stops at the first row in error. The next `convert` resumes from that row.
    Default,
    /// Rows in error are skipped and reported by `error_row` and `error_column`.
    Force,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotPrepared,
    Prepared,
    Converted,
    Terminated,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::NotPrepared => "not prepared",
            State::Prepared    => "prepared",
            State::Converted   => "converted",
            State::Terminated  => "terminated",
        }
    }
}

/// Loader side description of a column and the buffers of its entries.
struct DirPathColumn {
    sqlt: u16,
    max_size: usize,
    buf_size: usize,
    format: Option<String>,
    data: Vec<u8>,
    lens: Vec<u32>,
    flags: Vec<u8>,
}

impl DirPathColumn {
    fn is_number(&self) -> bool {
        self.sqlt == SQLT_NUM
    }

    /// Picks the external type in which `set_entry` values are provided.
    fn new(column_type: ColumnType, max_size: usize, format: Option<&str>) -> Result<Self> {
        let format = format.filter(|fmt| !fmt.is_empty());
        let mut col = Self {
            sqlt: SQLT_CHR, max_size, buf_size: max_size, format: None,
            data: Vec::new(), lens: Vec::new(), flags: Vec::new(),
        };
        match column_type {
            ColumnType::Text | ColumnType::Long | ColumnType::CLOB | ColumnType::NCLOB => {}
            ColumnType::Number | ColumnType::BinaryFloat | ColumnType::BinaryDouble => {
                if let Some(fmt) = format {
                    col.sqlt = SQLT_NUM;
                    col.format = Some(fmt.to_string());
                    col.max_size = std::mem::size_of::<OCINumber>();
                    col.buf_size = col.max_size;
                }
            }
            ColumnType::Date | ColumnType::Timestamp | ColumnType::TimestampTZ | ColumnType::TimestampLTZ
            | ColumnType::IntervalYM | ColumnType::IntervalDS => {
                if let Some(fmt) = format {
                    col.format = Some(fmt.to_string());
                    col.max_size = max_size.max(fmt.len());
                    col.buf_size = col.max_size;
                }
            }
            ColumnType::Raw | ColumnType::LongRaw | ColumnType::BLOB => {
                col.sqlt = SQLT_BIN;
            }
            _ => return Err( Error::lib(LibError::DatatypeNotSupported(column_type_code(column_type))) ),
        }
        Ok(col)
    }

    fn alloc(&mut self, rows: usize) {
        self.data = vec![0; self.buf_size * rows];
        self.lens = vec![0; rows];
        self.flags = vec![OCI_DIRPATH_COL_NULL; rows];
    }

    /// Returns the pointer and the length of the entry OCI reads.
    fn entry(&mut self, row: usize) -> (*mut u8, u32) {
        let offset = row * self.buf_size;
        let len = self.lens[row];
        if self.is_number() {
            // The first byte of an OCINumber is its length
            (self.data[offset + 1..].as_mut_ptr(), len)
        } else {
            (self.data[offset..].as_mut_ptr(), len)
        }
    }
}

fn column_type_code(column_type: ColumnType) -> u16 {
    match column_type {
        ColumnType::Unknown(code) => code,
        ColumnType::RowID         => SQLT_RDD,
        ColumnType::BFile         => SQLT_BFILE,
        ColumnType::Cursor        => SQLT_RSET,
        ColumnType::Object        => SQLT_NTY,
        ColumnType::Collection    => SQLT_NCO,
        ColumnType::Ref           => SQLT_REF,
        ColumnType::Boolean       => SQLT_BOL,
        _                         => 0,
    }
}

/**
    Bulk loads rows into a table, bypassing the SQL layer.

    Rows are placed into a column array with `set_entry`, converted into a stream with
    `convert` and sent to the server with `load`. `finish` commits the loaded data.

    # Example

    ```no_run
    use oracall::{DirPath, DirPathResult, TypeInfoKind};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    let table = conn.describe_type("hr.load_test", TypeInfoKind::Table)?;
    let mut dp = DirPath::new(&conn, &table, None, 3, 100)?;
    dp.set_column(0, "id", 10, Some("999999999"))?;
    dp.set_column(1, "name", 30, None)?;
    dp.set_column(2, "created", 10, Some("YYYY-MM-DD"))?;
    dp.prepare()?;

    for row in 0..dp.max_rows() {
        let id = (row + 1).to_string();
        let name = format!("row {}", row + 1);
        dp.set_entry(row, 0, Some(id.as_bytes()), true)?;
        dp.set_entry(row, 1, Some(name.as_bytes()), true)?;
        dp.set_entry(row, 2, Some(b"2024-01-31"), true)?;
    }
    if dp.convert()? == DirPathResult::Complete {
        dp.load()?;
    }
    dp.finish()?;
    assert_eq!(dp.row_count(), dp.max_rows());
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct DirPath<'a> {
    conn: &'a Connection<'a>,
    info: Arc<TypeInfo>,
    // Child handles are freed before the context they were allocated from
    strm: Handle<OCIDirPathStream>,
    arr: Handle<OCIDirPathColArray>,
    ctx: Handle<OCIDirPathCtx>,
    state: State,
    mode: ConversionMode,
    res_conv: DirPathResult,
    res_load: DirPathResult,
    cols: Vec<Option<DirPathColumn>>,
    max_rows: usize,
    cur_rows: usize,
    entries: usize,
    next_row: usize,
    converted: usize,
    loaded: usize,
    processed: usize,
    load_offset: u32,
    err_rows: Vec<usize>,
    err_cols: Vec<usize>,
    err_row_idx: usize,
    err_col_idx: usize,
}

impl fmt::Debug for DirPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DirPath")
            .field("table", &self.info.full_name())
            .field("state", &self.state)
            .field("rows", &self.cur_rows)
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl<'a> DirPath<'a> {
    /**
        Creates a loader of `num_cols` columns of the table `info` describes, and of the
        `partition` of it when one is named. `num_rows` is the requested size of the
        column array. OCI can reduce it, `max_rows` reports the actual size after `prepare`.
    */
    pub fn new(conn: &'a Connection<'a>, info: &Arc<TypeInfo>, partition: Option<&str>, num_cols: usize, num_rows: usize) -> Result<Self> {
        if info.kind() != TypeInfoKind::Table {
            return Err( Error::lib(LibError::TypeInfoDatatype(info.full_name(), "table")) );
        }
        if num_cols == 0 || num_cols > info.column_count() {
            return Err( Error::lib(LibError::OutOfBounds(num_cols)) );
        }
        if num_rows == 0 || num_rows > u16::MAX as usize {
            return Err( Error::lib(LibError::OutOfBounds(num_rows)) );
        }
        let err = conn.err_ptr();
        let ctx = Handle::<OCIDirPathCtx>::new(conn.env_ptr())?;
        ctx.set_attr(OCI_ATTR_NAME, info.name(), err)?;
        if !info.schema().is_empty() {
            ctx.set_attr(OCI_ATTR_SCHEMA_NAME, info.schema(), err)?;
        }
        if let Some(partition) = partition.filter(|name| !name.is_empty()) {
            ctx.set_attr(OCI_ATTR_SUB_NAME, partition, err)?;
        }
        ctx.set_attr(OCI_ATTR_NUM_ROWS, num_rows as u32, err)?;
        ctx.set_attr(OCI_ATTR_NUM_COLS, num_cols as u16, err)?;

        Ok( Self {
            conn, info: Arc::clone(info),
            strm: Handle::null(), arr: Handle::null(), ctx,
            state: State::NotPrepared,
            mode: ConversionMode::Default,
            res_conv: DirPathResult::Empty,
            res_load: DirPathResult::Empty,
            cols: (0..num_cols).map(|_| None).collect(),
            max_rows: num_rows,
            cur_rows: num_rows,
            entries: 0, next_row: 0, converted: 0, loaded: 0, processed: 0, load_offset: 0,
            err_rows: Vec::new(), err_cols: Vec::new(), err_row_idx: 0, err_col_idx: 0,
        } )
    }

    fn check_state(&self, expected: State) -> Result<()> {
        if self.state != expected {
            Err( Error::lib(LibError::DirPathState(expected.name())) )
        } else {
            Ok(())
        }
    }

    fn err_ptr(&self) -> *mut OCIError {
        self.conn.err_ptr()
    }

    /**
        Describes the column at `pos` of the loaded row.

        `max_size` is the largest entry size in bytes. `format` is the date format of a
        date, timestamp or interval column, or the number format of a numeric column.
        Numeric entries with a format are converted on the client, otherwise the server
        converts their text.
    */
    pub fn set_column(&mut self, pos: usize, name: &str, max_size: usize, format: Option<&str>) -> Result<()> {
        self.check_state(State::NotPrepared)?;
        if pos >= self.cols.len() {
            return Err( Error::lib(LibError::OutOfBounds(pos)) );
        }
        let table_pos = self.info.columns().iter()
            .position(|col| col.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::lib(LibError::ColumnNotFound(name.to_string())))?;
        let table_col = &self.info.columns()[table_pos];
        let col = DirPathColumn::new(table_col.column_type(), max_size, format)?;

        let err = self.err_ptr();
        let list : *mut OCIParam = self.ctx.get_attr(OCI_ATTR_LIST_COLUMNS, err)?;
        let mut param = ptr::null_mut::<c_void>();
        param_get(list as *const c_void, OCI_DTYPE_PARAM, err, &mut param, pos as u32 + 1)?;
        let size_as_u32 = self.conn.version() >= OciVersion::new(10, 1, 0);
        let res = describe_column(param, name, &col, table_col.precision(), table_col.scale(), size_as_u32, err);
        unsafe { OCIDescriptorFree(param, OCI_DTYPE_PARAM); }
        res?;

        self.cols[pos] = Some(col);
        Ok(())
    }

    /// Prepares the load. All columns must be described by this point.
    pub fn prepare(&mut self) -> Result<()> {
        self.check_state(State::NotPrepared)?;
        if self.cols.iter().any(Option::is_none) {
            return Err( Error::lib(LibError::DirPathState("fully described")) );
        }
        let err = self.err_ptr();
        catch!{err =>
            OCIDirPathPrepare(self.ctx.get(), self.conn.svc_ptr(), err)
        }
        let env = self.conn.env_ptr();
        self.arr = Handle::new_child(self.ctx.get() as *mut c_void, env, err)?;
        self.strm = Handle::new_child(self.ctx.get() as *mut c_void, env, err)?;

        let num_rows : u32 = self.arr.get_attr(OCI_ATTR_NUM_ROWS, err)?;
        self.max_rows = num_rows as usize;
        self.cur_rows = self.max_rows;
        for col in self.cols.iter_mut().flatten() {
            col.alloc(self.max_rows);
        }
        self.state = State::Prepared;
        log::debug!("direct path load of {} prepared for {} rows", self.info.full_name(), self.max_rows);
        Ok(())
    }

    /**
        Sets the value of the column `col` of the row `row`. `None` sets it to NULL.
        An entry that is not `complete` is continued by the next `set_entry` of the same
        row and column after `convert` returned `DirPathResult::Partial`.
    */
    pub fn set_entry(&mut self, row: usize, col: usize, value: Option<&[u8]>, complete: bool) -> Result<()> {
        self.check_state(State::Prepared)?;
        if row >= self.cur_rows {
            return Err( Error::lib(LibError::OutOfBounds(row)) );
        }
        let err = self.conn.err_ptr();
        let dpcol = self.cols.get_mut(col).and_then(Option::as_mut).ok_or_else(|| Error::lib(LibError::OutOfBounds(col)))?;
        let offset = row * dpcol.buf_size;
        let (len, flag) = match value {
            None => (0, OCI_DIRPATH_COL_NULL),
            Some(bytes) => {
                let flag = if complete { OCI_DIRPATH_COL_COMPLETE } else { OCI_DIRPATH_COL_PARTIAL };
                if dpcol.is_number() {
                    let txt = std::str::from_utf8(bytes).map_err(|_| Error::lib(LibError::ArgInvalidValue("numeric entry")))?;
                    let fmt = dpcol.format.as_deref().unwrap_or_default();
                    let num = number::from_string(txt, fmt, err)?;
                    dpcol.data[offset..offset + dpcol.buf_size].copy_from_slice(&num.bytes);
                    (num.bytes[0] as usize, flag)
                } else {
                    let len = bytes.len().min(dpcol.max_size);
                    dpcol.data[offset..offset + len].copy_from_slice(&bytes[..len]);
                    (len, flag)
                }
            }
        };
        dpcol.lens[row] = len as u32;
        dpcol.flags[row] = flag;
        Ok(())
    }

    /// Limits the next conversion to the first `num_rows` rows of the column array.
    pub fn set_current_rows(&mut self, num_rows: usize) -> Result<()> {
        self.check_state(State::Prepared)?;
        if num_rows == 0 || num_rows > self.max_rows {
            return Err( Error::lib(LibError::OutOfBounds(num_rows)) );
        }
        self.cur_rows = num_rows;
        Ok(())
    }

    pub fn current_rows(&self) -> usize {
        self.cur_rows
    }

    /// Returns the size of the column array.
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Moves the entries from `row_from` into the OCI column array.
    fn set_array(&mut self, row_from: usize) -> Result<()> {
        let err = self.conn.err_ptr();
        let arr = self.arr.get();
        self.entries = 0;
        for row in row_from..self.cur_rows {
            for (pos, col) in self.cols.iter_mut().enumerate() {
                if let Some(col) = col {
                    let flag = col.flags[row];
                    let (data, len) = col.entry(row);
                    catch!{err =>
                        OCIDirPathColArrayEntrySet(arr, err, self.entries as u32, pos as u16, data, len, flag)
                    }
                }
            }
            self.entries += 1;
        }
        Ok(())
    }

    fn array_to_stream(&mut self, row_from: usize) -> Result<DirPathResult> {
        let err = self.err_ptr();
        let res = unsafe {
            OCIDirPathColArrayToStream(self.arr.get(), self.ctx.get(), self.strm.get(), err, self.entries as u32, 0)
        };
        let mut failure = None;
        let status = match res {
            OCI_SUCCESS | OCI_SUCCESS_WITH_INFO => {
                self.state = State::Converted;
                DirPathResult::Complete
            }
            OCI_CONTINUE => {
                self.state = State::Converted;
                DirPathResult::Full
            }
            OCI_NEED_DATA => DirPathResult::Partial,
            OCI_ERROR => {
                if self.mode == ConversionMode::Default {
                    failure = Some(Error::oci(err, res));
                }
                DirPathResult::Error
            }
            _ => {
                err::check(res, err)?;
                DirPathResult::Error
            }
        };
        if status == DirPathResult::Complete {
            self.converted += self.entries;
        } else {
            let err_col : u16 = self.arr.get_attr(OCI_ATTR_COL_COUNT, err)?;
            let err_row : u32 = self.arr.get_attr(OCI_ATTR_ROW_COUNT, err)?;
            self.converted += err_row as usize;
            match status {
                DirPathResult::Error => {
                    self.err_rows.push(row_from + err_row as usize);
                    self.err_cols.push(err_col as usize);
                }
                DirPathResult::Full => {
                    self.next_row = row_from + err_row as usize;
                }
                _ => {}
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(status),
        }
    }

    /**
        Converts the entries of the column array into a stream.

        In `ConversionMode::Default` a conversion error is returned as an `Err` and the next
        call resumes from the faulted row. In `ConversionMode::Force` the rows in error are
        skipped.

        `DirPathResult::Full` means the stream must be loaded and `convert` called again for
        the remaining rows.
    */
    pub fn convert(&mut self) -> Result<DirPathResult> {
        self.check_state(State::Prepared)?;
        self.processed = 0;

        let mut row_from = 0;
        if self.res_conv == DirPathResult::Full {
            row_from = self.next_row;
            catch!{self.err_ptr() =>
                OCIDirPathStreamReset(self.strm.get(), self.err_ptr())
            }
        } else if self.mode == ConversionMode::Default {
            if let Some(&row) = self.err_rows.last() {
                row_from = row;
            }
        }
        self.res_conv = DirPathResult::Error;
        self.set_array(row_from)?;
        self.res_conv = self.array_to_stream(row_from)?;

        if self.mode == ConversionMode::Force {
            while self.res_conv == DirPathResult::Error && self.err_rows.len() <= self.cur_rows {
                let row_from = self.err_rows.last().map(|row| row + 1).unwrap_or_default();
                self.set_array(row_from)?;
                self.res_conv = self.array_to_stream(row_from)?;
            }
        }
        self.processed = self.converted;
        log::trace!("converted {} rows into the stream: {:?}", self.converted, self.res_conv);
        Ok(self.res_conv)
    }

    fn load_stream(&mut self) -> Result<(DirPathResult, Option<Error>)> {
        let err = self.err_ptr();
        let res = unsafe { OCIDirPathLoadStream(self.ctx.get(), self.strm.get(), err) };
        let mut failure = None;
        let status = match res {
            OCI_SUCCESS | OCI_SUCCESS_WITH_INFO => {
                self.state = State::Prepared;
                DirPathResult::Complete
            }
            OCI_NO_DATA   => DirPathResult::Empty,
            OCI_NEED_DATA => DirPathResult::Partial,
            OCI_ERROR => {
                failure = Some(Error::oci(err, res));
                DirPathResult::Error
            }
            _ => {
                err::check(res, err)?;
                DirPathResult::Error
            }
        };
        let loaded : u32 = self.strm.get_attr(OCI_ATTR_ROW_COUNT, err)?;
        self.load_offset = self.strm.get_attr(OCI_ATTR_STREAM_OFFSET, err)?;
        self.loaded += loaded as usize;
        self.processed += loaded as usize;

        if status != DirPathResult::Complete {
            let row = match self.err_rows.last() {
                Some(&last) => last + loaded as usize + 1,
                None => self.loaded,
            };
            self.err_rows.push(row);
            self.err_cols.push(0);
        }
        Ok((status, failure))
    }

    /**
        Loads the converted stream into the table. Rows that the server rejects are
        skipped and reported by `error_row`. The error is returned when the load
        cannot get past it.
    */
    pub fn load(&mut self) -> Result<DirPathResult> {
        self.check_state(State::Converted)?;
        self.processed = 0;
        self.err_rows.clear();
        self.err_cols.clear();
        self.err_row_idx = 0;
        self.err_col_idx = 0;

        let (mut status, mut failure) = self.load_stream()?;
        let mut load_offset = self.load_offset;
        while status == DirPathResult::Error {
            (status, failure) = self.load_stream()?;
            // the stream did not advance, thus the error is not about a row
            if load_offset >= self.load_offset {
                break;
            }
            load_offset = self.load_offset;
        }
        self.res_load = status;
        log::trace!("loaded {} rows: {:?}", self.loaded, status);
        match (status, failure) {
            (DirPathResult::Error, Some(err)) => Err(err),
            _ => Ok(status),
        }
    }

    /// Commits the loaded rows and ends the load.
    pub fn finish(&mut self) -> Result<()> {
        self.check_state(State::Prepared)?;
        catch!{self.err_ptr() =>
            OCIDirPathFinish(self.ctx.get(), self.err_ptr())
        }
        self.state = State::Terminated;
        log::debug!("direct path load of {} finished, {} rows loaded", self.info.full_name(), self.loaded);
        Ok(())
    }

    /// Ends the load discarding the loaded rows.
    pub fn abort(&mut self) -> Result<()> {
        self.check_state(State::Prepared)?;
        catch!{self.err_ptr() =>
            OCIDirPathAbort(self.ctx.get(), self.err_ptr())
        }
        self.state = State::Terminated;
        log::debug!("direct path load of {} aborted", self.info.full_name());
        Ok(())
    }

    /// Saves the rows loaded so far. The load continues.
    pub fn save(&self) -> Result<()> {
        self.check_state(State::Prepared)?;
        catch!{self.err_ptr() =>
            OCIDirPathDataSave(self.ctx.get(), self.err_ptr(), OCI_DIRPATH_DATASAVE_SAVEONLY)
        }
        Ok(())
    }

    /// Flushes a partially loaded row.
    pub fn flush_row(&self) -> Result<()> {
        self.check_state(State::Prepared)?;
        catch!{self.err_ptr() =>
            OCIDirPathFlushRow(self.ctx.get(), self.err_ptr())
        }
        Ok(())
    }

    /// Clears the column array, the stream and the conversion counters.
    pub fn reset(&mut self) -> Result<()> {
        if self.state != State::Prepared && self.state != State::Converted {
            return Err( Error::lib(LibError::DirPathState(State::Prepared.name())) );
        }
        self.processed = 0;
        self.converted = 0;
        self.next_row = 0;
        self.load_offset = 0;
        self.err_rows.clear();
        self.err_cols.clear();
        self.err_row_idx = 0;
        self.err_col_idx = 0;
        self.res_conv = DirPathResult::Empty;
        let err = self.err_ptr();
        catch!{err =>
            OCIDirPathColArrayReset(self.arr.get(), err)
        }
        catch!{err =>
            OCIDirPathStreamReset(self.strm.get(), err)
        }
        self.state = State::Prepared;
        Ok(())
    }

    /// Sets the default date format of the loaded date columns.
    pub fn set_date_format(&self, format: &str) -> Result<()> {
        self.check_state(State::NotPrepared)?;
        self.ctx.set_attr(OCI_ATTR_DATEFORMAT, format, self.err_ptr())
    }

    /// Allows concurrent loads into the same segment.
    pub fn set_parallel(&self, enable: bool) -> Result<()> {
        self.check_state(State::NotPrepared)?;
        self.ctx.set_attr(OCI_ATTR_DIRPATH_PARALLEL, enable as u8, self.err_ptr())
    }

    /// Disables redo logging of the loaded data.
    pub fn set_no_log(&self, enable: bool) -> Result<()> {
        self.check_state(State::NotPrepared)?;
        self.ctx.set_attr(OCI_ATTR_DIRPATH_NOLOG, enable as u8, self.err_ptr())
    }

    /// Sets the number of entries of the date conversion cache and enables the cache.
    pub fn set_cache_size(&self, size: u32) -> Result<()> {
        self.check_state(State::NotPrepared)?;
        let err = self.err_ptr();
        self.ctx.set_attr(OCI_ATTR_DCACHE_SIZE, size, err)?;
        self.ctx.set_attr(OCI_ATTR_DCACHE_DISABLE, 0u8, err)
    }

    /// Sets the size in bytes of the stream buffer.
    pub fn set_buffer_size(&self, size: u32) -> Result<()> {
        self.check_state(State::NotPrepared)?;
        self.ctx.set_attr(OCI_ATTR_BUF_SIZE, size, self.err_ptr())
    }

    pub fn set_conversion_mode(&mut self, mode: ConversionMode) -> Result<()> {
        self.check_state(State::NotPrepared)?;
        self.mode = mode;
        Ok(())
    }

    pub fn conversion_mode(&self) -> ConversionMode {
        self.mode
    }

    /// Returns the number of rows loaded so far.
    pub fn row_count(&self) -> usize {
        self.loaded
    }

    /// Returns the number of rows processed by the last `convert` or `load`.
    pub fn affected_rows(&self) -> usize {
        self.processed
    }

    /// Returns the row of the next reported error. Each call moves to the next error.
    pub fn error_row(&mut self) -> Option<usize> {
        let row = self.err_rows.get(self.err_row_idx).copied();
        if row.is_some() {
            self.err_row_idx += 1;
        }
        row
    }

    /// Returns the column of the next reported error. Each call moves to the next error.
    pub fn error_column(&mut self) -> Option<usize> {
        let col = self.err_cols.get(self.err_col_idx).copied();
        if col.is_some() {
            self.err_col_idx += 1;
        }
        col
    }

    /// Returns the number of errors the last `convert` or `load` reported.
    pub fn error_count(&self) -> usize {
        self.err_rows.len()
    }

    pub fn last_load_result(&self) -> DirPathResult {
        self.res_load
    }
}

/// Sets the loader attributes of a column parameter of the direct path context.
fn describe_column(param: *mut c_void, name: &str, col: &DirPathColumn, precision: i16, scale: i8, size_as_u32: bool, err: *mut OCIError) -> Result<()> {
    attr::set(OCI_ATTR_NAME, name, OCI_DTYPE_PARAM, param, err)?;
    attr::set(OCI_ATTR_DATA_TYPE, col.sqlt, OCI_DTYPE_PARAM, param, err)?;
    if size_as_u32 {
        attr::set(OCI_ATTR_DATA_SIZE, col.max_size as u32, OCI_DTYPE_PARAM, param, err)?;
    } else {
        attr::set(OCI_ATTR_DATA_SIZE, col.max_size.min(u16::MAX as usize) as u16, OCI_DTYPE_PARAM, param, err)?;
    }
    if precision != 0 {
        attr::set(OCI_ATTR_PRECISION, precision, OCI_DTYPE_PARAM, param, err)?;
    }
    if scale != 0 {
        attr::set(OCI_ATTR_SCALE, scale, OCI_DTYPE_PARAM, param, err)?;
    }
    if let Some(fmt) = col.format.as_deref() {
        if !col.is_number() {
            attr::set(OCI_ATTR_DATEFORMAT, fmt, OCI_DTYPE_PARAM, param, err)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_buffers() {
        let col = DirPathColumn::new(ColumnType::Number, 10, Some("999")).unwrap();
        assert_eq!(col.sqlt, SQLT_NUM);
        assert_eq!(col.buf_size, std::mem::size_of::<OCINumber>());

        let col = DirPathColumn::new(ColumnType::Number, 10, None).unwrap();
        assert_eq!(col.sqlt, SQLT_CHR);
        assert_eq!(col.buf_size, 10);

        let col = DirPathColumn::new(ColumnType::Date, 8, Some("YYYY-MM-DD HH24:MI")).unwrap();
        assert_eq!(col.max_size, 16);
        assert_eq!(col.format.as_deref(), Some("YYYY-MM-DD HH24:MI"));

        let col = DirPathColumn::new(ColumnType::Raw, 16, None).unwrap();
        assert_eq!(col.sqlt, SQLT_BIN);

        assert!(DirPathColumn::new(ColumnType::Object, 16, None).is_err());
    }

    #[test]
    fn number_entries_skip_length_byte() {
        let mut col = DirPathColumn::new(ColumnType::Number, 10, Some("999")).unwrap();
        col.alloc(2);
        col.lens[1] = 3;
        let base = col.data.as_ptr() as usize;
        let (data, len) = col.entry(1);
        assert_eq!(len, 3);
        assert_eq!(data as usize - base, col.buf_size + 1);
    }

    #[test]
    fn state_names() {
        assert_eq!(State::NotPrepared.name(), "not prepared");
        assert_eq!(State::Converted.name(), "converted");
    }
}
