//! SQL and PL/SQL statements

mod args;
mod bind;
mod cursor;
mod fromsql;
mod returning;
mod rows;

pub use args::{ToSql, ToSqlOut};
pub use cursor::Cursor;
pub use fromsql::FromSql;
pub use rows::{Position, Row, Rows, SeekMode};

use bind::Params;
use fromsql::SqlValue;
use returning::{ReturnBuffer, ReturnType, in_bind_callback, out_bind_callback};
use rows::{Columns, FetchSettings};
use crate::{
    Connection, Error, Result,
    column::Column,
    env::{Env, FormatKind},
    err::LibError,
    oci::{self, *},
    types::Ctx,
    version::{Feature, OciVersion},
};
use libc::c_void;
use std::{fmt, ptr};

pub(crate) const DEFAULT_FETCH_SIZE    : usize = 20;
pub(crate) const DEFAULT_PREFETCH_SIZE : u32   = 20;
pub(crate) const DEFAULT_LONG_MAX_SIZE : usize = 32767;

/// Kind of SQL statement as reported by OCI after the statement is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    Unknown,
    Select,
    Update,
    Delete,
    Insert,
    Create,
    Drop,
    Alter,
    Begin,
    Declare,
    Call,
    Merge,
}

impl From<u16> for StatementType {
    fn from(code: u16) -> Self {
        match code {
            OCI_STMT_SELECT  => StatementType::Select,
            OCI_STMT_UPDATE  => StatementType::Update,
            OCI_STMT_DELETE  => StatementType::Delete,
            OCI_STMT_INSERT  => StatementType::Insert,
            OCI_STMT_CREATE  => StatementType::Create,
            OCI_STMT_DROP    => StatementType::Drop,
            OCI_STMT_ALTER   => StatementType::Alter,
            OCI_STMT_BEGIN   => StatementType::Begin,
            OCI_STMT_DECLARE => StatementType::Declare,
            OCI_STMT_CALL    => StatementType::Call,
            OCI_STMT_MERGE   => StatementType::Merge,
            _                => StatementType::Unknown,
        }
    }
}

impl StatementType {
    /// Whether the statement is a PL/SQL block or a procedure call.
    pub fn is_plsql(self) -> bool {
        matches!(self, StatementType::Begin | StatementType::Declare | StatementType::Call)
    }

    pub fn is_dml(self) -> bool {
        matches!(self, StatementType::Update | StatementType::Delete | StatementType::Insert | StatementType::Merge)
    }
}

/// How the rows of a query are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Forward only
    Default,
    /// Rows can be fetched in any order
    Scrollable,
}

/// A prepared SQL or PL/SQL statement.
pub struct Statement<'a> {
    conn: &'a Connection<'a>,
    stmt: Ptr<OCIStmt>,
    err: Handle<OCIError>,
    sql: String,
    stmt_type: StatementType,
    params: Params,
    fetch_size: usize,
    long_max: usize,
    fetch_mode: FetchMode,
    bind_array_size: Option<usize>,
    returning: Vec<Box<ReturnBuffer>>,
    batch_errors: Vec<Error>,
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        let stmt = self.stmt.take();
        if stmt.is_null() {
            return;
        }
        let res = unsafe { OCIStmtRelease(stmt, self.err.get(), ptr::null(), 0, OCI_DEFAULT) };
        if res != OCI_SUCCESS {
            log::debug!("cannot release statement: {}", Error::oci(self.err.get(), res));
        }
    }
}

impl fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Statement").field("type", &self.stmt_type).field("sql", &self.sql).finish()
    }
}

impl Env for Statement<'_> {
    fn env_ptr(&self) -> *mut OCIEnv {
        self.conn.env_ptr()
    }

    fn err_ptr(&self) -> *mut OCIError {
        self.err.get()
    }
}

impl Ctx for Statement<'_> {
    fn ctx_ptr(&self) -> *mut c_void {
        self.conn.usr_ptr() as *mut c_void
    }

    fn format(&self, kind: FormatKind) -> String {
        self.conn.format(kind)
    }
}

impl<'a> Statement<'a> {
    pub(crate) fn new(conn: &'a Connection<'a>, sql: &str) -> Result<Self> {
        let err = Handle::<OCIError>::new(conn.env_ptr())?;
        let mut stmt = Ptr::<OCIStmt>::null();
        catch!{err.get() =>
            OCIStmtPrepare2(
                conn.svc_ptr(), stmt.as_mut_ptr(), err.get(),
                sql.as_ptr(), sql.len() as u32,
                ptr::null(), 0, OCI_NTV_SYNTAX, OCI_DEFAULT
            )
        }
        let info = Params::new(stmt.get(), err.get(), conn.env_ptr())
            .and_then(|params| {
                let code : u16 = oci::handle::get_attr(stmt.get(), OCI_ATTR_STMT_TYPE, err.get())?;
                oci::handle::set_attr(stmt.get(), OCI_ATTR_PREFETCH_ROWS, DEFAULT_PREFETCH_SIZE, err.get())?;
                Ok((params, StatementType::from(code)))
            });
        let (params, stmt_type) = match info {
            Ok(info) => info,
            Err(error) => {
                unsafe { OCIStmtRelease(stmt.get(), err.get(), ptr::null(), 0, OCI_DEFAULT); }
                return Err(error);
            }
        };
        log::debug!("prepared {:?} statement with {} placeholders", stmt_type, params.len());
        Ok( Self {
            conn, stmt, err, sql: sql.to_string(), stmt_type, params,
            fetch_size: DEFAULT_FETCH_SIZE,
            long_max: DEFAULT_LONG_MAX_SIZE,
            fetch_mode: FetchMode::Default,
            bind_array_size: None,
            returning: Vec::new(),
            batch_errors: Vec::new(),
        } )
    }

    fn get_attr<V: attr::AttrGet>(&self, attr_type: u32) -> Result<V> {
        oci::handle::get_attr(self.stmt.get(), attr_type, self.err.get())
    }

    fn set_attr<V: attr::AttrSet>(&self, attr_type: u32, attr_val: V) -> Result<()> {
        oci::handle::set_attr(self.stmt.get(), attr_type, attr_val, self.err.get())
    }

    pub fn connection(&self) -> &'a Connection<'a> {
        self.conn
    }

    /// Returns the SQL text of the statement.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn statement_type(&self) -> StatementType {
        self.stmt_type
    }

    /// Returns the number of unique placeholders.
    pub fn bind_count(&self) -> usize {
        self.params.len()
    }

    /// Returns the name of the placeholder at 0-based `pos` (without the leading colon).
    pub fn bind_name(&self, pos: usize) -> Option<&str> {
        if pos < self.params.len() { Some(self.params.name(pos)) } else { None }
    }

    fn bind_args(&mut self, args: &impl ToSql) -> Result<()> {
        self.params.start();
        args.bind_to(0, &mut self.params)?;
        for buf in self.returning.iter_mut() {
            buf.reset();
            let idx = self.params.index_of(&buf.name)?;
            let kind = buf.kind;
            let ctx = &mut **buf as *mut ReturnBuffer as *mut c_void;
            self.params.bind_dynamic(idx, kind.sql_type(), kind.size(), ctx, in_bind_callback, out_bind_callback)?;
        }
        Ok(())
    }

    /// Number of times a DML statement is executed: the size of the bound arrays.
    fn iterations(&self) -> Result<u32> {
        if self.stmt_type == StatementType::Select {
            return Ok(0);
        }
        let array_size = self.params.array_size();
        let iters = match self.bind_array_size {
            Some(size) if array_size > 0 && size > array_size => {
                return Err( Error::lib(LibError::BindArraySize(size, array_size)) );
            }
            Some(size) if array_size > 0 => size,
            _ => array_size,
        };
        let iters = iters.max(1);
        self.params.check_iterations(iters)?;
        Ok( iters as u32 )
    }

    fn exec(&mut self, iters: u32, mode: u32) -> Result<()> {
        let mut mode = mode;
        if self.stmt_type == StatementType::Select && self.fetch_mode == FetchMode::Scrollable {
            mode |= OCI_STMT_SCROLLABLE_READONLY;
        }
        if iters > 1 {
            mode |= OCI_BATCH_ERRORS;
        }
        if self.conn.autocommit() && self.stmt_type != StatementType::Select && mode & (OCI_PARSE_ONLY | OCI_DESCRIBE_ONLY) == 0 {
            mode |= OCI_COMMIT_ON_SUCCESS;
        }
        let err = self.err.get();
        let res = unsafe {
            OCIStmtExecute(self.conn.svc_ptr(), self.stmt.get(), err, iters, 0, ptr::null(), ptr::null_mut(), mode)
        };
        if only_row_errors(res, iters, || crate::err::oracle_code(err)) {
            self.collect_batch_errors()?;
            if !self.batch_errors.is_empty() {
                log::debug!("executed {:?} statement, {} iteration(s), {} failed", self.stmt_type, iters, self.batch_errors.len());
                return Ok(());
            }
        }
        match res {
            OCI_NO_DATA if !self.stmt_type.is_plsql() => {}
            OCI_NO_DATA => return Err( Error::oci(err, res) ),
            _ => { crate::err::check(res, err)?; }
        }
        log::debug!("executed {:?} statement, {} iteration(s)", self.stmt_type, iters);
        if iters > 1 {
            self.collect_batch_errors()?;
        }
        Ok(())
    }

    fn collect_batch_errors(&mut self) -> Result<()> {
        self.batch_errors.clear();
        let err = self.err.get();
        let num_errors : u32 = self.get_attr(OCI_ATTR_NUM_DML_ERRORS)?;
        if num_errors == 0 {
            return Ok(());
        }
        let mut row_err = Handle::<OCIError>::new(self.conn.env_ptr())?;
        for i in 0..num_errors {
            catch!{err =>
                OCIParamGet(err as *const c_void, OCI_HTYPE_ERROR, err, row_err.as_mut_ptr() as *mut *mut c_void, i)
            }
            let offset : u32 = oci::handle::get_attr(row_err.get(), OCI_ATTR_DML_ROW_OFFSET, err)?;
            self.batch_errors.push(Error::batch(row_err.get(), offset + 1));
        }
        Ok(())
    }

    /**
        Executes the statement. Returns the number of affected rows.

        Arrays are bound for array DML, in which case the statement is executed once for
        every element (or for the number of elements set by `set_bind_array_size`).
        Errors of individual iterations are reported by `batch_errors`.

        # Example

        ```no_run
        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let mut stmt = conn.prepare("
            INSERT INTO hr.regions (region_id, region_name) VALUES (:id, :name)
        ")?;
        let ids = [11, 12, 13];
        let names = ["Antarctica", "Atlantis", "Antarctica"];
        let num_rows = stmt.execute((("id", &ids[..]), ("name", &names[..])))?;
        assert_eq!(num_rows, 3);
        assert!(stmt.batch_errors().is_empty());
        # conn.rollback()?;
        # Ok::<(),oracall::Error>(())
        ```

        OUT arguments are passed as mutable references:

        ```no_run
        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let mut stmt = conn.prepare("
            BEGIN
                SELECT last_name, salary INTO :name, :salary
                  FROM hr.employees
                 WHERE employee_id = :id;
            END;
        ")?;
        let mut name = String::with_capacity(25);
        let mut salary = 0.0f64;
        stmt.execute((("id", 107), ("name", &mut name), ("salary", &mut salary)))?;
        assert_eq!(name, "Lorentz");
        assert_eq!(salary, 4200.0);
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn execute(&mut self, mut args: impl ToSql) -> Result<usize> {
        if self.stmt_type == StatementType::Select {
            return Err( Error::lib(LibError::StmtState("not a query")) );
        }
        self.batch_errors.clear();
        self.bind_args(&args)?;
        let iters = self.iterations()?;
        self.exec(iters, OCI_DEFAULT)?;
        args.update_from_bind(0, &self.params)?;
        self.affected_rows()
    }

    /**
        Executes the query and returns its result set.

        # Example

        ```no_run
        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let mut stmt = conn.prepare("
            SELECT country_name FROM hr.countries WHERE region_id = :region ORDER BY 1
        ")?;
        stmt.set_fetch_size(100);
        let mut rows = stmt.query(("region", 3))?;
        let row = rows.next()?.expect("first row");
        let name : Option<String> = row.get("COUNTRY_NAME")?;
        assert_eq!(name.as_deref(), Some("Australia"));
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn query(&mut self, mut args: impl ToSql) -> Result<Rows<'_>> {
        if self.stmt_type != StatementType::Select {
            return Err( Error::lib(LibError::StmtState("a query")) );
        }
        self.bind_args(&args)?;
        self.exec(0, OCI_DEFAULT)?;
        args.update_from_bind(0, &self.params)?;
        let settings = FetchSettings {
            fetch_size: self.fetch_size,
            long_max: self.long_max,
            scrollable: self.fetch_mode == FetchMode::Scrollable,
        };
        Rows::new(self.conn, self.stmt.get(), self.err.get(), settings)
    }

    /// Parses the statement on the server without executing it. Syntax errors are reported
    /// with their position in `parse_error_offset`.
    pub fn parse(&mut self) -> Result<()> {
        self.exec(0, OCI_PARSE_ONLY)
    }

    /// Describes the select list of a query without executing it.
    pub fn describe(&mut self) -> Result<Vec<Column>> {
        self.exec(0, OCI_DESCRIBE_ONLY)?;
        self.columns()
    }

    /// Returns the select-list columns of a described or executed query.
    pub fn columns(&self) -> Result<Vec<Column>> {
        Columns::describe(self.stmt.get(), self.err.get(), self.conn)
    }

    /// Returns the number of rows processed by the last execution.
    pub fn affected_rows(&self) -> Result<usize> {
        if self.conn.version() >= OciVersion::new(12, 1, 0) {
            let count : u64 = self.get_attr(OCI_ATTR_UB8_ROW_COUNT)?;
            Ok( count as usize )
        } else {
            let count : u32 = self.get_attr(OCI_ATTR_ROW_COUNT)?;
            Ok( count as usize )
        }
    }

    /// Returns the SQL_ID of the statement.
    pub fn sql_id(&self) -> Result<String> {
        self.get_attr(OCI_ATTR_SQL_ID)
    }

    /// Returns the position in the SQL text where the parse error was detected.
    pub fn parse_error_offset(&self) -> Result<usize> {
        let offset : u16 = self.get_attr(OCI_ATTR_PARSE_ERROR_OFFSET)?;
        Ok( offset as usize )
    }

    /// Returns the errors of individual rows of the last array DML. `Error::row` is 1-based.
    pub fn batch_errors(&self) -> &[Error] {
        &self.batch_errors
    }

    /// Returns `true` if the OUT argument bound to the named placeholder returned NULL.
    pub fn is_null(&self, name: &str) -> Result<bool> {
        let idx = self.params.index_of(name)?;
        Ok( self.params.is_null(idx) )
    }

    /// Sets the number of rows that are fetched in one round-trip.
    pub fn set_fetch_size(&mut self, size: usize) {
        self.fetch_size = size.max(1);
    }

    pub fn fetch_size(&self) -> usize {
        self.fetch_size
    }

    /// Sets the number of rows the client prefetches when the query is executed.
    pub fn set_prefetch_size(&self, size: u32) -> Result<()> {
        self.set_attr(OCI_ATTR_PREFETCH_ROWS, size)
    }

    pub fn prefetch_size(&self) -> Result<u32> {
        self.get_attr(OCI_ATTR_PREFETCH_ROWS)
    }

    /// Sets the memory the client may use for prefetched rows.
    pub fn set_prefetch_memory(&self, size: u32) -> Result<()> {
        self.set_attr(OCI_ATTR_PREFETCH_MEMORY, size)
    }

    pub fn prefetch_memory(&self) -> Result<u32> {
        self.get_attr(OCI_ATTR_PREFETCH_MEMORY)
    }

    pub fn set_fetch_mode(&mut self, mode: FetchMode) {
        self.fetch_mode = mode;
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Sets the buffer size of LONG and LONG RAW columns. It is capped at 65535 bytes.
    pub fn set_long_max_size(&mut self, size: usize) {
        self.long_max = size.clamp(1, u16::MAX as usize);
    }

    pub fn long_max_size(&self) -> usize {
        self.long_max
    }

    /**
        Sets the number of iterations of the next array DML. It cannot exceed the size
        of the arrays the arguments are bound with.
    */
    pub fn set_bind_array_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err( Error::lib(LibError::MinValue(size, 1)) );
        }
        let array_size = self.params.array_size();
        if array_size > 0 && size > array_size {
            return Err( Error::lib(LibError::BindArraySize(size, array_size)) );
        }
        self.bind_array_size = Some(size);
        Ok(())
    }

    pub fn bind_array_size(&self) -> usize {
        self.bind_array_size.unwrap_or_else(|| self.params.array_size().max(1))
    }

    /**
        Returns the next implicit result, which a PL/SQL block returned with
        `DBMS_SQL.RETURN_RESULT`, or `None` when all of them were retrieved.

        # Example

        ```no_run
        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let mut stmt = conn.prepare("
            DECLARE
                c1 SYS_REFCURSOR;
            BEGIN
                OPEN c1 FOR SELECT department_name FROM hr.departments WHERE department_id = 10;
                DBMS_SQL.RETURN_RESULT(c1);
            END;
        ")?;
        stmt.execute(())?;
        let mut cursor = stmt.next_result()?.expect("implicit result");
        let mut rows = cursor.rows()?;
        let row = rows.next()?.expect("one row");
        let name : Option<String> = row.get(0)?;
        assert_eq!(name.as_deref(), Some("Administration"));
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn next_result(&self) -> Result<Option<Cursor<'_>>> {
        self.conn.check_feature(Feature::ImplicitResults)?;
        let mut result = ptr::null_mut::<c_void>();
        let mut result_type = 0u32;
        let res = unsafe { OCIStmtGetNextResult(self.stmt.get(), self.err.get(), &mut result, &mut result_type, OCI_DEFAULT) };
        if res == OCI_NO_DATA || result.is_null() {
            return Ok(None);
        }
        crate::err::check(res, self.err.get())?;
        Ok( Some( Cursor::from_result(self.conn, result as *mut OCIStmt) ) )
    }

    fn register(&mut self, name: &str, kind: ReturnType) -> Result<()> {
        let idx = self.params.index_of(name)?;
        let name = self.params.name(idx).to_string();
        self.returning.retain(|buf| buf.name != name);
        self.returning.push(Box::new(ReturnBuffer::new(&name, kind, self.err.get())));
        Ok(())
    }

    /**
        Registers a `RETURNING ... INTO` placeholder for NUMBER values.

        # Example

        ```no_run
        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let mut stmt = conn.prepare("
            UPDATE hr.employees
               SET salary = salary * 1.1
             WHERE department_id = :dept
         RETURNING employee_id, last_name INTO :id, :name
        ")?;
        stmt.register_number(":id")?;
        stmt.register_string(":name", 25)?;
        let num_rows = stmt.execute(("dept", 60))?;
        assert_eq!(stmt.returned_count(), num_rows);
        let id : Option<u32> = stmt.returned(":id", 0)?;
        assert!(id.is_some());
        # conn.rollback()?;
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn register_number(&mut self, name: &str) -> Result<()> {
        self.register(name, ReturnType::Number)
    }

    /// Registers a `RETURNING ... INTO` placeholder for BINARY_DOUBLE values.
    pub fn register_double(&mut self, name: &str) -> Result<()> {
        self.register(name, ReturnType::Double)
    }

    /// Registers a `RETURNING ... INTO` placeholder for text of up to `max_len` bytes.
    pub fn register_string(&mut self, name: &str, max_len: usize) -> Result<()> {
        self.register(name, ReturnType::Text(max_len))
    }

    /// Registers a `RETURNING ... INTO` placeholder for RAW values of up to `max_len` bytes.
    pub fn register_raw(&mut self, name: &str, max_len: usize) -> Result<()> {
        self.register(name, ReturnType::Raw(max_len))
    }

    pub fn register_date(&mut self, name: &str) -> Result<()> {
        self.register(name, ReturnType::Date)
    }

    /// Returns the number of rows the last execution returned into the registered placeholders.
    pub fn returned_count(&self) -> usize {
        self.returning.iter().map(|buf| buf.len()).max().unwrap_or(0)
    }

    /// Returns the value the 0-based `row` returned into the registered placeholder.
    pub fn returned<T: FromSql<'a>>(&self, name: &str, row: usize) -> Result<Option<T>> {
        let idx = self.params.index_of(name)?;
        let name = self.params.name(idx);
        let buf = self.returning.iter()
            .find(|buf| buf.name == name)
            .ok_or_else(|| Error::lib(LibError::ItemNotFound))?;
        if row >= buf.len() {
            return Err( Error::lib(LibError::OutOfBounds(row)) );
        }
        match buf.value(row) {
            None => Ok(None),
            Some(data) => {
                let value = SqlValue {
                    conn: self.conn,
                    column_type: buf.kind.column_type(),
                    type_info: None,
                    lfprec: 0,
                    fsprec: 0,
                    data,
                    ptr: None,
                    obj_ind: ptr::null_mut(),
                };
                T::value(&value).map(Some)
            }
        }
    }
}

/// ORA-24381: error(s) in array DML
const ORA_ARRAY_DML_ERRORS : i32 = 24381;

/**
    Returns `true` when an array DML that ran in batch error mode failed only because some
    of its rows did. Such an execution succeeds and the rows are reported as batch errors.
*/
fn only_row_errors(res: i32, iters: u32, oracle_code: impl FnOnce() -> i32) -> bool {
    iters > 1 && (res == OCI_ERROR || res == OCI_SUCCESS_WITH_INFO) && oracle_code() == ORA_ARRAY_DML_ERRORS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_dml_row_errors() {
        assert!(only_row_errors(OCI_ERROR, 4, || 24381));
        assert!(only_row_errors(OCI_SUCCESS_WITH_INFO, 4, || 24381));
        assert!(!only_row_errors(OCI_ERROR, 4, || 942));
        assert!(!only_row_errors(OCI_SUCCESS, 4, || 24381));
        assert!(!only_row_errors(OCI_ERROR, 1, || panic!("single executions have no row errors")));
    }

    #[test]
    fn statement_types() {
        assert_eq!(StatementType::from(OCI_STMT_SELECT), StatementType::Select);
        assert_eq!(StatementType::from(OCI_STMT_MERGE), StatementType::Merge);
        assert_eq!(StatementType::from(99), StatementType::Unknown);
        assert!(StatementType::Declare.is_plsql());
        assert!(StatementType::Call.is_plsql());
        assert!(!StatementType::Insert.is_plsql());
        assert!(StatementType::Merge.is_dml());
        assert!(!StatementType::Select.is_dml());
    }
}
