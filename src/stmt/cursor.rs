//! REF CURSORs and implicit results

use super::rows::{Columns, FetchSettings, Rows};
use crate::{
    Connection, Error, Result,
    column::Column,
    env::Env,
    err::LibError,
    oci::{self, *},
};
use libc::c_void;
use std::fmt;

/**
    A cursor that was returned by a PL/SQL block, either as an OUT argument,
    as a column value or as an implicit result.

    # Example

    ```no_run
    use oracall::Cursor;

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    let mut stmt = conn.prepare("
        BEGIN
            OPEN :emp FOR
                SELECT last_name
                  FROM hr.employees
                 WHERE manager_id IS NULL;
        END;
    ")?;
    let mut emp = Cursor::new(&conn)?;
    stmt.execute(&mut emp)?;
    let mut rows = emp.rows()?;
    let row = rows.next()?.expect("one row");
    let name : Option<String> = row.get(0)?;
    assert_eq!(name.as_deref(), Some("King"));
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct Cursor<'a> {
    conn: &'a Connection<'a>,
    stmt: Ptr<OCIStmt>,
    owned: bool,
    executed: bool,
    fetch_size: usize,
    long_max: usize,
}

impl Drop for Cursor<'_> {
    fn drop(&mut self) {
        let stmt = self.stmt.take();
        if self.owned && !stmt.is_null() {
            unsafe { OCIHandleFree(stmt as *mut c_void, OCI_HTYPE_STMT); }
        }
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cursor").field("executed", &self.executed).finish()
    }
}

impl<'a> Cursor<'a> {
    /// Creates a cursor that can be bound as an OUT argument of a PL/SQL block.
    pub fn new(conn: &'a Connection<'a>) -> Result<Self> {
        let stmt = Handle::<OCIStmt>::new(conn.env_ptr())?;
        let mut cursor = Self::from_handle(conn, stmt);
        cursor.executed = false;
        Ok(cursor)
    }

    /// Takes ownership of an executed statement handle.
    pub(crate) fn from_handle(conn: &'a Connection<'a>, mut stmt: Handle<OCIStmt>) -> Self {
        Self {
            conn, stmt: Ptr::new(stmt.release()), owned: true, executed: true,
            fetch_size: super::DEFAULT_FETCH_SIZE, long_max: super::DEFAULT_LONG_MAX_SIZE,
        }
    }

    /// Wraps an implicit result. Its handle is owned by the statement that returned it.
    pub(crate) fn from_result(conn: &'a Connection<'a>, stmt: *mut OCIStmt) -> Self {
        Self {
            conn, stmt: Ptr::new(stmt), owned: false, executed: true,
            fetch_size: super::DEFAULT_FETCH_SIZE, long_max: super::DEFAULT_LONG_MAX_SIZE,
        }
    }

    pub(crate) fn stmt_ptr(&self) -> *mut OCIStmt {
        self.stmt.get()
    }

    pub(crate) fn set_executed(&mut self) {
        self.executed = true;
    }

    /// Sets the number of rows that are fetched in one round-trip.
    pub fn set_fetch_size(&mut self, size: usize) {
        self.fetch_size = size.max(1);
    }

    pub fn fetch_size(&self) -> usize {
        self.fetch_size
    }

    /// Sets the number of rows the client prefetches.
    pub fn set_prefetch_size(&self, size: u32) -> Result<()> {
        oci::handle::set_attr(self.stmt.get(), OCI_ATTR_PREFETCH_ROWS, size, self.conn.err_ptr())
    }

    /// Sets the buffer size of LONG and LONG RAW columns.
    pub fn set_long_max_size(&mut self, size: usize) {
        self.long_max = size.min(u16::MAX as usize);
    }

    fn check_executed(&self) -> Result<()> {
        if self.executed {
            Ok(())
        } else {
            Err( Error::lib(LibError::StmtState("executed")) )
        }
    }

    /// Describes the columns of the cursor's select list.
    pub fn columns(&self) -> Result<Vec<Column>> {
        self.check_executed()?;
        Columns::describe(self.stmt.get(), self.conn.err_ptr(), self.conn)
    }

    /// Returns the rows of the cursor.
    pub fn rows(&mut self) -> Result<Rows<'_>> {
        self.check_executed()?;
        let settings = FetchSettings { fetch_size: self.fetch_size, long_max: self.long_max, scrollable: false };
        Rows::new(self.conn, self.stmt.get(), self.conn.err_ptr(), settings)
    }
}
