mod common;

use oracall::*;

#[test]
fn connect_and_ping() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    assert_eq!(oracle.connection_count(), 1);
    assert_eq!(conn.state(), ConnectionState::LoggedOn);
    assert!(conn.is_connected()?);
    conn.ping()?;

    assert!(!conn.server_version().is_empty());
    assert!(conn.server_major_version() >= 11);
    assert!(conn.version() <= oracle.runtime_version());
    assert_eq!(conn.current_schema()?, dbuser.to_uppercase());
    assert!(!conn.db_name()?.is_empty());

    drop(conn);
    assert_eq!(oracle.connection_count(), 0);
    Ok(())
}

#[test]
fn session_attributes() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    conn.set_module("oracall tests")?;
    conn.set_action("session_attributes")?;
    conn.set_client_identifier("tester")?;

    let mut stmt = conn.prepare("
        SELECT Sys_Context('USERENV', 'MODULE'),
               Sys_Context('USERENV', 'ACTION'),
               Sys_Context('USERENV', 'CLIENT_IDENTIFIER')
          FROM dual
    ")?;
    let mut rows = stmt.query(())?;
    let row = rows.next()?.expect("one row");
    let module : Option<String> = row.get(0)?;
    let action : Option<String> = row.get(1)?;
    let client_id : Option<String> = row.get(2)?;
    assert_eq!(module.as_deref(), Some("oracall tests"));
    assert_eq!(action.as_deref(), Some("session_attributes"));
    assert_eq!(client_id.as_deref(), Some("tester"));
    Ok(())
}

#[test]
fn server_output() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    conn.enable_server_output(32000, 255)?;
    conn.execute_immediate("
        BEGIN
            FOR i IN 1..25 LOOP
                DBMS_OUTPUT.PUT_LINE('line ' || i);
            END LOOP;
        END;
    ", ())?;
    let mut lines = Vec::new();
    while let Some(line) = conn.server_output_line()? {
        lines.push(line);
    }
    assert_eq!(lines.len(), 25);
    assert_eq!(lines[0], "line 1");
    assert_eq!(lines[24], "line 25");
    conn.disable_server_output()?;
    Ok(())
}

#[test]
fn oracle_errors() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let res = conn.execute_immediate("DELETE FROM hr.no_such_table", ());
    let err = res.expect_err("table does not exist");
    assert_eq!(err.kind(), ErrorKind::Oracle);
    assert_eq!(err.code(), 942);
    assert!(err.message().starts_with("ORA-00942"));

    let last = last_error().expect("last error is recorded");
    assert_eq!(last.code(), 942);
    Ok(())
}

#[test]
fn transactions() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    assert!(!conn.autocommit());
    let trans = Transaction::new(&conn, 0, TransactionMode::READWRITE, None)?;
    conn.set_transaction(&trans)?;
    trans.start()?;
    let info = conn.transaction().expect("current transaction");
    assert_eq!(info, trans.info());

    let num_rows = conn.execute_immediate("UPDATE hr.regions SET region_name = region_name WHERE region_id = 1", ())?;
    assert_eq!(num_rows, 1);
    conn.rollback()?;

    let xid = Xid::new(1, b"oracall-gtrid", b"oracall-bqual")?;
    assert_eq!(xid.gtrid(), b"oracall-gtrid");
    assert_eq!(xid.bqual(), b"oracall-bqual");
    Ok(())
}

#[test]
fn global_transactions() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let xid = Xid::new(0x4f43, b"oracall-prepare", b"branch-1")?;
    let trans = Transaction::new(&conn, 60, TransactionMode::NEW, Some(&xid))?;
    assert!(trans.info().is_global());
    assert_eq!(trans.info().timeout(), 60);
    conn.set_transaction(&trans)?;
    trans.start()?;

    let num_rows = conn.execute_immediate("UPDATE hr.regions SET region_name = region_name WHERE region_id = 2", ())?;
    assert_eq!(num_rows, 1);
    trans.prepare()?;
    conn.rollback()?;

    // only heuristically completed transactions can be forgotten
    assert!(trans.forget().is_err());
    Ok(())
}

#[test]
fn xa_logon_needs_an_open_resource_manager() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;

    // nothing called xa_open for this name, so there is no XA environment to use
    let res = Connection::new(&oracle, "oracall_no_xa", &dbuser, &dbpass, SessionMode::XA);
    let err = res.err().expect("XA logon without xa_open");
    assert!(matches!(err.internal(), Some(LibError::ArgInvalidValue(_)) | Some(LibError::NotAvailable(_))));

    // regular logons are not affected
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;
    assert!(!conn.mode().contains(SessionMode::XA));
    Ok(())
}
