mod common;

use oracall::*;

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let mut stmt = conn.prepare(&format!("SELECT Count(*) FROM {}", table))?;
    let mut rows = stmt.query(())?;
    let row = rows.next()?.expect("a row");
    let count : Option<usize> = row.get(0)?;
    Ok(count.unwrap_or_default())
}

#[test]
fn load_table() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    common::drop_quietly(&conn, "DROP TABLE test_dirpath_load");
    conn.execute_immediate("
        CREATE TABLE test_dirpath_load (
            id      NUMBER(9),
            name    VARCHAR2(30),
            created DATE
        )
    ", ())?;

    let table = conn.describe_type("test_dirpath_load", TypeInfoKind::Table)?;
    let mut dp = DirPath::new(&conn, &table, None, 3, 50)?;
    dp.set_column(0, "ID", 10, Some("999999999"))?;
    dp.set_column(1, "name", 30, None)?;
    dp.set_column(2, "Created", 10, Some("YYYY-MM-DD"))?;
    assert!(dp.set_column(3, "missing", 10, None).is_err());
    dp.set_no_log(true)?;
    dp.prepare()?;
    assert!(dp.set_parallel(true).is_err());

    let max_rows = dp.max_rows();
    assert!(max_rows > 0 && max_rows <= 50);

    let mut next_id = 1;
    for _ in 0..3 {
        for row in 0..max_rows {
            let id = next_id.to_string();
            let name = format!("row {}", next_id);
            next_id += 1;
            dp.set_entry(row, 0, Some(id.as_bytes()), true)?;
            dp.set_entry(row, 1, Some(name.as_bytes()), true)?;
            let created : Option<&[u8]> = if row % 2 == 0 { Some(b"2024-01-31") } else { None };
            dp.set_entry(row, 2, created, true)?;
        }
        let mut res = dp.convert()?;
        loop {
            dp.load()?;
            if res != DirPathResult::Full {
                break;
            }
            res = dp.convert()?;
        }
        assert_eq!(res, DirPathResult::Complete);
        dp.reset()?;
    }
    dp.finish()?;
    assert_eq!(dp.row_count(), max_rows * 3);
    assert!(dp.finish().is_err());

    assert_eq!(count_rows(&conn, "test_dirpath_load")?, max_rows * 3);
    let mut stmt = conn.prepare("SELECT name, created FROM test_dirpath_load WHERE id = 2")?;
    let mut rows = stmt.query(())?;
    let row = rows.next()?.expect("a row");
    let name : Option<String> = row.get(0)?;
    assert_eq!(name.as_deref(), Some("row 2"));
    assert!(row.is_null(1)?);

    common::drop_quietly(&conn, "DROP TABLE test_dirpath_load");
    Ok(())
}

#[test]
fn forced_conversion() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    common::drop_quietly(&conn, "DROP TABLE test_dirpath_force");
    conn.execute_immediate("CREATE TABLE test_dirpath_force (id NUMBER(9), due DATE)", ())?;

    let table = conn.describe_type("test_dirpath_force", TypeInfoKind::Table)?;
    let mut dp = DirPath::new(&conn, &table, None, 2, 4)?;
    dp.set_column(0, "id", 10, Some("999999999"))?;
    dp.set_column(1, "due", 10, Some("YYYY-MM-DD"))?;
    dp.set_conversion_mode(ConversionMode::Force)?;
    assert_eq!(dp.conversion_mode(), ConversionMode::Force);
    dp.prepare()?;
    assert!(dp.max_rows() >= 4);

    // the second date cannot be converted
    let dates : [&[u8]; 4] = [b"2024-01-31", b"2024-13-45", b"2024-02-29", b"2024-03-31"];
    for (row, date) in dates.iter().enumerate() {
        let id = (row + 1).to_string();
        dp.set_entry(row, 0, Some(id.as_bytes()), true)?;
        dp.set_entry(row, 1, Some(*date), true)?;
    }
    dp.set_current_rows(4)?;
    assert_eq!(dp.current_rows(), 4);

    let res = dp.convert()?;
    assert_eq!(res, DirPathResult::Complete);
    assert_eq!(dp.error_count(), 1);
    assert_eq!(dp.error_row(), Some(1));
    assert_eq!(dp.error_column(), Some(1));
    assert_eq!(dp.error_row(), None);

    dp.load()?;
    dp.finish()?;
    assert_eq!(dp.row_count(), 3);
    assert_eq!(count_rows(&conn, "test_dirpath_force")?, 3);

    common::drop_quietly(&conn, "DROP TABLE test_dirpath_force");
    Ok(())
}

#[test]
fn full_stream_resumes() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    common::drop_quietly(&conn, "DROP TABLE test_dirpath_full");
    conn.execute_immediate("CREATE TABLE test_dirpath_full (id NUMBER(9), body VARCHAR2(2000))", ())?;

    let table = conn.describe_type("test_dirpath_full", TypeInfoKind::Table)?;
    let mut dp = DirPath::new(&conn, &table, None, 2, 100)?;
    dp.set_column(0, "id", 10, Some("999999999"))?;
    dp.set_column(1, "body", 2000, None)?;
    dp.set_buffer_size(16 * 1024)?;
    dp.prepare()?;

    let num_rows = dp.max_rows();
    let body = "x".repeat(2000);
    for row in 0..num_rows {
        let id = (row + 1).to_string();
        dp.set_entry(row, 0, Some(id.as_bytes()), true)?;
        dp.set_entry(row, 1, Some(body.as_bytes()), true)?;
    }

    let mut fills = 0;
    let mut res = dp.convert()?;
    loop {
        dp.load()?;
        if res != DirPathResult::Full {
            break;
        }
        fills += 1;
        res = dp.convert()?;
    }
    assert_eq!(res, DirPathResult::Complete);
    if num_rows > 8 {
        assert!(fills > 0);
    }
    dp.finish()?;
    assert_eq!(dp.row_count(), num_rows);

    // every row was loaded once
    let mut stmt = conn.prepare("SELECT Count(DISTINCT id), Min(id), Max(id) FROM test_dirpath_full")?;
    let mut rows = stmt.query(())?;
    let row = rows.next()?.expect("a row");
    let counts : (Option<usize>, Option<usize>, Option<usize>) = (row.get(0)?, row.get(1)?, row.get(2)?);
    assert_eq!(counts, (Some(num_rows), Some(1), Some(num_rows)));
    assert_eq!(count_rows(&conn, "test_dirpath_full")?, num_rows);

    drop(rows);
    drop(stmt);
    common::drop_quietly(&conn, "DROP TABLE test_dirpath_full");
    Ok(())
}

#[test]
fn conversion_error_resumes() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    common::drop_quietly(&conn, "DROP TABLE test_dirpath_resume");
    conn.execute_immediate("CREATE TABLE test_dirpath_resume (id NUMBER(9), due DATE)", ())?;

    let table = conn.describe_type("test_dirpath_resume", TypeInfoKind::Table)?;
    let mut dp = DirPath::new(&conn, &table, None, 2, 4)?;
    dp.set_column(0, "id", 10, Some("999999999"))?;
    dp.set_column(1, "due", 10, Some("YYYY-MM-DD"))?;
    assert_eq!(dp.conversion_mode(), ConversionMode::Default);
    dp.prepare()?;

    let dates : [&[u8]; 4] = [b"2024-01-31", b"2024-13-45", b"2024-02-29", b"2024-03-31"];
    for (row, date) in dates.iter().enumerate() {
        let id = (row + 1).to_string();
        dp.set_entry(row, 0, Some(id.as_bytes()), true)?;
        dp.set_entry(row, 1, Some(*date), true)?;
    }
    dp.set_current_rows(4)?;

    assert!(dp.convert().is_err());
    assert_eq!(dp.error_row(), Some(1));
    assert_eq!(dp.error_column(), Some(1));

    // the conversion restarts at the corrected row
    dp.set_entry(1, 1, Some(b"2024-12-25"), true)?;
    assert_eq!(dp.convert()?, DirPathResult::Complete);
    dp.load()?;
    dp.finish()?;
    assert_eq!(dp.row_count(), 4);
    assert_eq!(count_rows(&conn, "test_dirpath_resume")?, 4);

    let mut stmt = conn.prepare("SELECT To_Char(due, 'YYYY-MM-DD') FROM test_dirpath_resume WHERE id = 2")?;
    let mut rows = stmt.query(())?;
    let row = rows.next()?.expect("a row");
    let due : Option<String> = row.get(0)?;
    assert_eq!(due.as_deref(), Some("2024-12-25"));

    drop(rows);
    drop(stmt);
    common::drop_quietly(&conn, "DROP TABLE test_dirpath_resume");
    Ok(())
}
