mod common;

use oracall::*;
use std::cmp::Ordering;

#[test]
fn dates() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("SELECT :dt + 1, To_Char(:dt, 'YYYY-MM-DD HH24:MI:SS') FROM dual")?;
    let date = Date::with_time(1969, 7, 20, 20, 17, 40, &conn);
    let mut rows = stmt.query(("dt", &date))?;
    let row = rows.next()?.expect("a row");
    let next_day : Date = row.get(0)?.expect("date");
    let txt : Option<String> = row.get(1)?;
    assert_eq!(next_day.date_and_time(), (1969, 7, 21, 20, 17, 40));
    assert_eq!(txt.as_deref(), Some("1969-07-20 20:17:40"));

    assert_eq!(next_day.days_from(&date)?, 1);
    assert_eq!(date.compare(&next_day)?, Ordering::Less);
    let last_day = date.add_months(1)?.month_last_day()?;
    assert_eq!(last_day.date(), (1969, 8, 31));
    Ok(())
}

#[test]
fn numbers() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("SELECT :num * 2, :num / 8, 1e125 FROM dual")?;
    let num = Number::from_string("1234.5", "9999.9", &conn)?;
    let mut rows = stmt.query(("num", &num))?;
    let row = rows.next()?.expect("a row");

    let doubled : Number = row.get(0)?.expect("number");
    assert_eq!(doubled.to_int::<i32>()?, 2469);
    let eighth : f64 = row.get(1)?.expect("number");
    assert!((eighth - 154.3125).abs() < 1e-9);
    let big : Number = row.get(2)?.expect("number");
    assert_eq!(big.to_string("TME")?, "1E+125");
    let overflow : Result<Option<i64>> = row.get(2);
    assert!(overflow.is_err());
    Ok(())
}

#[test]
fn timestamps_and_intervals() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("
        SELECT :ts + :int, To_Timestamp_TZ('2021-03-14 01:59:00 America/New_York', 'YYYY-MM-DD HH24:MI:SS TZR')
          FROM dual
    ")?;
    let ts = TimestampTZ::with_date_and_time(2021, 3, 14, 1, 30, 0, 0, "UTC", &conn)?;
    let int = IntervalDS::with_day_second(1, 2, 3, 4, 0, &conn)?;
    let mut rows = stmt.query((("ts", &ts), ("int", &int)))?;
    let row = rows.next()?.expect("a row");

    let later : TimestampTZ = row.get(0)?.expect("timestamp");
    assert_eq!(later.date_and_time()?, (2021, 3, 15, 3, 33, 4, 0));
    let diff : IntervalDS = later.subtract(&ts)?;
    assert_eq!(diff.day_second()?, (1, 2, 3, 4, 0));
    assert_eq!(diff.compare(&int)?, Ordering::Equal);

    let ny : TimestampTZ = row.get(1)?.expect("timestamp");
    assert_eq!(ny.tz_name()?, "America/New_York");
    assert_eq!(ny.tz_offset()?, (-5, 0));

    let ym = IntervalYM::with_year_month(1, 6, &conn)?;
    assert_eq!(ym.to_string(1, 0)?, "+1-06");
    Ok(())
}

#[test]
fn rowids() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("SELECT ROWID FROM hr.regions WHERE region_id = 2")?;
    let mut rows = stmt.query(())?;
    let row = rows.next()?.expect("a row");
    let rowid : RowID = row.get(0)?.expect("rowid");
    assert_eq!(rowid.as_str().len(), 18);

    let mut stmt = conn.prepare("SELECT region_name FROM hr.regions WHERE ROWID = :id")?;
    let mut rows = stmt.query(("id", &rowid))?;
    let row = rows.next()?.expect("a row");
    let name : Option<String> = row.get(0)?;
    assert_eq!(name.as_deref(), Some("Americas"));
    Ok(())
}

#[test]
fn lobs() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    common::drop_quietly(&conn, "DROP TABLE test_lobs");
    conn.execute_immediate("
        CREATE TABLE test_lobs (
            id      NUMBER(4) PRIMARY KEY,
            text    CLOB,
            data    BLOB
        )
    ", ())?;

    let text = CLOB::temp(&conn, Cache::No)?;
    assert!(text.is_temporary()?);
    assert_eq!(text.append("Lorem ipsum ")?, 12);
    assert_eq!(text.append("dolor sit amet")?, 14);
    let data = BLOB::temp(&conn, Cache::No)?;
    data.write(0, &[0xca, 0xfe, 0xba, 0xbe])?;

    let mut stmt = conn.prepare("INSERT INTO test_lobs (id, text, data) VALUES (:id, :text, :data)")?;
    stmt.execute((("id", 1), ("text", &text), ("data", &data)))?;

    let mut stmt = conn.prepare("SELECT text, data FROM test_lobs WHERE id = :id FOR UPDATE")?;
    let mut rows = stmt.query(("id", 1))?;
    let row = rows.next()?.expect("a row");
    let text : CLOB = row.get(0)?.expect("clob");
    let data : BLOB = row.get(1)?.expect("blob");
    assert!(!text.is_temporary()?);
    assert_eq!(text.len()?, 26);
    assert_eq!(text.read(6, 5)?, "ipsum");
    assert_eq!(data.read(0, 10)?, vec![0xca, 0xfe, 0xba, 0xbe]);

    text.trim(11)?;
    assert_eq!(text.read(0, 100)?, "Lorem ipsum");
    data.append(&[0x00, 0x01])?;
    assert_eq!(data.len()?, 6);

    conn.rollback()?;
    common::drop_quietly(&conn, "DROP TABLE test_lobs");
    Ok(())
}

#[test]
fn nclobs() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let text = NCLOB::temp_nclob(&conn, Cache::No)?;
    assert!(text.is_nclob()?);
    assert_eq!(text.append("tête-à-tête")?, 11);
    let plain = NCLOB::temp(&conn, Cache::No)?;
    assert!(!plain.is_nclob()?);

    let mut stmt = conn.prepare("SELECT To_NClob('ünïcödé') FROM dual")?;
    let mut rows = stmt.query(())?;
    let row = rows.next()?.expect("a row");
    let fetched : NCLOB = row.get(0)?.expect("nclob");
    assert!(fetched.is_nclob()?);
    assert_eq!(fetched.read(0, 20)?, "ünïcödé");
    Ok(())
}

#[test]
fn bfiles() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut file = BFile::new(&conn, "NO_SUCH_DIR", "nothing.txt")?;
    assert_eq!(file.directory()?, "NO_SUCH_DIR");
    assert_eq!(file.name()?, "nothing.txt");
    file.set_name("NO_SUCH_DIR", "other.txt")?;
    assert_eq!(file.name()?, "other.txt");
    // the directory object does not exist
    assert!(file.exists().is_err());
    assert!(file.open().is_err());

    let mut stmt = conn.prepare("SELECT BFileName('NO_SUCH_DIR', :name) FROM dual")?;
    let mut rows = stmt.query("fetched.bin")?;
    let row = rows.next()?.expect("a row");
    let fetched : BFile = row.get(0)?.expect("bfile");
    assert_eq!(fetched.directory()?, "NO_SUCH_DIR");
    assert_eq!(fetched.name()?, "fetched.bin");

    let mut stmt = conn.prepare("
        BEGIN
            DBMS_LOB.FileGetName(:file, :dir, :name);
        END;
    ")?;
    let mut dir = String::with_capacity(30);
    let mut name = String::with_capacity(255);
    stmt.execute((("file", &file), ("dir", &mut dir), ("name", &mut name)))?;
    assert_eq!(dir, "NO_SUCH_DIR");
    assert_eq!(name, "other.txt");
    Ok(())
}
