mod common;

use oracall::*;

#[test]
fn named_and_positional_args() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("
        SELECT country_name
          FROM hr.countries
         WHERE region_id = :region AND country_id LIKE :prefix
      ORDER BY country_name
    ")?;
    assert_eq!(stmt.statement_type(), StatementType::Select);
    assert_eq!(stmt.bind_count(), 2);
    assert_eq!(stmt.bind_name(0), Some("REGION"));

    let mut names = Vec::new();
    let mut rows = stmt.query((("region", 1), ("prefix", "B%")))?;
    while let Some(row) = rows.next()? {
        let name : String = row.get("COUNTRY_NAME")?.unwrap_or_default();
        names.push(name);
    }
    assert_eq!(names, ["Belgium"]);

    let mut rows = stmt.query((1, "N%", ()))?;
    let row = rows.next()?.expect("a row");
    let name : Option<String> = row.get(0)?;
    assert_eq!(name.as_deref(), Some("Netherlands"));
    assert!(rows.next()?.is_none());
    Ok(())
}

#[test]
fn null_arguments() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("SELECT Nvl(:val, 'nothing') FROM dual")?;
    let mut rows = stmt.query(Option::<&str>::None)?;
    let row = rows.next()?.expect("a row");
    let val : Option<String> = row.get(0)?;
    assert_eq!(val.as_deref(), Some("nothing"));

    let mut rows = stmt.query(Some("something"))?;
    let row = rows.next()?.expect("a row");
    let val : Option<String> = row.get(0)?;
    assert_eq!(val.as_deref(), Some("something"));
    Ok(())
}

#[test]
fn out_args() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("
        BEGIN
            SELECT last_name, salary, commission_pct
              INTO :name, :salary, :commission
              FROM hr.employees
             WHERE employee_id = :id;
        END;
    ")?;
    assert!(stmt.statement_type().is_plsql());
    let mut name = String::with_capacity(25);
    let mut salary = 0u32;
    let mut commission : Option<String> = None;
    stmt.execute((("id", 107), ("name", &mut name), ("salary", &mut salary), ("commission", &mut commission)))?;
    assert_eq!(name, "Lorentz");
    assert_eq!(salary, 4200);
    assert!(commission.is_none());
    assert!(stmt.is_null(":commission")?);
    Ok(())
}

#[test]
fn ref_cursor_out_arg() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("
        BEGIN
            OPEN :lines FOR
                SELECT level FROM dual CONNECT BY level <= :num;
        END;
    ")?;
    let mut lines = Cursor::new(&conn)?;
    stmt.execute((("num", 5), ("lines", &mut lines)))?;
    let mut rows = lines.rows()?;
    let mut total = 0u32;
    while let Some(row) = rows.next()? {
        let num : u32 = row.get(0)?.unwrap_or_default();
        total += num;
    }
    assert_eq!(total, 15);
    Ok(())
}

#[test]
fn array_dml() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    common::drop_quietly(&conn, "DROP TABLE test_array_dml");
    conn.execute_immediate("
        CREATE TABLE test_array_dml (
            id      NUMBER(4) PRIMARY KEY,
            name    VARCHAR2(20) NOT NULL
        )
    ", ())?;

    let mut stmt = conn.prepare("INSERT INTO test_array_dml (id, name) VALUES (:id, :name)")?;
    let ids = [1, 2, 3, 4];
    let names = ["one", "two", "three", "four"];
    let num_rows = stmt.execute((("id", &ids[..]), ("name", &names[..])))?;
    assert_eq!(num_rows, 4);
    assert!(stmt.batch_errors().is_empty());

    // rows 2 and 4 cannot be inserted
    let ids = [5, 1, 6, 2];
    let names = [Some("five"), Some("dup"), Some("six"), None];
    stmt.execute((("id", &ids[..]), ("name", &names[..])))?;
    let errors = stmt.batch_errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].row(), 2);
    assert_eq!(errors[0].code(), 1);
    assert_eq!(errors[1].row(), 4);
    assert!(errors[1].code() == 1 || errors[1].code() == 1400);

    let ids = [7, 8, 9];
    let names = ["seven", "eight", "nine"];
    assert!(stmt.set_bind_array_size(5).is_err());
    stmt.execute((("id", &ids[..]), ("name", &names[..])))?;
    stmt.set_bind_array_size(2)?;
    assert_eq!(stmt.bind_array_size(), 2);

    let mut stmt = conn.prepare("SELECT Count(*) FROM test_array_dml")?;
    let mut rows = stmt.query(())?;
    let row = rows.next()?.expect("a row");
    let count : u32 = row.get(0)?.unwrap_or_default();
    assert_eq!(count, 9);

    // a scalar cannot be repeated for every row of an array
    let mut stmt = conn.prepare("INSERT INTO test_array_dml (id, name) VALUES (:id, :name)")?;
    let ids = [10, 11];
    let res = stmt.execute((("id", &ids[..]), ("name", "same")));
    assert_eq!(res.err().and_then(|err| err.internal().cloned()), Some(LibError::BindArraySize(2, 1)));

    conn.rollback()?;
    common::drop_quietly(&conn, "DROP TABLE test_array_dml");
    Ok(())
}

#[test]
fn scrollable_fetch() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("SELECT level FROM dual CONNECT BY level <= 20")?;
    let mut rows = stmt.query(())?;
    let res = rows.last();
    assert_eq!(res.err().and_then(|err| err.internal().cloned()), Some(LibError::StmtNotScrollable));

    stmt.set_fetch_mode(FetchMode::Scrollable);
    let mut rows = stmt.query(())?;

    let row = rows.last()?.expect("last row");
    let num : u32 = row.get(0)?.unwrap_or_default();
    assert_eq!(num, 20);
    assert_eq!(rows.current_row(), 20);

    let row = rows.first()?.expect("first row");
    let num : u32 = row.get(0)?.unwrap_or_default();
    assert_eq!(num, 1);

    let row = rows.seek(SeekMode::Absolute, 10)?.expect("10th row");
    let num : u32 = row.get(0)?.unwrap_or_default();
    assert_eq!(num, 10);

    let row = rows.seek(SeekMode::Relative, 3)?.expect("13th row");
    let num : u32 = row.get(0)?.unwrap_or_default();
    assert_eq!(num, 13);

    let row = rows.prev()?.expect("12th row");
    let num : u32 = row.get(0)?.unwrap_or_default();
    assert_eq!(num, 12);

    let row = rows.next()?.expect("13th row");
    let num : u32 = row.get(0)?.unwrap_or_default();
    assert_eq!(num, 13);

    assert!(rows.seek(SeekMode::Absolute, 21)?.is_none());
    Ok(())
}

#[test]
fn returning_into() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("
        UPDATE hr.employees
           SET salary = salary + 1
         WHERE department_id = :dept
     RETURNING employee_id, last_name, hire_date INTO :id, :name, :hired
    ")?;
    stmt.register_number(":id")?;
    stmt.register_string(":name", 25)?;
    stmt.register_date(":hired")?;
    let num_rows = stmt.execute(("dept", 60))?;
    assert_eq!(num_rows, 5);
    assert_eq!(stmt.returned_count(), 5);

    let mut ids = Vec::new();
    for i in 0..num_rows {
        let id : u32 = stmt.returned(":id", i)?.expect("employee id");
        let name : Option<String> = stmt.returned(":name", i)?;
        let hired : Option<Date> = stmt.returned(":hired", i)?;
        assert!(name.is_some());
        assert!(hired.is_some());
        ids.push(id);
    }
    ids.sort_unstable();
    assert_eq!(ids, [103, 104, 105, 106, 107]);
    assert!(stmt.returned::<u32>(":id", 5).is_err());

    conn.rollback()?;
    Ok(())
}

#[test]
fn implicit_results() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;
    if conn.server_major_version() < 12 {
        return Ok(());
    }

    let mut stmt = conn.prepare("
        DECLARE
            c1 SYS_REFCURSOR;
            c2 SYS_REFCURSOR;
        BEGIN
            OPEN c1 FOR SELECT region_name FROM hr.regions WHERE region_id = 1;
            DBMS_SQL.RETURN_RESULT(c1);
            OPEN c2 FOR SELECT country_name FROM hr.countries WHERE country_id = 'FR';
            DBMS_SQL.RETURN_RESULT(c2);
        END;
    ")?;
    stmt.execute(())?;

    let mut names = Vec::new();
    while let Some(mut cursor) = stmt.next_result()? {
        let mut rows = cursor.rows()?;
        while let Some(row) = rows.next()? {
            let name : String = row.get(0)?.unwrap_or_default();
            names.push(name);
        }
    }
    assert_eq!(names, ["Europe", "France"]);
    Ok(())
}

#[test]
fn describe_and_parse() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("SELECT employee_id, last_name, hire_date FROM hr.employees")?;
    let cols = stmt.describe()?;
    assert_eq!(cols.len(), 3);
    assert_eq!(cols[0].name(), "EMPLOYEE_ID");
    assert_eq!(cols[0].column_type(), ColumnType::Number);
    assert_eq!(cols[1].column_type(), ColumnType::Text);
    assert_eq!(cols[2].column_type(), ColumnType::Date);
    assert!(!cols[1].is_nullable());

    let mut stmt = conn.prepare("SELECT last_name FROM hr.employees WHERE")?;
    assert!(stmt.parse().is_err());
    assert!(stmt.parse_error_offset()? > 0);

    let mut stmt = conn.prepare("SELECT 1 FROM dual")?;
    assert!(stmt.execute(()).is_err());
    Ok(())
}
