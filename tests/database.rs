mod common;

use oracall::*;

#[test]
fn administration_needs_privileges() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;

    // a regular account can neither stop the instance nor connect as SYSDBA to start it
    let res = shutdown(&oracle, &dbname, &dbuser, &dbpass, SessionMode::DEFAULT, ShutdownMode::SHUTDOWN, ShutdownFlag::Immediate);
    assert!(res.is_err());
    let res = startup(&oracle, &dbname, &dbuser, &dbpass, SessionMode::SYSDBA, StartupMode::MOUNT | StartupMode::OPEN, StartupFlags::DEFAULT, None);
    assert!(res.is_err());

    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;
    conn.ping()?;
    Ok(())
}

#[test]
fn restart() -> Result<()> {
    let (dbname, _, _) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let (sysuser, syspass) = match common::sysdba_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;

    shutdown(&oracle, &dbname, &sysuser, &syspass, SessionMode::SYSDBA, ShutdownMode::FULL, ShutdownFlag::Immediate)?;
    startup(&oracle, &dbname, &sysuser, &syspass, SessionMode::SYSDBA, StartupMode::FULL, StartupFlags::DEFAULT, None)?;

    let conn = Connection::new(&oracle, &dbname, &sysuser, &syspass, SessionMode::SYSDBA)?;
    let mut stmt = conn.prepare("SELECT status FROM v$instance")?;
    let mut rows = stmt.query(())?;
    let row = rows.next()?.expect("a row");
    let status : Option<String> = row.get(0)?;
    assert_eq!(status.as_deref(), Some("OPEN"));
    Ok(())
}
