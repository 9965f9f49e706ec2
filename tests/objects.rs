mod common;

use oracall::*;

fn drop_objects(conn: &Connection) {
    common::drop_quietly(conn, "DROP TABLE test_shapes");
    common::drop_quietly(conn, "DROP TYPE test_points");
    common::drop_quietly(conn, "DROP TYPE test_sizes");
    common::drop_quietly(conn, "DROP TYPE test_point");
}

fn create_objects(conn: &Connection) -> Result<()> {
    conn.execute_immediate("
        CREATE TYPE test_point AS OBJECT (
            x       NUMBER,
            y       NUMBER,
            label   VARCHAR2(20)
        )
    ", ())?;
    conn.execute_immediate("CREATE TYPE test_points AS TABLE OF test_point", ())?;
    conn.execute_immediate("CREATE TYPE test_sizes AS VARRAY(5) OF NUMBER", ())?;
    conn.execute_immediate("
        CREATE TABLE test_shapes (
            id      NUMBER(4) PRIMARY KEY,
            origin  test_point,
            points  test_points,
            sizes   test_sizes
        ) NESTED TABLE points STORE AS test_shape_points
    ", ())?;
    Ok(())
}

#[test]
fn objects_and_collections() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    drop_objects(&conn);
    create_objects(&conn)?;

    let point_type = conn.describe_type("test_point", TypeInfoKind::Type)?;
    assert_eq!(point_type.name(), "TEST_POINT");
    assert_eq!(point_type.column_count(), 3);
    assert_eq!(point_type.column(2)?.name(), "LABEL");
    assert!(!point_type.is_collection());

    let points_type = conn.describe_type("test_points", TypeInfoKind::Type)?;
    assert_eq!(points_type.collection_kind(), Some(CollectionKind::NestedTable));
    let sizes_type = conn.describe_type("test_sizes", TypeInfoKind::Type)?;
    assert_eq!(sizes_type.collection_kind(), Some(CollectionKind::Varray));

    let table_info = conn.describe_type("test_shapes", TypeInfoKind::Table)?;
    assert_eq!(table_info.column_count(), 4);
    assert_eq!(table_info.column_by_name("origin")?.column_type(), ColumnType::Object);
    assert_eq!(table_info.column_by_name("points")?.column_type(), ColumnType::Collection);

    let mut origin = Object::new(&conn, &point_type)?;
    assert!(origin.is_null("x")?);
    origin.set("x", &0)?;
    origin.set("y", &0)?;
    origin.set("label", "origin")?;

    let mut points = Collection::new(&conn, &points_type)?;
    for (x, y) in [(1, 2), (3, 4), (5, 6)].iter() {
        let mut point = Object::new(&conn, &point_type)?;
        point.set("x", x)?;
        point.set("y", y)?;
        points.append(&point)?;
    }
    assert_eq!(points.size()?, 3);

    let mut sizes = Collection::new(&conn, &sizes_type)?;
    assert_eq!(sizes.max(), 5);
    sizes.append(&10)?;
    sizes.append(&20)?;
    sizes.append(&30)?;
    sizes.set(1, &25)?;
    sizes.trim(1)?;
    assert_eq!(sizes.size()?, 2);
    assert!(sizes.append(&"not a number").is_err());

    let mut stmt = conn.prepare("
        INSERT INTO test_shapes (id, origin, points, sizes) VALUES (:id, :origin, :points, :sizes)
    ")?;
    let num_rows = stmt.execute((("id", 1), ("origin", &origin), ("points", &points), ("sizes", &sizes)))?;
    assert_eq!(num_rows, 1);

    let mut stmt = conn.prepare("SELECT origin, points, sizes FROM test_shapes WHERE id = :id")?;
    let mut rows = stmt.query(("id", 1))?;
    let row = rows.next()?.expect("a row");

    let origin : Object = row.get(0)?.expect("origin");
    let label : Option<String> = origin.get("label")?;
    assert_eq!(label.as_deref(), Some("origin"));
    let x : Option<i32> = origin.get("x")?;
    assert_eq!(x, Some(0));

    let points : Collection = row.get(1)?.expect("points");
    assert_eq!(points.kind(), CollectionKind::NestedTable);
    assert_eq!(points.size()?, 3);
    let last : Object = points.get(2)?.expect("last point");
    let y : Option<f64> = last.get("y")?;
    assert_eq!(y, Some(6.0));
    assert!(last.is_null("label")?);

    let sizes : Vec<Option<u32>> = {
        let sizes : Collection = row.get(2)?.expect("sizes");
        sizes.to_vec()?
    };
    assert_eq!(sizes, [Some(10), Some(25)]);

    conn.rollback()?;
    drop(last);
    drop(points);
    drop(origin);
    drop(rows);
    drop(stmt);
    drop_objects(&conn);
    Ok(())
}

#[test]
fn varray_out_arg() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("
        BEGIN
            :names := Sys.ODCIVarchar2List('one', 'two', 'three');
        END;
    ")?;
    let list_type = conn.describe_type("SYS.ODCIVARCHAR2LIST", TypeInfoKind::Type)?;
    let mut names = Collection::new(&conn, &list_type)?;
    stmt.execute(("names", &mut names))?;
    assert_eq!(names.kind(), CollectionKind::Varray);
    let first : Option<String> = names.get(0)?;
    assert_eq!(first.as_deref(), Some("one"));
    assert!(names.exists(2)?);
    assert!(!names.exists(3)?);
    names.set_null(1)?;
    let names : Vec<Option<String>> = names.to_vec()?;
    assert_eq!(names, [Some("one".to_string()), None, Some("three".to_string())]);
    Ok(())
}

#[test]
fn collection_iterator() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    let mut stmt = conn.prepare("SELECT Sys.ODCINumberList(10, NULL, 30) FROM dual")?;
    let mut rows = stmt.query(())?;
    let row = rows.next()?.expect("a row");
    let nums : Collection = row.get(0)?.expect("numbers");

    let items = nums.iter::<i32>()?.collect::<Result<Vec<_>>>()?;
    assert_eq!(items, [Some(10), None, Some(30)]);

    let mut iter = nums.iter::<i32>()?;
    assert!(iter.prev().is_none());
    assert_eq!(iter.next().transpose()?, Some(Some(10)));
    assert_eq!(iter.next().transpose()?, Some(None));
    assert_eq!(iter.prev().transpose()?, Some(Some(10)));
    iter.reset()?;
    assert_eq!(iter.last().transpose()?, Some(Some(30)));

    let list_type = conn.describe_type("SYS.ODCINUMBERLIST", TypeInfoKind::Type)?;
    let empty = Collection::new(&conn, &list_type)?;
    assert!(empty.iter::<i32>()?.next().is_none());
    Ok(())
}

#[test]
fn object_references() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    common::drop_quietly(&conn, "DROP TABLE test_point_refs");
    common::drop_quietly(&conn, "DROP TABLE test_point_rows");
    drop_objects(&conn);
    create_objects(&conn)?;
    conn.execute_immediate("CREATE TABLE test_point_rows OF test_point", ())?;
    conn.execute_immediate("
        CREATE TABLE test_point_refs (
            id      NUMBER(4) PRIMARY KEY,
            point   REF test_point SCOPE IS test_point_rows
        )
    ", ())?;
    conn.execute_immediate("INSERT INTO test_point_rows VALUES (test_point(1, 2, 'first'))", ())?;
    conn.execute_immediate("INSERT INTO test_point_rows VALUES (test_point(3, 4, 'second'))", ())?;

    let mut stmt = conn.prepare("SELECT REF(p) FROM test_point_rows p WHERE p.label = :label")?;
    let mut rows = stmt.query("first")?;
    let row = rows.next()?.expect("a row");
    let first : Ref = row.get(0)?.expect("REF");
    assert!(!first.is_null());
    assert_eq!(first.type_info().name(), "TEST_POINT");
    assert!(!first.to_hex()?.is_empty());

    let point = first.object()?.expect("referenced point");
    let y : Option<i32> = point.get("y")?;
    assert_eq!(y, Some(2));

    let mut stmt = conn.prepare("INSERT INTO test_point_refs (id, point) VALUES (:id, :point)")?;
    stmt.execute((("id", 1), ("point", &first)))?;

    let mut stmt = conn.prepare("SELECT point, DEREF(point).label FROM test_point_refs WHERE id = :id")?;
    let mut rows = stmt.query(("id", 1))?;
    let row = rows.next()?.expect("a row");
    let stored : Ref = row.get(0)?.expect("stored REF");
    let label : Option<String> = row.get(1)?;
    assert_eq!(label.as_deref(), Some("first"));
    assert_eq!(stored.to_hex()?, first.to_hex()?);

    let mut other = Ref::new(&conn, first.type_info())?;
    assert!(other.is_null());
    assert!(other.object()?.is_none());
    assert_eq!(other.to_hex()?, "");
    other.assign(&stored)?;
    assert!(!other.is_null());
    other.set_null();
    assert!(other.is_null());

    let mut stmt = conn.prepare("
        BEGIN
            SELECT REF(p) INTO :point FROM test_point_rows p WHERE p.label = 'second';
        END;
    ")?;
    stmt.execute(("point", &mut other))?;
    let second = other.object()?.expect("second point");
    let x : Option<i32> = second.get("x")?;
    assert_eq!(x, Some(3));

    conn.rollback()?;
    drop(rows);
    drop(stmt);
    common::drop_quietly(&conn, "DROP TABLE test_point_refs");
    common::drop_quietly(&conn, "DROP TABLE test_point_rows");
    drop_objects(&conn);
    Ok(())
}
