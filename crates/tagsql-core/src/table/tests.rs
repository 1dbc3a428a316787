use super::*;
use crate::test_support::{Customer, LogLine, MockDb, MockError};
use time::OffsetDateTime;

fn customers() -> Table<Customer> {
    Table::new("customers").unwrap()
}

fn stored() -> Customer {
    Customer {
        id: 42,
        first_name: "Ada".into(),
        age: 36,
        ssn: Some("078-05-1120".into()),
        updated_at: Some(OffsetDateTime::UNIX_EPOCH),
        row_version: 3,
        ..Customer::default()
    }
}

#[test]
fn plural_registration_derives_the_table_name() {
    let table: Table<Customer> = Table::plural(TableConfig::default()).unwrap();

    assert_eq!(table.name(), "customers");
    assert_eq!(table.descriptor().columns().len(), 8);
}

#[test]
fn get_by_pk_selects_every_column() {
    let db = MockDb::default();
    db.push_row(vec![
        Value::Int(42),
        Value::Text("Ada".into()),
        Value::Int(36),
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Int(3),
    ]);

    let found = customers().get_by_pk(&db, 42_i64).unwrap();

    assert_eq!((found.id, found.age, found.row_version), (42, 36, 3));
    assert_eq!(
        db.last(),
        (
            "SELECT t.id,t.first_name,t.age,t.ssn,t.created_at,t.updated_at,t.deleted_at,t.row_version \
             FROM customers t WHERE id=$1"
                .to_string(),
            vec![Value::Int(42)]
        )
    );
}

#[test]
fn get_by_pk_into_reuses_the_destination() {
    let db = MockDb::default();
    let mut row = stored_row();
    row[0] = Value::Int(1);
    row[1] = Value::Text("x".into());
    db.push_row(row);

    let mut dest = stored();
    customers().get_by_pk_into(&db, &mut dest, 1_i64).unwrap();

    assert_eq!(dest.id, 1);
    assert_eq!(dest.first_name, "x");
    assert_eq!(dest.ssn, None);
}

#[test]
fn select_returns_every_row() {
    let db = MockDb::default();
    db.push_row(vec![Value::Int(1), Value::Int(20)]);
    db.push_row(vec![Value::Int(2), Value::Int(30)]);

    let rows = customers()
        .select(&db, "age", "WHERE age>=$1 ORDER BY id", &[Value::Int(18)])
        .unwrap();

    assert_eq!(rows.iter().map(|c| c.age).collect::<Vec<_>>(), [20, 30]);
    assert_eq!(
        db.last().0,
        "SELECT t.id,t.age FROM customers t WHERE age>=$1 ORDER BY id"
    );
}

#[test]
fn insert_skips_the_serial_key() {
    let db = MockDb::default();

    customers().insert(&db, &stored(), "age,ssn").unwrap();

    assert_eq!(
        db.last(),
        (
            "INSERT INTO customers (id,age,ssn) VALUES (DEFAULT,$1,$2)".to_string(),
            vec![Value::Int(36), Value::Text("078-05-1120".into())]
        )
    );
}

#[test]
fn insert_returning_yields_generated_columns() {
    let db = MockDb::default();
    db.push_row(vec![Value::Int(100), Value::Null, Value::Int(1)]);

    let out = customers()
        .insert_returning(&db, &stored(), "", "")
        .unwrap();

    assert_eq!((out.id, out.row_version), (100, 1));
    assert_eq!(
        db.last().0,
        "INSERT INTO customers (id,created_at,row_version) VALUES (DEFAULT,$1,$2) \
         RETURNING id,created_at,row_version"
    );
}

#[test]
fn update_by_pk_binds_the_key_first() {
    let db = MockDb::default();

    customers().update_by_pk(&db, &stored(), "age").unwrap();

    assert_eq!(
        db.last(),
        (
            "UPDATE customers SET age=$2 WHERE id=$1".to_string(),
            vec![Value::Int(42), Value::Int(36)]
        )
    );
}

#[test]
fn update_by_clause_appends_caller_arguments() {
    let db = MockDb::default();

    customers()
        .update(&db, &stored(), "age", "WHERE ssn=$1", &[Value::Text("x".into())])
        .unwrap();

    assert_eq!(
        db.last(),
        (
            "UPDATE customers SET age=$1 WHERE ssn=$2".to_string(),
            vec![Value::Int(36), Value::Text("x".into())]
        )
    );
}

#[test]
fn update_returning_variants() {
    let db = MockDb::default();
    let table = customers();

    db.push_row(vec![Value::Int(42), Value::Null, Value::Int(4)]);
    let by_key = table
        .update_returning_by_pk(&db, &stored(), "age", "")
        .unwrap();
    assert_eq!(by_key.row_version, 4);

    db.push_row(vec![Value::Int(42), Value::Null, Value::Int(5)]);
    let by_text = table
        .update_returning(&db, &stored(), "age", "", "WHERE age<$1", &[Value::Int(99)])
        .unwrap();
    assert_eq!(by_text.row_version, 5);
    assert_eq!(
        db.last().0,
        "UPDATE customers SET age=$1,updated_at=$2,row_version=row_version+1 WHERE age<$3 \
         RETURNING id,updated_at,row_version"
    );
}

#[test]
fn soft_delete_and_touch() {
    let db = MockDb::default();
    let table = customers();
    let row = stored();

    table.soft_delete_by_pk(&db, &row).unwrap();
    table.touch_by_pk(&db, &row).unwrap();

    let calls = db.calls();
    assert_eq!(
        calls[0].0,
        "UPDATE customers SET updated_at=$2,deleted_at=$3,row_version=row_version+1 WHERE id=$1"
    );
    assert_eq!(
        calls[0].1,
        [
            Value::Int(42),
            Value::Timestamp(OffsetDateTime::UNIX_EPOCH),
            Value::Null
        ]
    );
    assert_eq!(calls[1].0, "UPDATE customers SET updated_at=$2 WHERE id=$1");
}

#[test]
fn soft_delete_returning_reads_back_system_columns() {
    let db = MockDb::default();
    db.push_row(vec![
        Value::Int(42),
        Value::Null,
        Value::Null,
        Value::Timestamp(OffsetDateTime::UNIX_EPOCH),
        Value::Int(4),
    ]);

    let out = customers()
        .soft_delete_returning_by_pk(&db, &stored())
        .unwrap();

    assert_eq!(out.deleted_at, Some(OffsetDateTime::UNIX_EPOCH));
    assert_eq!(out.row_version, 4);
    assert!(db.last().0.ends_with(
        "WHERE id=$1 RETURNING id,created_at,updated_at,deleted_at,row_version"
    ));
}

#[test]
fn deletes() {
    let db = MockDb::default();
    let table = customers();

    table.delete_by_pk(&db, 42_i64).unwrap();
    table.delete(&db, "WHERE age<$1", &[Value::Int(18)]).unwrap();
    table.truncate(&db).unwrap();

    assert_eq!(
        db.calls(),
        [
            (
                "DELETE FROM customers WHERE id=$1".to_string(),
                vec![Value::Int(42)]
            ),
            (
                "DELETE FROM customers WHERE age<$1".to_string(),
                vec![Value::Int(18)]
            ),
            ("TRUNCATE TABLE customers".to_string(), vec![]),
        ]
    );
}

#[test]
fn delete_returning_by_pk_binds_the_key() {
    let db = MockDb::default();
    db.push_row(stored_row());

    let out = customers().delete_returning_by_pk(&db, &stored()).unwrap();

    assert_eq!(out.first_name, "Ada");
    assert_eq!(db.last().1, [Value::Int(42)]);
}

#[test]
fn delete_returning_by_clause() {
    let db = MockDb::default();
    db.push_row(stored_row());

    let out = customers()
        .delete_returning(&db, "WHERE ssn=$1", &[Value::Text("078-05-1120".into())])
        .unwrap();

    assert_eq!(out.id, 42);
    assert!(db.last().0.starts_with("DELETE FROM customers WHERE ssn=$1 RETURNING id,"));
}

#[test]
fn exists_and_count() {
    let db = MockDb::default();
    let table = customers();

    db.push_row(vec![Value::Bool(true)]);
    assert!(table.exists_by_pk(&db, 42_i64).unwrap());

    db.push_row(vec![Value::Bool(false)]);
    assert!(!table.exists(&db, "WHERE age>$1", &[Value::Int(200)]).unwrap());

    db.push_row(vec![Value::Int(12)]);
    assert_eq!(table.count(&db, "", &[]).unwrap(), 12);

    let sql: Vec<_> = db.statements();
    assert_eq!(
        sql,
        [
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id=$1)",
            "SELECT EXISTS(SELECT 1 FROM customers t WHERE age>$1)",
            "SELECT COUNT(*) FROM customers t",
        ]
    );
}

#[test]
fn scalar_type_mismatch_is_a_bind_error() {
    let db = MockDb::default();
    db.push_row(vec![Value::Text("many".into())]);

    let err = customers().count(&db, "", &[]).unwrap_err();

    assert!(matches!(
        err,
        Error::Bind(BindError::TypeMismatch {
            attribute: "count",
            found: "text"
        })
    ));
}

#[test]
fn invalid_scopes_never_reach_the_backend() {
    let db = MockDb::default();
    let table = customers();

    let err = table.select(&db, "age,nope", "", &[]).unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::UnknownScope { ref scope, .. }) if scope == "nope"
    ));
    assert!(table.validate_scope("!age,system").is_ok());
    assert!(db.calls().is_empty());
}

#[test]
fn not_found_is_passed_through() {
    let db = MockDb::default();

    let err = customers().get_by_pk(&db, 1_i64).unwrap_err();

    assert_eq!(err.into_backend(), Some(MockError::NotFound));
}

#[test]
fn keyless_tables_fail_key_anchored_operations() {
    let db = MockDb::default();
    let table: Table<LogLine> = Table::new("logs").unwrap();

    let err = table.delete_by_pk(&db, 1_i64).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::NoPrimaryKey { .. })));

    let err = table.touch_by_pk(&db, &LogLine::default()).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::NoPrimaryKey { .. })));
    assert!(db.calls().is_empty());
}

#[test]
fn repeated_operations_hit_the_cache() {
    let db = MockDb::default();
    let table = customers();
    let before = table.stats();

    table.insert(&db, &stored(), "age").unwrap();
    table.insert(&db, &stored(), "age").unwrap();

    let after = table.stats();
    assert_eq!(after.commands.misses, before.commands.misses + 1);
    assert_eq!(after.commands.hits, before.commands.hits + 1);
}

fn stored_row() -> Vec<Value> {
    vec![
        Value::Int(42),
        Value::Text("Ada".into()),
        Value::Int(36),
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Int(3),
    ]
}
