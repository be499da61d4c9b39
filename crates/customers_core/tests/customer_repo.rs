use customers_core::db::migrations::latest_version;
use customers_core::db::open_db_in_memory;
use customers_core::{Customer, CustomerRepository, RepoError, SqliteCustomerRepository};
use rusqlite::Connection;

#[test]
fn upsert_inserts_then_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let first = repo.upsert_customer("Maria", true).unwrap();
    let second = repo.upsert_customer("Maria", false).unwrap();
    assert_eq!(first, second);

    let loaded = repo.get_customer(first).unwrap().unwrap();
    assert_eq!(loaded, Customer::persisted(first, "Maria", false));
}

#[test]
fn upsert_assigns_distinct_ids_to_distinct_names() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let maria = repo.upsert_customer("Maria", true).unwrap();
    let ernie = repo.upsert_customer("Ernie", false).unwrap();
    assert_ne!(maria, ernie);
    assert_eq!((maria, ernie), (1, 2));
}

#[test]
fn get_missing_customer_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    assert!(repo.get_customer(404).unwrap().is_none());
}

#[test]
fn list_is_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO customers (id, name, subscribed) VALUES (30, 'Zed', 0);
         INSERT INTO customers (id, name, subscribed) VALUES (10, 'Amy', 1);
         INSERT INTO customers (id, name, subscribed) VALUES (20, 'Bob', 0);",
    )
    .unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let ids: Vec<_> = repo
        .list_customers()
        .unwrap()
        .into_iter()
        .filter_map(|customer| customer.id())
        .collect();
    assert_eq!(ids, vec![10, 20, 30]);
}

#[test]
fn blank_name_is_a_storage_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let err = repo.upsert_customer("  ", true).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.list_customers().unwrap().is_empty());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteCustomerRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_customers_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCustomerRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("customers"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE customers (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCustomerRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "customers",
            column: "subscribed"
        })
    ));
}

#[test]
fn invalid_subscribed_value_is_rejected_on_read() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE customers (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            subscribed INTEGER NOT NULL
        );
        INSERT INTO customers (name, subscribed) VALUES ('Maria', 7);",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let err = repo.get_customer(1).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("subscribed")));
}
