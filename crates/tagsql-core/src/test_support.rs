//! Fixtures shared by unit tests: derived records and a recording backend.

use crate::{
    bind::Binder,
    config::DEFAULT_TAG,
    executor::{Backend, Database, Executer, QueryExecuter, QueryRowExecuter, Rows, Transaction},
    extract::extract,
    index::FieldIndex,
    value::Value,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tagsql_derive::Record;
use thiserror::Error as ThisError;
use time::OffsetDateTime;

///
/// Address
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub struct Address {
    pub city: String,
}

///
/// Profile
///
/// Ordinals: 0 id, 1 name, 2 age, 3 address.city
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub struct Profile {
    #[tag(db = "pk,gen=serial")]
    pub id: u64,
    pub name: String,
    #[tag(db = "age")]
    pub age: i32,
    #[record(embed)]
    pub address: Option<Address>,
}

impl Profile {
    pub fn sample() -> Self {
        Self {
            id: 7,
            name: "Ada".into(),
            age: 41,
            address: Some(Address {
                city: "Oslo".into(),
            }),
        }
    }
}

pub fn profile_binder() -> Binder<Profile> {
    let fields = extract::<Profile>(DEFAULT_TAG);
    let index = FieldIndex::from_paths(fields.iter().map(|f| f.path.as_slice())).unwrap();

    Binder::new(index)
}

///
/// Customer
///
/// Ordinals follow declaration order, 0 id through 7 row_version.
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub struct Customer {
    #[tag(db = "pk,gen=serial")]
    pub id: i64,
    pub first_name: String,
    #[tag(db = "age")]
    pub age: i32,
    #[tag(db = "ssn")]
    pub ssn: Option<String>,
    #[tag(db = "insert")]
    pub created_at: Option<OffsetDateTime>,
    #[tag(db = "update")]
    pub updated_at: Option<OffsetDateTime>,
    #[tag(db = "delete")]
    pub deleted_at: Option<OffsetDateTime>,
    #[tag(db = "version")]
    pub row_version: i64,
}

///
/// LogLine
///

#[derive(Clone, Debug, Default, PartialEq, Record)]
pub struct LogLine {
    pub level: String,
    pub message: String,
}

///
/// MockError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum MockError {
    #[error("no rows in result set")]
    NotFound,

    #[error("mock failure: {0}")]
    Failed(String),
}

///
/// MockDb
///
/// Records every statement with its arguments and answers queries from a
/// queue of scripted rows.
///

#[derive(Debug)]
pub struct MockDb {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    rows: Mutex<VecDeque<Vec<Value>>>,
    affected: u64,
    fail_commit: bool,
}

impl Default for MockDb {
    fn default() -> Self {
        Self {
            calls: Mutex::default(),
            rows: Mutex::default(),
            affected: 1,
            fail_commit: false,
        }
    }
}

impl MockDb {
    pub fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::default()
        }
    }

    pub fn push_row(&self, row: Vec<Value>) {
        self.rows.lock().push_back(row);
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn last(&self) -> (String, Vec<Value>) {
        self.calls.lock().last().cloned().unwrap()
    }

    fn record(&self, sql: &str, args: &[Value]) {
        self.calls.lock().push((sql.to_string(), args.to_vec()));
    }

    fn next_row(&self, dest: &mut [Value]) -> Result<(), MockError> {
        let row = self.rows.lock().pop_front().ok_or(MockError::NotFound)?;
        if row.len() != dest.len() {
            return Err(MockError::Failed(format!(
                "row has {} columns, {} requested",
                row.len(),
                dest.len()
            )));
        }
        dest.clone_from_slice(&row);

        Ok(())
    }
}

impl Backend for MockDb {
    type Error = MockError;
}

impl Executer for MockDb {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, MockError> {
        self.record(sql, args);

        Ok(self.affected)
    }
}

impl QueryRowExecuter for MockDb {
    fn query_row(&self, sql: &str, args: &[Value], dest: &mut [Value]) -> Result<(), MockError> {
        self.record(sql, args);
        self.next_row(dest)
    }
}

impl QueryExecuter for MockDb {
    type Rows<'a>
        = MockRows
    where
        Self: 'a;

    fn query<'a>(&'a self, sql: &str, args: &[Value]) -> Result<MockRows, MockError> {
        self.record(sql, args);

        Ok(MockRows {
            rows: self.rows.lock().drain(..).collect(),
            current: None,
        })
    }
}

impl Database for MockDb {
    type Tx<'a>
        = MockTx<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<MockTx<'_>, MockError> {
        self.record("BEGIN", &[]);

        Ok(MockTx { db: self })
    }

    fn is_not_found(&self, err: &MockError) -> bool {
        *err == MockError::NotFound
    }
}

///
/// MockRows
///

#[derive(Debug)]
pub struct MockRows {
    rows: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
}

impl Rows for MockRows {
    type Error = MockError;

    fn advance(&mut self) -> Result<bool, MockError> {
        self.current = self.rows.pop_front();

        Ok(self.current.is_some())
    }

    fn scan(&mut self, dest: &mut [Value]) -> Result<(), MockError> {
        let row = self
            .current
            .take()
            .ok_or_else(|| MockError::Failed("scan before advance".into()))?;
        dest.clone_from_slice(&row);

        Ok(())
    }
}

///
/// MockTx
///

#[derive(Debug)]
pub struct MockTx<'a> {
    db: &'a MockDb,
}

impl Backend for MockTx<'_> {
    type Error = MockError;
}

impl Executer for MockTx<'_> {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, MockError> {
        self.db.execute(sql, args)
    }
}

impl QueryRowExecuter for MockTx<'_> {
    fn query_row(&self, sql: &str, args: &[Value], dest: &mut [Value]) -> Result<(), MockError> {
        self.db.query_row(sql, args, dest)
    }
}

impl QueryExecuter for MockTx<'_> {
    type Rows<'b>
        = MockRows
    where
        Self: 'b;

    fn query<'b>(&'b self, sql: &str, args: &[Value]) -> Result<MockRows, MockError> {
        self.db.query(sql, args)
    }
}

impl Transaction for MockTx<'_> {
    fn commit(self) -> Result<(), MockError> {
        self.db.record("COMMIT", &[]);

        if self.db.fail_commit {
            return Err(MockError::Failed("commit".into()));
        }

        Ok(())
    }

    fn rollback(self) -> Result<(), MockError> {
        self.db.record("ROLLBACK", &[]);

        Ok(())
    }
}
