use parking_lot::Mutex;
use std::collections::VecDeque;
use tagsql::{
    executor::{Backend, Database, Executer, QueryExecuter, QueryRowExecuter, Rows, Transaction},
    value::Value,
};
use thiserror::Error as ThisError;

///
/// ScriptError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ScriptError {
    #[error("no rows")]
    NoRows,
}

///
/// ScriptDb
///
/// Logs statements and replays queued rows.
///

#[derive(Debug, Default)]
pub struct ScriptDb {
    log: Mutex<Vec<(String, Vec<Value>)>>,
    rows: Mutex<VecDeque<Vec<Value>>>,
}

impl ScriptDb {
    pub fn queue(&self, row: Vec<Value>) {
        self.rows.lock().push_back(row);
    }

    pub fn log(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().clone()
    }

    pub fn sql(&self) -> Vec<String> {
        self.log.lock().iter().map(|(sql, _)| sql.clone()).collect()
    }

    fn push(&self, sql: &str, args: &[Value]) {
        self.log.lock().push((sql.to_string(), args.to_vec()));
    }
}

impl Backend for ScriptDb {
    type Error = ScriptError;
}

impl Executer for ScriptDb {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, ScriptError> {
        self.push(sql, args);

        Ok(1)
    }
}

impl QueryRowExecuter for ScriptDb {
    fn query_row(&self, sql: &str, args: &[Value], dest: &mut [Value]) -> Result<(), ScriptError> {
        self.push(sql, args);
        let row = self.rows.lock().pop_front().ok_or(ScriptError::NoRows)?;
        dest.clone_from_slice(&row);

        Ok(())
    }
}

impl QueryExecuter for ScriptDb {
    type Rows<'a>
        = ScriptRows
    where
        Self: 'a;

    fn query<'a>(&'a self, sql: &str, args: &[Value]) -> Result<ScriptRows, ScriptError> {
        self.push(sql, args);

        Ok(ScriptRows {
            pending: self.rows.lock().drain(..).collect(),
            current: Vec::new(),
        })
    }
}

impl Database for ScriptDb {
    type Tx<'a>
        = ScriptTx<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<ScriptTx<'_>, ScriptError> {
        self.push("BEGIN", &[]);

        Ok(ScriptTx(self))
    }

    fn is_not_found(&self, err: &ScriptError) -> bool {
        *err == ScriptError::NoRows
    }
}

///
/// ScriptRows
///

#[derive(Debug)]
pub struct ScriptRows {
    pending: VecDeque<Vec<Value>>,
    current: Vec<Value>,
}

impl Rows for ScriptRows {
    type Error = ScriptError;

    fn advance(&mut self) -> Result<bool, ScriptError> {
        match self.pending.pop_front() {
            Some(row) => {
                self.current = row;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn scan(&mut self, dest: &mut [Value]) -> Result<(), ScriptError> {
        dest.clone_from_slice(&self.current);

        Ok(())
    }
}

///
/// ScriptTx
///

#[derive(Debug)]
pub struct ScriptTx<'a>(&'a ScriptDb);

impl Backend for ScriptTx<'_> {
    type Error = ScriptError;
}

impl Executer for ScriptTx<'_> {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, ScriptError> {
        self.0.execute(sql, args)
    }
}

impl QueryRowExecuter for ScriptTx<'_> {
    fn query_row(&self, sql: &str, args: &[Value], dest: &mut [Value]) -> Result<(), ScriptError> {
        self.0.query_row(sql, args, dest)
    }
}

impl QueryExecuter for ScriptTx<'_> {
    type Rows<'b>
        = ScriptRows
    where
        Self: 'b;

    fn query<'b>(&'b self, sql: &str, args: &[Value]) -> Result<ScriptRows, ScriptError> {
        self.0.query(sql, args)
    }
}

impl Transaction for ScriptTx<'_> {
    fn commit(self) -> Result<(), ScriptError> {
        self.0.push("COMMIT", &[]);

        Ok(())
    }

    fn rollback(self) -> Result<(), ScriptError> {
        self.0.push("ROLLBACK", &[]);

        Ok(())
    }
}
