//! Moving values between record instances and argument/scan buffers.

use crate::{error::BindError, index::FieldIndex, record::Record, value::Value};
use derive_more::{Deref, DerefMut};
use parking_lot::Mutex;
use std::{marker::PhantomData, mem};

/// Buffers kept for reuse per binder; extra releases are dropped.
const POOL_LIMIT: usize = 32;

type Pool = Mutex<Vec<Vec<Value>>>;

///
/// Buffer
///
/// Pooled value buffer. Dropping it clears the contents and returns the
/// allocation to its binder's pool, on every exit path.
///

#[derive(Debug, Deref, DerefMut)]
pub struct Buffer<'a> {
    #[deref]
    #[deref_mut]
    values: Vec<Value>,
    pool: &'a Pool,
}

impl Drop for Buffer<'_> {
    fn drop(&mut self) {
        let mut values = mem::take(&mut self.values);
        values.clear();

        let mut pool = self.pool.lock();
        if pool.len() < POOL_LIMIT {
            pool.push(values);
        }
    }
}

///
/// Binder
///
/// Resolves column ordinals through the field index and reads or writes
/// the addressed leaves of a record.
///

#[derive(Debug)]
pub struct Binder<R> {
    index: FieldIndex,
    pool: Pool,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Binder<R> {
    #[must_use]
    pub const fn new(index: FieldIndex) -> Self {
        Self {
            index,
            pool: Mutex::new(Vec::new()),
            _record: PhantomData,
        }
    }

    #[must_use]
    pub const fn index(&self) -> &FieldIndex {
        &self.index
    }

    fn acquire(&self) -> Buffer<'_> {
        let values = self
            .pool
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.index.capacity()));

        Buffer {
            values,
            pool: &self.pool,
        }
    }

    fn path(&self, ordinal: usize) -> Result<&[u16], BindError> {
        self.index
            .resolve(ordinal)
            .ok_or(BindError::UnknownOrdinal { ordinal })
    }

    /// Read the values of `ordinals` out of `record`, in order.
    pub fn args(&self, record: &R, ordinals: &[usize]) -> Result<Buffer<'_>, BindError> {
        let mut buf = self.acquire();

        for &ordinal in ordinals {
            let path = self.path(ordinal)?;
            let value = record
                .read_field(path)
                .ok_or_else(|| BindError::Unaddressable {
                    path: path.to_vec(),
                })?;
            buf.push(value);
        }

        Ok(buf)
    }

    /// `len` NULL scan destinations.
    #[must_use]
    pub fn slots(&self, len: usize) -> Buffer<'_> {
        let mut buf = self.acquire();
        buf.resize(len, Value::Null);

        buf
    }

    /// Write scanned `values` into the leaves of `ordinals`, in order.
    pub fn scan(
        &self,
        record: &mut R,
        ordinals: &[usize],
        values: &mut [Value],
    ) -> Result<(), BindError> {
        if ordinals.len() != values.len() {
            return Err(BindError::ColumnCount {
                expected: ordinals.len(),
                found: values.len(),
            });
        }

        for (&ordinal, value) in ordinals.iter().zip(values.iter_mut()) {
            let path = self.path(ordinal)?;
            record.write_field(path, mem::take(value))?;
        }

        Ok(())
    }

    /// Number of buffers currently parked in the pool.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.pool.lock().len()
    }
}
