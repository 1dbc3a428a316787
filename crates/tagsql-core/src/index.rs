use crate::error::ConfigError;

const CAP: usize = 0;
const LEN: usize = 1;
const HEADER: usize = 2;

///
/// FieldIndex
///
/// Append-only flat encoding of attribute paths.
///
/// Layout of the single buffer:
///   [0]                  capacity
///   [1]                  len
///   [2 + 2i], [3 + 2i]   (from, to) of attribute i, for i < capacity
///   [2 + 2 * capacity..] path elements, contiguous
///
/// Ordinal `i` resolves to `buf[from..to]` by offset arithmetic.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldIndex {
    buf: Vec<u16>,
}

impl FieldIndex {
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        let cap = u16::try_from(capacity).map_err(|_| ConfigError::FieldIndexOverflow {
            detail: format!("capacity {capacity} exceeds {}", u16::MAX),
        })?;

        let ranges = HEADER + capacity * 2;
        let mut buf = Vec::with_capacity(ranges + capacity * 2);
        buf.resize(ranges, 0);
        buf[CAP] = cap;

        Ok(Self { buf })
    }

    /// Build a full container from paths in ordinal order.
    pub fn from_paths<'a, I>(paths: I) -> Result<Self, ConfigError>
    where
        I: ExactSizeIterator<Item = &'a [u16]>,
    {
        let mut index = Self::with_capacity(paths.len())?;
        for path in paths {
            index.push(path)?;
        }

        Ok(index)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        usize::from(self.buf[CAP])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.buf[LEN])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a path and return the ordinal assigned to it.
    pub fn push(&mut self, path: &[u16]) -> Result<usize, ConfigError> {
        let ordinal = self.len();
        if ordinal >= self.capacity() {
            return Err(ConfigError::FieldIndexOverflow {
                detail: format!("container is full at {ordinal} attributes"),
            });
        }

        let from = self.buf.len();
        let to = from + path.len();
        let (Ok(from16), Ok(to16)) = (u16::try_from(from), u16::try_from(to)) else {
            return Err(ConfigError::FieldIndexOverflow {
                detail: format!("path storage exceeds {} slots", u16::MAX),
            });
        };

        self.buf.extend_from_slice(path);

        let slot = HEADER + ordinal * 2;
        self.buf[slot] = from16;
        self.buf[slot + 1] = to16;
        self.buf[LEN] += 1;

        Ok(ordinal)
    }

    /// Path stored for `ordinal`, if it has been pushed.
    #[must_use]
    pub fn resolve(&self, ordinal: usize) -> Option<&[u16]> {
        if ordinal >= self.len() {
            return None;
        }

        let slot = HEADER + ordinal * 2;
        let from = usize::from(self.buf[slot]);
        let to = usize::from(self.buf[slot + 1]);

        self.buf.get(from..to)
    }
}
