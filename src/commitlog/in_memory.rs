use crate::commitlog::{Log, LogError, Sequence};

// The log lives only as long as the leader process. There is no recovery after restart.
pub struct InMemoryLog<E> {
    log: Vec<E>,
    max_entries: u64,
}

impl<E> InMemoryLog<E> {
    pub fn create(max_entries: u64) -> Self {
        InMemoryLog {
            log: vec![],
            max_entries,
        }
    }
}

impl<E> Log<E> for InMemoryLog<E> {
    fn append(&mut self, entry: E) -> Result<Sequence, LogError> {
        if self.len() >= self.max_entries {
            return Err(LogError::CapacityExceeded {
                max_entries: self.max_entries,
            });
        }

        let sequence = self.next_sequence();
        self.log.push(entry);

        Ok(sequence)
    }

    fn read(&self, sequence: Sequence) -> Option<&E> {
        self.log.get(sequence.as_usize())
    }

    fn read_mut(&mut self, sequence: Sequence) -> Option<&mut E> {
        self.log.get_mut(sequence.as_usize())
    }

    fn slice(&self, start: Sequence, end: Sequence) -> Result<&[E], LogError> {
        let len = self.len();
        if end.as_u64() > len || start > end {
            return Err(LogError::OutOfRange { start, end, len });
        }

        Ok(&self.log[start.as_usize()..end.as_usize()])
    }

    fn len(&self) -> u64 {
        self.log.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_dense_sequences() {
        let mut log = InMemoryLog::create(10);

        for i in 0..5u64 {
            assert_eq!(log.next_sequence(), Sequence::new(i));
            assert_eq!(log.append(format!("entry-{}", i)), Ok(Sequence::new(i)));
        }

        assert_eq!(log.len(), 5);
        assert_eq!(log.read(Sequence::new(3)).map(String::as_str), Some("entry-3"));
        assert_eq!(log.read(Sequence::new(5)), None);
    }

    #[test]
    fn append_past_capacity() {
        let mut log = InMemoryLog::create(2);
        log.append(1).unwrap();
        log.append(2).unwrap();

        assert_eq!(log.append(3), Err(LogError::CapacityExceeded { max_entries: 2 }));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn slice_bounds() {
        let mut log = InMemoryLog::create(10);
        for i in 0..3 {
            log.append(i).unwrap();
        }

        assert_eq!(log.slice(Sequence::new(0), Sequence::new(3)).unwrap(), &[0, 1, 2]);
        assert_eq!(log.slice(Sequence::new(1), Sequence::new(2)).unwrap(), &[1]);
        assert_eq!(log.slice(Sequence::new(3), Sequence::new(3)).unwrap(), &[] as &[i32]);

        assert!(matches!(
            log.slice(Sequence::new(2), Sequence::new(4)),
            Err(LogError::OutOfRange { len: 3, .. })
        ));
        assert!(matches!(
            log.slice(Sequence::new(2), Sequence::new(1)),
            Err(LogError::OutOfRange { .. })
        ));
    }
}
