// Splits an array of N items into T contiguous chunks.
// Every chunk has N / T items except the last, which also takes the N % T leftovers.

use std::ops::Range;

use crate::error::{ConfigError, ScanError};

/// Half-open range `[start, end)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Index of the chunk's final element, the one holding its total.
    pub fn last(&self) -> usize {
        self.end - 1
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A chunk of the array split into its final element and everything before it.
#[derive(Debug)]
pub struct ChunkView<'a> {
    pub body: &'a mut [i64],
    pub tail: &'a mut i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    len: usize,
    workers: usize,
    base: usize,
    remainder: usize,
}

impl Partition {
    pub fn new(len: usize, workers: usize) -> Result<Self, ScanError> {
        if workers == 0 {
            return Err(ConfigError::NoWorkers.into());
        }
        if len < workers {
            return Err(ConfigError::TooFewItems { len, workers }.into());
        }

        Ok(Self {
            len,
            workers,
            base: len / workers,
            remainder: len % workers,
        })
    }

    /// Length of the partitioned array, never zero.
    pub fn items(&self) -> usize {
        self.len
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Size of every chunk but the last.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Extra items absorbed by the last chunk.
    pub fn remainder(&self) -> usize {
        self.remainder
    }

    pub fn chunk(&self, index: usize) -> Chunk {
        assert!(index < self.workers, "chunk {index} out of {} workers", self.workers);

        let start = index * self.base;
        let end = if index == self.workers - 1 {
            start + self.base + self.remainder
        } else {
            start + self.base
        };
        Chunk { index, start, end }
    }

    pub fn chunks(&self) -> impl ExactSizeIterator<Item = Chunk> + '_ {
        (0..self.workers).map(move |index| self.chunk(index))
    }

    /// Split-borrows `data` into one view per chunk, in worker order.
    pub fn split<'a>(&self, data: &'a mut [i64]) -> Vec<ChunkView<'a>> {
        assert_eq!(data.len(), self.len, "array length does not match the partition");

        let mut views = Vec::with_capacity(self.workers);
        let mut rest = data;
        for chunk in self.chunks() {
            let (head, next) = rest.split_at_mut(chunk.len());
            rest = next;
            let Some((tail, body)) = head.split_last_mut() else {
                unreachable!("chunk {} is empty", chunk.index);
            };
            views.push(ChunkView { body, tail });
        }
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let partition = Partition::new(8, 4).unwrap();
        let ranges: Vec<_> = partition.chunks().map(|c| c.range()).collect();
        assert_eq!(ranges, vec![0..2, 2..4, 4..6, 6..8]);
        assert_eq!(partition.remainder(), 0);
    }

    #[test]
    fn test_last_chunk_takes_remainder() {
        let partition = Partition::new(4, 3).unwrap();
        assert_eq!(partition.base(), 1);
        assert_eq!(partition.remainder(), 1);
        let ranges: Vec<_> = partition.chunks().map(|c| c.range()).collect();
        assert_eq!(ranges, vec![0..1, 1..2, 2..4]);

        let partition = Partition::new(10, 4).unwrap();
        assert_eq!(partition.chunk(3), Chunk { index: 3, start: 6, end: 10 });
    }

    #[test]
    fn test_single_worker_owns_everything() {
        let partition = Partition::new(5, 1).unwrap();
        assert_eq!(partition.chunk(0).range(), 0..5);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(matches!(
            Partition::new(3, 4),
            Err(ScanError::Configuration(ConfigError::TooFewItems { len: 3, workers: 4 }))
        ));
        assert!(matches!(
            Partition::new(3, 0),
            Err(ScanError::Configuration(ConfigError::NoWorkers))
        ));
        assert!(Partition::new(0, 1).is_err());
        assert_eq!(Partition::new(1, 1).unwrap().items(), 1);
    }

    #[test]
    fn test_split_views_follow_chunks() {
        let mut data: Vec<i64> = (0..7).collect();
        let partition = Partition::new(7, 3).unwrap();
        let views = partition.split(&mut data);

        assert_eq!(views.len(), 3);
        assert_eq!(views[0].body, &[0]);
        assert_eq!(*views[0].tail, 1);
        assert_eq!(views[1].body, &[2]);
        assert_eq!(*views[1].tail, 3);
        assert_eq!(views[2].body, &[4, 5]);
        assert_eq!(*views[2].tail, 6);
    }

    #[test]
    fn test_split_with_one_item_chunks() {
        let mut data = vec![9, 8, 7];
        let partition = Partition::new(3, 3).unwrap();
        for (i, view) in partition.split(&mut data).into_iter().enumerate() {
            assert!(view.body.is_empty());
            assert_eq!(*view.tail, 9 - i as i64);
        }
    }
}
