//! Partitioning of an index range into contiguous chunks

/// One contiguous unit of chunked work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// First element index
    pub start: usize,
    /// Distance between consecutive elements; always 1 for contiguous chunks
    pub step: usize,
    /// Number of elements
    pub len: usize,
}

/// Disjoint chunks covering `[0, total)` in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPlan {
    chunks: Vec<Chunk>,
}

impl ChunkPlan {
    /// Split `total` elements for `workers` workers
    ///
    /// Every chunk holds `max(1, total / workers)` elements except the last,
    /// which also absorbs the remainder.
    pub fn new(total: usize, workers: usize) -> Self {
        if total == 0 {
            return Self::default();
        }
        let step_len = (total / workers.max(1)).max(1);
        let count = total / step_len;
        let chunks = (0..count)
            .map(|i| Chunk {
                start: i * step_len,
                step: 1,
                len: if i + 1 == count {
                    step_len + total % step_len
                } else {
                    step_len
                },
            })
            .collect();
        Self { chunks }
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
