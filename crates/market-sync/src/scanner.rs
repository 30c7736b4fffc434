use market_core::Result;
use std::fmt;
use std::future::Future;
use tracing::warn;

/// Inclusive block interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl BlockRange {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    /// Number of blocks covered
    pub fn len(&self) -> u64 {
        if self.from > self.to {
            0
        } else {
            self.to - self.from + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

/// Ascending sub-ranges `[start, min(start + width, to)]` covering
/// `[from, to]` without gaps or overlaps
#[derive(Debug, Clone)]
pub struct ChunkRanges {
    next: Option<u64>,
    to: u64,
    width: u64,
}

impl ChunkRanges {
    pub fn new(from: u64, to: u64, width: u64) -> Self {
        Self {
            next: (from <= to).then_some(from),
            to,
            width,
        }
    }
}

impl Iterator for ChunkRanges {
    type Item = BlockRange;

    fn next(&mut self) -> Option<BlockRange> {
        let start = self.next?;
        let end = start.saturating_add(self.width).min(self.to);
        self.next = if end < self.to { Some(end + 1) } else { None };
        Some(BlockRange::new(start, end))
    }
}

/// Result of one chunk query
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome<T> {
    Fetched { range: BlockRange, value: T },
    Skipped { range: BlockRange, reason: String },
}

impl<T> ChunkOutcome<T> {
    pub fn range(&self) -> BlockRange {
        match self {
            Self::Fetched { range, .. } | Self::Skipped { range, .. } => *range,
        }
    }
}

/// Every chunk of a scan, in order
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport<T> {
    pub outcomes: Vec<ChunkOutcome<T>>,
}

impl<T> ScanReport<T> {
    pub fn fetched(&self) -> impl Iterator<Item = &T> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ChunkOutcome::Fetched { value, .. } => Some(value),
            ChunkOutcome::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> Vec<BlockRange> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ChunkOutcome::Skipped { range, .. } => Some(*range),
                ChunkOutcome::Fetched { .. } => None,
            })
            .collect()
    }

    pub fn chunk_count(&self) -> usize {
        self.outcomes.len()
    }
}

/// Runs a step over consecutive chunks of a block range.
///
/// Chunks are processed one at a time. A failed chunk is recorded as skipped
/// and the scan moves on to the next one; it is not retried.
#[derive(Debug, Clone, Copy)]
pub struct ChunkedScanner {
    width: u64,
}

impl ChunkedScanner {
    pub fn new(width: u64) -> Self {
        Self { width }
    }

    pub fn width(&self) -> u64 {
        self.width
    }

    pub fn chunks(&self, from: u64, to: u64) -> ChunkRanges {
        ChunkRanges::new(from, to, self.width)
    }

    pub async fn scan<T, F, Fut>(&self, from: u64, to: u64, mut step: F) -> ScanReport<T>
    where
        F: FnMut(BlockRange) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut outcomes = Vec::new();

        for range in self.chunks(from, to) {
            match step(range).await {
                Ok(value) => outcomes.push(ChunkOutcome::Fetched { range, value }),
                Err(e) => {
                    warn!(from = range.from, to = range.to, error = %e, "Chunk failed, skipping");
                    outcomes.push(ChunkOutcome::Skipped {
                        range,
                        reason: e.to_string(),
                    });
                }
            }
        }

        ScanReport { outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::MarketError;

    #[test]
    fn test_chunks_cover_range_without_gaps_or_overlap() {
        for (from, to, width) in [(0u64, 12_000u64, 5_000u64), (7, 7, 5), (100, 131, 10), (1, 2, 0)] {
            let chunks: Vec<BlockRange> = ChunkRanges::new(from, to, width).collect();

            assert_eq!(chunks.first().unwrap().from, from);
            assert_eq!(chunks.last().unwrap().to, to);
            for pair in chunks.windows(2) {
                assert_eq!(pair[1].from, pair[0].to + 1);
            }
            for chunk in &chunks {
                assert!(chunk.from <= chunk.to);
                assert!(chunk.len() <= width + 1);
            }
            assert_eq!(chunks.iter().map(BlockRange::len).sum::<u64>(), to - from + 1);
        }
    }

    #[test]
    fn test_twelve_thousand_blocks_take_three_chunks() {
        let chunks: Vec<BlockRange> = ChunkRanges::new(1, 12_000, 5_000).collect();
        assert_eq!(
            chunks,
            vec![
                BlockRange::new(1, 5_001),
                BlockRange::new(5_002, 10_002),
                BlockRange::new(10_003, 12_000),
            ]
        );
    }

    #[test]
    fn test_inverted_range_has_no_chunks() {
        assert_eq!(ChunkRanges::new(10, 9, 5).count(), 0);
    }

    #[test]
    fn test_range_ending_at_u64_max_terminates() {
        let chunks: Vec<BlockRange> = ChunkRanges::new(u64::MAX - 3, u64::MAX, 2).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].to, u64::MAX);
    }

    #[tokio::test]
    async fn test_failed_chunk_does_not_stop_scan() {
        let scanner = ChunkedScanner::new(9);
        let mut visited = Vec::new();

        let report = scanner
            .scan(0, 39, |range| {
                visited.push(range);
                async move {
                    if range.from == 10 {
                        Err(MarketError::Rpc("timeout".to_string()))
                    } else {
                        Ok(range.len())
                    }
                }
            })
            .await;

        assert_eq!(visited.len(), 4);
        assert_eq!(report.chunk_count(), 4);
        assert_eq!(report.skipped(), vec![BlockRange::new(10, 19)]);
        assert_eq!(report.fetched().copied().collect::<Vec<_>>(), vec![10, 10, 10]);
    }
}
