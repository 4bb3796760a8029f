use std::ops::Range;

/// Sorted set of pairwise disjoint byte ranges already claimed by tokens.
///
/// Replaces in-place redaction of the scanned text: a candidate match is
/// rejected when it intersects any claimed range.
#[derive(Debug, Default, Clone)]
pub(crate) struct ClaimSet {
    ranges: Vec<Range<usize>>,
}

impl ClaimSet {
    pub(crate) fn overlaps(&self, candidate: &Range<usize>) -> bool {
        // Ranges are disjoint and sorted, so their ends are sorted too.
        let idx = self.ranges.partition_point(|r| r.end <= candidate.start);
        self.ranges
            .get(idx)
            .is_some_and(|r| r.start < candidate.end)
    }

    /// Claims `range`. Returns false (and claims nothing) on overlap or empty range.
    pub(crate) fn claim(&mut self, range: Range<usize>) -> bool {
        if range.is_empty() || self.overlaps(&range) {
            return false;
        }
        let idx = self.ranges.partition_point(|r| r.end <= range.start);
        self.ranges.insert(idx, range);
        true
    }

    #[cfg(test)]
    pub(crate) fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }
}
