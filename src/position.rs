/// Position generator for a single pass over an input sequence.
///
/// Positions start at zero and grow by exactly one per consumed element.
/// Unlike rule IDs, positions are never freed or reused.
#[derive(Debug, Default, Clone)]
pub(crate) struct PositionCounter {
    next: usize,
}

impl PositionCounter {
    /// Creates a new counter starting from position 0.
    pub(crate) fn new() -> Self {
        Self { next: 0 }
    }

    /// Claims the next position.
    pub(crate) fn advance(&mut self) -> usize {
        let position = self.next;
        self.next += 1;
        position
    }

    /// Number of positions handed out so far.
    pub(crate) fn consumed(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_positions() {
        let mut counter = PositionCounter::new();
        assert_eq!(counter.advance(), 0);
        assert_eq!(counter.advance(), 1);
        assert_eq!(counter.advance(), 2);
        assert_eq!(counter.consumed(), 3);
    }

    #[test]
    fn test_fresh_counter_is_empty() {
        let counter = PositionCounter::new();
        assert_eq!(counter.consumed(), 0);
    }
}
