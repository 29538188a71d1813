use super::condition::ChainSnapshot;

/// Last successful poll, reused while the chain has not produced a new block.
#[derive(Debug, Default)]
pub(super) struct PollCursor {
    last: Option<ChainSnapshot>,
}

impl PollCursor {
    pub(super) fn cached_at(&self, block_number: u64) -> Option<&ChainSnapshot> {
        self.last
            .as_ref()
            .filter(|snapshot| snapshot.block_number == block_number)
    }

    pub(super) fn advance(&mut self, snapshot: ChainSnapshot) {
        self.last = Some(snapshot);
    }

    pub(super) fn last(&self) -> Option<&ChainSnapshot> {
        self.last.as_ref()
    }
}
