use serde::Serialize;

pub type UserId = u64;
pub type ItemId = u64;
pub type Amount = f64;

/// How many entries a per-item ranking keeps.
pub const MAX_RANKED_BIDS: usize = 15;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Bid {
    #[serde(rename = "userID")]
    pub user: UserId,
    pub amount: Amount,
}

/// Bounded, sorted list of the best bids for one item.
///
/// Holds at most [`MAX_RANKED_BIDS`] entries, sorted by amount descending,
/// with at most one entry per user (their current best). Among equal
/// amounts the entry that arrived first stays ahead.
#[derive(Default, Debug)]
pub struct BidRanking {
    bids: Vec<Bid>,
    // Exact at capacity. Below capacity it may lag behind a raised entry,
    // i.e. it is a lower bound on the last entry's amount, which only
    // widens the append fast path in `submit`.
    min_amount: Amount,
}

impl BidRanking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incorporate one bid, keeping the list sorted in place.
    ///
    /// O(K) worst case per call: placement is a backward scan over a
    /// 15-slot vector, so no heap and no per-user index is needed.
    pub fn submit(&mut self, bid: Bid) {
        if self.bids.is_empty() {
            self.min_amount = bid.amount;
            self.bids.push(bid);
        } else if self.bids.len() < MAX_RANKED_BIDS {
            match self.position_of(bid.user) {
                Some(at) => self.raise(at, bid),
                None if bid.amount <= self.min_amount => {
                    self.min_amount = bid.amount;
                    self.bids.push(bid);
                }
                None => self.place(bid),
            }
        } else {
            match self.position_of(bid.user) {
                Some(at) => self.raise(at, bid),
                None => {
                    if bid.amount <= self.min_amount {
                        return;
                    }
                    self.bids.pop();
                    self.place(bid);
                }
            }
            self.min_amount = self.bids[MAX_RANKED_BIDS - 1].amount;
        }
    }

    /// Owned copy of the current standings, best first.
    pub fn snapshot(&self) -> Vec<Bid> {
        self.bids.clone()
    }

    fn position_of(&self, user: UserId) -> Option<usize> {
        self.bids.iter().position(|b| b.user == user)
    }

    /// Raise an existing user's entry to a strictly higher amount. The
    /// entry can only move toward the front, so a backward swap scan is
    /// enough to restore order. Anything else is a no-op.
    fn raise(&mut self, at: usize, bid: Bid) {
        if bid.amount <= self.bids[at].amount {
            return;
        }
        self.bids[at] = bid;
        let mut at = at;
        while at > 0 && self.bids[at - 1].amount < self.bids[at].amount {
            self.bids.swap(at - 1, at);
            at -= 1;
        }
    }

    /// Slot a new entry in right behind the last entry at least as large
    /// as it, scanning from the back. Equal amounts keep arrival order.
    fn place(&mut self, bid: Bid) {
        let mut at = self.bids.len();
        while at > 0 && self.bids[at - 1].amount < bid.amount {
            at -= 1;
        }
        self.bids.insert(at, bid);
    }
}
