use crate::{AdviceAction, Card, SelectionTarget, SessionToken};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DealerSet {
        card: Card,
        previous: Option<Card>,
    },
    PlayerCardAdded {
        index: usize,
        card: Card,
    },
    PlayerCardReplaced {
        index: usize,
        previous: Card,
        card: Card,
    },
    PlayerCardRemoved {
        index: usize,
        card: Card,
    },
    PlayerHandCleared {
        count: usize,
    },
    TableReset,
    PickerOpened {
        target: SelectionTarget,
    },
    PickerDismissed,
    AdviceRequested {
        token: SessionToken,
        dealer: Card,
        player: Vec<Card>,
    },
    AdviceResolved {
        token: SessionToken,
        action: AdviceAction,
        confidence: u8,
    },
    AdviceFailed {
        token: SessionToken,
        reason: String,
    },
    AdviceInvalidated,
    StaleAdviceDiscarded {
        token: SessionToken,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
