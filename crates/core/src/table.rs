use crate::{
    AdviceOrchestrator, AdviceOutcome, AdviceSession, Advisor, Card, CardFace, CardIds, Event,
    EventBus, HandStore, PlayerSlot, SelectionController, SelectionTarget, SessionToken,
};

/// One table: the hand, the picker selection and the advice session.
///
/// This is the only place that mutates the three stores, so every change to
/// the hand also invalidates advice computed for the previous hand.
#[derive(Debug, Default)]
pub struct Table {
    hand: HandStore,
    selection: SelectionController,
    advice: AdviceOrchestrator,
    ids: CardIds,
    events: EventBus,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hand(&self) -> &HandStore {
        &self.hand
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn session(&self) -> &AdviceSession {
        self.advice.session()
    }

    pub fn can_ask(&self) -> bool {
        self.hand.can_ask()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain()
    }

    /// A fresh card instance for a picker cell.
    pub fn mint(&mut self, face: CardFace) -> Card {
        self.ids.mint(face)
    }

    pub fn open_picker(&mut self, target: SelectionTarget) {
        self.selection.open_picker(target, &mut self.events);
    }

    pub fn dismiss_picker(&mut self) {
        self.selection.dismiss(&mut self.events);
    }

    pub fn choose_card(&mut self, card: Card) -> Option<SelectionTarget> {
        let revision = self.hand.revision();
        let committed = self
            .selection
            .choose_card(card, &mut self.hand, &mut self.events);
        self.invalidate_if_changed(revision);
        committed
    }

    /// Mints a card for `face` and commits it to the active target.
    pub fn choose_face(&mut self, face: CardFace) -> Option<SelectionTarget> {
        let card = self.mint(face);
        self.choose_card(card)
    }

    pub fn set_dealer(&mut self, card: Card) {
        let revision = self.hand.revision();
        self.hand.set_dealer(card, &mut self.events);
        self.invalidate_if_changed(revision);
    }

    pub fn place_or_replace_player_card(&mut self, card: Card, slot: PlayerSlot) {
        let revision = self.hand.revision();
        self.hand
            .place_or_replace_player_card(card, slot, &mut self.events);
        self.invalidate_if_changed(revision);
    }

    pub fn remove_player_card(&mut self, index: usize) {
        let revision = self.hand.revision();
        self.hand.remove_player_card(index, &mut self.events);
        self.invalidate_if_changed(revision);
    }

    /// Invalidates advice even when the player hand was already empty.
    pub fn clear_player_hand(&mut self) {
        self.hand.clear_player_hand(&mut self.events);
        self.advice.invalidate(&mut self.events);
    }

    /// New table: no cards, no advice.
    pub fn reset_table(&mut self) {
        self.hand.reset(&mut self.events);
        self.advice.reset_session();
    }

    pub fn reset_session(&mut self) {
        self.advice.reset_session();
    }

    pub fn request_advice(&mut self, advisor: &mut dyn Advisor) -> Option<SessionToken> {
        self.advice
            .request_advice(&self.hand, advisor, &mut self.events)
    }

    pub fn complete_advice(&mut self, token: SessionToken, outcome: AdviceOutcome) -> bool {
        self.advice.complete(token, outcome, &mut self.events)
    }

    fn invalidate_if_changed(&mut self, revision: u64) {
        if self.hand.revision() != revision {
            self.advice.invalidate(&mut self.events);
        }
    }
}
