//! Table logic for the blackjack oracle. Keep this crate free of IO and platform concerns.

pub mod advice;
pub mod cards;
pub mod events;
pub mod hand;
pub mod selection;
pub mod table;

pub use advice::*;
pub use cards::*;
pub use events::*;
pub use hand::*;
pub use selection::*;
pub use table::*;
