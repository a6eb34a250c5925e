//! Round orchestration, economy and the player-facing game layer

pub mod autoplay;
pub mod profile;
pub mod session;

pub use autoplay::{play_auto_game, AutoGame, AutoStrategy};
pub use profile::Profile;
pub use session::{GameSession, GameSummary, Offer, RoundReport, Scoreboard};
