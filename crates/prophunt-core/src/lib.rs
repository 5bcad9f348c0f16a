pub mod adapters;
pub mod arena;
pub mod combat;
pub mod disguise;
pub mod effects;
pub mod error;
pub mod escalation;
pub mod events;
pub mod geometry;
pub mod participant;
pub mod roster;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod state;
pub mod stats;
pub mod taunt;
pub mod team;
pub mod timer;
pub mod world;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use adapters::Host;
pub use arena::Arena;
pub use combat::{AttackOutcome, AttackTarget};
pub use error::{ConfigError, RejectedAction};
pub use participant::ParticipantId;
pub use session::{Session, SessionSnapshot};
pub use settings::GameSettings;
pub use state::GameState;
pub use team::Team;
