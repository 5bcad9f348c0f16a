use rand::seq::IndexedRandom;

use crate::adapters::Host;
use crate::error::RejectedAction;
use crate::events::{Announcement, Cue};
use crate::participant::ParticipantId;
use crate::session::Session;
use crate::state::GameState;

impl Session {
    /// A prop gives its position away for points.
    pub fn voluntary_taunt(&mut self, host: &mut Host, id: ParticipantId) -> Result<(), RejectedAction> {
        if !self.roster.contains(id) {
            return Err(RejectedAction::NotInGame);
        }
        if self.state != GameState::Hunting {
            return Err(RejectedAction::WrongPhase);
        }
        if !self.roster.is_alive_prop(id) {
            return Err(RejectedAction::NotAProp);
        }
        let now = host.now_ms();
        let cooldown = self.settings.voluntary_taunt_cooldown;
        let points = self.settings.voluntary_taunt_points;
        let participant = self.roster.get_mut(id).ok_or(RejectedAction::NotInGame)?;
        let state = participant.prop_mut().ok_or(RejectedAction::NotAProp)?;
        if let Some(left) = state.taunt_cooldown_left(now, cooldown) {
            return Err(RejectedAction::TauntOnCooldown(left));
        }
        state.record_taunt(now);
        participant.add_points(points);

        tracing::debug!(player = %id, "Voluntary taunt");
        self.emit_taunt(host, id);
        host.announce_to(id, Announcement::TauntSuccess);
        Ok(())
    }

    /// Repeating task: make one random alive prop reveal its position.
    pub(crate) fn forced_taunt(&mut self, host: &mut Host) {
        if self.state != GameState::Hunting {
            return;
        }
        let Some(id) = self.roster.props().choose(&mut host.rng).copied() else {
            return;
        };
        tracing::debug!(arena = %self.arena.name, player = %id, "Forced taunt");
        self.emit_taunt(host, id);
        host.announce_to(id, Announcement::ForcedTaunt);
    }

    /// Cue at the prop for everyone nearby, notice to the hunters.
    fn emit_taunt(&self, host: &mut Host, id: ParticipantId) {
        if let Some(loc) = host.world.location(id) {
            host.presentation.cue(None, loc.pos.raised(1.0), Cue::Taunt);
        }
        let hunters = self.roster.hunters().to_vec();
        host.announce(&hunters, Announcement::TauntHeard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{Harness, ready_arena};

    #[test]
    fn voluntary_taunt_awards_points_and_respects_cooldown() {
        let mut h = Harness::hunting(2);
        let prop = h.session.roster().props()[0];
        h.session.voluntary_taunt(&mut h.host, prop).unwrap();
        assert_eq!(h.session.roster().get(prop).unwrap().points, 50);
        assert_eq!(h.presentation.count("hunter.taunt-heard"), 1);
        assert_eq!(h.presentation.count("prop.taunt-success"), 1);

        h.advance_ms(10_000);
        assert_eq!(
            h.session.voluntary_taunt(&mut h.host, prop),
            Err(RejectedAction::TauntOnCooldown(20))
        );
        h.advance_ms(20_000);
        h.session.voluntary_taunt(&mut h.host, prop).unwrap();
        let p = h.session.roster().get(prop).unwrap();
        assert_eq!(p.points, 100);
        assert_eq!(p.prop().unwrap().voluntary_taunts, 2);
    }

    #[test]
    fn voluntary_taunt_only_while_hunting_and_only_props() {
        let mut arena = ready_arena("taunt");
        arena.settings.forced_taunt_interval = 0;
        let mut h = Harness::new(arena);
        let ids = h.join(2);
        assert_eq!(
            h.session.voluntary_taunt(&mut h.host, ids[0]),
            Err(RejectedAction::WrongPhase)
        );
        h.session.force_start(&mut h.host).unwrap();
        let prop = h.session.roster().props()[0];
        assert_eq!(
            h.session.voluntary_taunt(&mut h.host, prop),
            Err(RejectedAction::WrongPhase)
        );

        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        assert_eq!(
            h.session.voluntary_taunt(&mut h.host, hunter),
            Err(RejectedAction::NotAProp)
        );
    }

    #[test]
    fn forced_taunts_fire_on_interval_without_touching_cooldown() {
        let mut h = Harness::hunting(3);
        let interval = h.session.settings().forced_taunt_interval;
        h.tick_seconds(interval - 1);
        assert_eq!(h.presentation.count("prop.forced-taunt"), 0);
        h.tick_seconds(1);
        assert_eq!(h.presentation.count("prop.forced-taunt"), 1);
        h.tick_seconds(interval);
        assert_eq!(h.presentation.count("prop.forced-taunt"), 2);

        let prop = h.session.roster().props()[0];
        assert!(h.session.voluntary_taunt(&mut h.host, prop).is_ok());
    }

    #[test]
    fn zero_interval_disables_forced_taunts() {
        let mut arena = ready_arena("quiet");
        arena.settings.forced_taunt_interval = 0;
        let mut h = Harness::hunting_in(arena, 2);
        h.tick_seconds(200);
        assert_eq!(h.presentation.count("prop.forced-taunt"), 0);
    }
}
