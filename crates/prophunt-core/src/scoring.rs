use crate::adapters::Host;
use crate::participant::Role;
use crate::session::Session;
use crate::stats::StatsDelta;
use crate::team::Team;

const MINUTE_MS: u64 = 60_000;

impl Session {
    /// Win bonuses, survival points, then one [`StatsDelta`] per participant.
    pub(crate) fn award_round(&mut self, host: &mut Host, winner: Team) {
        let now = host.now_ms();
        let minutes = self
            .started_at
            .map_or(0, |start| now.saturating_sub(start) / MINUTE_MS);
        let survival_points =
            u32::try_from(minutes).unwrap_or(u32::MAX).saturating_mul(self.settings.prop_survival_points_per_minute);
        let win_bonus = match winner {
            Team::Props => self.settings.prop_win_bonus,
            Team::Hunters => self.settings.hunter_win_bonus,
            Team::None | Team::Spectator => 0,
        };

        for id in self.roster.ids() {
            let alive_prop = self.roster.is_alive_prop(id);
            let alive = alive_prop || self.roster.is_alive_hunter(id);
            let Some(participant) = self.roster.get_mut(id) else {
                continue;
            };
            let side = participant.side();
            let won = side == winner;
            if won {
                participant.add_points(win_bonus);
            }
            if alive_prop {
                participant.add_points(survival_points);
            }

            let mut delta = StatsDelta {
                name: participant.name.clone(),
                side,
                won,
                survived: alive,
                points: participant.points,
                survival_secs: participant.seconds_in_game(now),
                ..StatsDelta::default()
            };
            match &participant.role {
                Role::Prop(prop) => delta.taunts = prop.voluntary_taunts,
                Role::Hunter(hunter) => {
                    delta.props_found = hunter.props_found;
                    delta.props_killed = hunter.props_killed;
                    delta.wrong_hits = hunter.wrong_hits;
                }
                Role::Waiting => {}
            }
            host.stats.record(id, delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::adapters::World;
    use crate::combat::AttackTarget;
    use crate::team::Team;
    use crate::test_helpers::Harness;

    #[test]
    fn surviving_props_get_bonus_and_minutes() {
        let mut h = Harness::hunting(2);
        let prop = h.session.roster().props()[0];
        let hunter = h.session.roster().hunters()[0];
        h.tick_seconds(300);
        assert_eq!(h.session.winner(), Some(Team::Props));

        // Lobby is skipped by force start, so the round spans hide + seek.
        let minutes = (h.session.settings().hide_time + 300) / 60;
        let expected = 100 + 10 * minutes;
        assert_eq!(h.session.roster().get(prop).unwrap().points, expected);
        assert_eq!(h.session.roster().get(hunter).unwrap().points, 0);

        let deltas = h.stats.deltas();
        assert_eq!(deltas.len(), 2);
        let prop_delta = &deltas.iter().find(|(id, _)| *id == prop).unwrap().1;
        assert!(prop_delta.won);
        assert!(prop_delta.survived);
        assert_eq!(prop_delta.side, Team::Props);
        assert_eq!(prop_delta.points, expected);
        let hunter_delta = &deltas.iter().find(|(id, _)| *id == hunter).unwrap().1;
        assert!(!hunter_delta.won);
    }

    #[test]
    fn eliminated_winner_still_wins_but_earns_no_survival() {
        let mut h = Harness::hunting(3);
        let hunter = h.session.roster().hunters()[0];
        let props = h.session.roster().props().to_vec();
        h.session
            .change_disguise(&mut h.host, props[0], "TORCH")
            .unwrap();
        let target = h.world().location(props[0]).unwrap().pos.block();
        for _ in 0..2 {
            h.session
                .attack(&mut h.host, hunter, AttackTarget::Block(target))
                .unwrap();
            h.advance_ms(1000);
        }
        assert!(!h.session.roster().is_alive_prop(props[0]));

        h.tick_seconds(300);
        assert_eq!(h.session.winner(), Some(Team::Props));
        let deltas = h.stats.deltas();
        let dead = &deltas.iter().find(|(id, _)| *id == props[0]).unwrap().1;
        assert!(dead.won);
        assert!(!dead.survived);
        assert_eq!(dead.points, 100);

        let hunter_delta = &deltas.iter().find(|(id, _)| *id == hunter).unwrap().1;
        assert_eq!(hunter_delta.props_killed, 1);
        assert_eq!(hunter_delta.props_found, 1);
        assert_eq!(hunter_delta.points, 25 + 25 + 50);
    }
}
