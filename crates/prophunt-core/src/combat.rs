use serde::{Deserialize, Serialize};

use crate::adapters::{HitContext, HitDecision, Host, StandInId};
use crate::effects::StatusEffect;
use crate::error::RejectedAction;
use crate::events::{Announcement, Cue};
use crate::geometry::BlockPos;
use crate::participant::ParticipantId;
use crate::session::{Session, SessionTask};
use crate::state::GameState;

/// What a hunter swung at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum AttackTarget {
    Block(BlockPos),
    StandIn(StandInId),
}

/// Result of a committed attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttackOutcome {
    Hit {
        prop: ParticipantId,
        damage: f64,
        first_reveal: bool,
        eliminated: bool,
    },
    /// Penalty applied to the hunter. `damage` is zero when the target
    /// could not be matched to a live prop.
    Miss { damage: f64, eliminated: bool },
    Vetoed,
}

enum Resolved {
    Prop(ParticipantId),
    Nothing,
    Stale,
}

impl Session {
    /// Resolve one hunter attack.
    ///
    /// Rejections leave everything untouched, including the attack cooldown.
    pub fn attack(
        &mut self,
        host: &mut Host,
        hunter: ParticipantId,
        target: AttackTarget,
    ) -> Result<AttackOutcome, RejectedAction> {
        if !self.roster.contains(hunter) {
            return Err(RejectedAction::NotInGame);
        }
        if self.state != GameState::Hunting {
            return Err(RejectedAction::WrongPhase);
        }
        if !self.roster.is_alive_hunter(hunter) {
            return Err(RejectedAction::NotAHunter);
        }
        let now = host.now_ms();
        let ready = self
            .roster
            .get(hunter)
            .and_then(|p| p.hunter())
            .is_some_and(|h| h.can_attack(now));
        if !ready {
            return Err(RejectedAction::AttackOnCooldown);
        }

        let resolved = match target {
            AttackTarget::Block(pos) => match self.prop_at_block(pos) {
                Some(prop) => Resolved::Prop(prop),
                None if host.world.block_at(pos).is_none() => {
                    return Err(RejectedAction::NoTarget);
                }
                None => Resolved::Nothing,
            },
            AttackTarget::StandIn(stand_in) => match self.prop_for_stand_in(stand_in) {
                Some(prop) => Resolved::Prop(prop),
                None => Resolved::Stale,
            },
        };

        match resolved {
            Resolved::Stale => {
                tracing::warn!(
                    arena = %self.arena.name,
                    hunter = %hunter,
                    ?target,
                    "Attack on a stand-in with no live owner; ignoring"
                );
                Ok(AttackOutcome::Miss {
                    damage: 0.0,
                    eliminated: false,
                })
            }
            Resolved::Prop(prop) => {
                self.record_attack(hunter, now);
                Ok(self.hit(host, hunter, prop, now))
            }
            Resolved::Nothing => {
                self.record_attack(hunter, now);
                Ok(self.miss(host, hunter))
            }
        }
    }

    fn record_attack(&mut self, hunter: ParticipantId, now: u64) {
        if let Some(h) = self.roster.get_mut(hunter).and_then(|p| p.hunter_mut()) {
            h.record_attack(now);
        }
    }

    /// Alive prop whose stand-in occupies `pos`.
    fn prop_at_block(&self, pos: BlockPos) -> Option<ParticipantId> {
        self.roster.props().iter().copied().find(|id| {
            self.roster
                .get(*id)
                .and_then(|p| p.prop())
                .and_then(|p| p.disguise.as_ref())
                .is_some_and(|d| d.anchor().pos.block() == pos)
        })
    }

    fn prop_for_stand_in(&self, stand_in: StandInId) -> Option<ParticipantId> {
        self.roster.props().iter().copied().find(|id| {
            self.roster
                .get(*id)
                .and_then(|p| p.prop())
                .and_then(|p| p.disguise.as_ref())
                .is_some_and(|d| d.stand_in() == stand_in)
        })
    }

    fn hit(
        &mut self,
        host: &mut Host,
        hunter: ParticipantId,
        prop: ParticipantId,
        now: u64,
    ) -> AttackOutcome {
        let first_reveal = self
            .roster
            .get(prop)
            .and_then(|p| p.prop())
            .is_some_and(|p| !p.revealed);
        let ctx = HitContext {
            hunter,
            prop,
            damage: self.settings.hit_damage,
            first_reveal,
        };
        let damage = match host.combat_hook.before_hit(&ctx) {
            HitDecision::Proceed { damage } => damage.max(0.0),
            HitDecision::Veto => {
                tracing::debug!(hunter = %hunter, prop = %prop, "Hit vetoed by hook");
                return AttackOutcome::Vetoed;
            }
        };

        if let Some(state) = self.roster.get_mut(prop).and_then(|p| p.prop_mut()) {
            state.reveal(now);
            if let Some(disguise) = state.disguise.as_mut() {
                if disguise.is_locked() {
                    disguise.set_locked(host.world.as_mut(), false);
                }
                disguise.set_glowing(host.world.as_mut(), true);
            }
        }
        if let Some(loc) = host.world.location(prop) {
            host.presentation.cue(None, loc.pos, Cue::Hit);
        }
        host.world.apply_effect(prop, StatusEffect::escape_boost());

        let health = host.world.health(prop) - damage;
        host.world.set_health(prop, health);
        let healed =
            (host.world.health(hunter) + self.settings.miss_penalty).min(host.world.max_health(hunter));
        host.world.set_health(hunter, healed);

        if first_reveal {
            self.reward_find(host, hunter);
        }

        let eliminated = health <= 0.0;
        if eliminated {
            self.eliminate_prop(host, hunter, prop);
        } else {
            host.announce_to(prop, Announcement::PropFound);
            self.scheduler
                .cancel_where(|t| *t == SessionTask::EscapeCheck(prop));
            let delay = u64::from(self.settings.escape_time) * 1000;
            self.scheduler
                .run_delayed(now, delay, SessionTask::EscapeCheck(prop));
        }

        AttackOutcome::Hit {
            prop,
            damage,
            first_reveal,
            eliminated,
        }
    }

    /// Found points, plus the round's first-blood bonus if still unclaimed.
    fn reward_find(&mut self, host: &mut Host, hunter: ParticipantId) {
        let first_blood = self.roster.award_first_blood();
        let found = self.settings.found_points;
        let bonus = self.settings.first_blood_bonus;
        let Some(participant) = self.roster.get_mut(hunter) else {
            return;
        };
        participant.add_points(found);
        if first_blood {
            participant.add_points(bonus);
        }
        let name = participant.name.clone();
        if let Some(h) = participant.hunter_mut() {
            h.props_found += 1;
            h.first_blood |= first_blood;
        }

        if first_blood {
            tracing::info!(arena = %self.arena.name, hunter = %hunter, "First blood");
            let everyone = self.roster.ids();
            host.announce(&everyone, Announcement::FirstBlood { hunter: name });
        }
        host.announce_to(hunter, Announcement::HitProp);
    }

    fn eliminate_prop(&mut self, host: &mut Host, hunter: ParticipantId, prop: ParticipantId) {
        let restored = self.settings.prop_health;
        let prop_name = match self.roster.get_mut(prop) {
            Some(p) => {
                if let Some(disguise) = p.prop_mut().and_then(|s| s.disguise.take()) {
                    disguise.remove(host.world.as_mut(), prop, restored);
                }
                p.name.clone()
            }
            None => return,
        };
        let kill_points = self.settings.kill_points;
        let hunter_name = match self.roster.get_mut(hunter) {
            Some(p) => {
                p.add_points(kill_points);
                if let Some(h) = p.hunter_mut() {
                    h.props_killed += 1;
                }
                p.name.clone()
            }
            None => String::new(),
        };
        self.scheduler
            .cancel_where(|t| *t == SessionTask::EscapeCheck(prop));
        self.roster.eliminate(prop);
        let winner = self.roster.winner();

        tracing::info!(arena = %self.arena.name, prop = %prop, hunter = %hunter, "Prop eliminated");
        let everyone = self.roster.ids();
        host.announce(
            &everyone,
            Announcement::PropEliminated {
                prop: prop_name,
                hunter: hunter_name,
            },
        );
        if let Some(loc) = host.world.location(prop) {
            host.presentation.cue(None, loc.pos, Cue::Kill);
        }
        self.conclude(host, winner);
    }

    fn miss(&mut self, host: &mut Host, hunter: ParticipantId) -> AttackOutcome {
        let damage = self.settings.miss_penalty;
        let health = host.world.health(hunter) - damage;
        host.world.set_health(hunter, health);
        if let Some(h) = self.roster.get_mut(hunter).and_then(|p| p.hunter_mut()) {
            h.wrong_hits += 1;
        }
        if let Some(loc) = host.world.location(hunter) {
            host.presentation.cue(Some(&[hunter]), loc.pos, Cue::Miss);
        }
        host.announce_to(hunter, Announcement::HitWrong { damage });

        let eliminated = health <= 0.0;
        if eliminated {
            let name = self
                .roster
                .get(hunter)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            self.roster.eliminate(hunter);
            let winner = self.roster.winner();
            tracing::info!(arena = %self.arena.name, hunter = %hunter, "Hunter eliminated by misses");
            let everyone = self.roster.ids();
            host.announce(&everyone, Announcement::HunterEliminated { hunter: name });
            self.conclude(host, winner);
        }
        AttackOutcome::Miss {
            damage,
            eliminated,
        }
    }

    /// Un-reveal a prop that went unhit for the escape window.
    pub(crate) fn check_escape(&mut self, host: &mut Host, id: ParticipantId) {
        if self.state != GameState::Hunting || !self.roster.is_alive_prop(id) {
            return;
        }
        let now = host.now_ms();
        let escape_time = self.settings.escape_time;
        let keep_glow = self.escalation.is_active(3);
        let escape_points = self.settings.escape_points;
        let Some(participant) = self.roster.get_mut(id) else {
            return;
        };
        let Some(state) = participant.prop_mut() else {
            return;
        };
        if !state.can_hide_again(now, escape_time) {
            return;
        }
        state.hide();
        if !keep_glow && let Some(disguise) = state.disguise.as_mut() {
            disguise.set_glowing(host.world.as_mut(), false);
        }
        participant.add_points(escape_points);
        tracing::debug!(player = %id, "Prop escaped");
        host.announce_to(id, Announcement::PropEscaped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{CombatHook, World};
    use crate::effects::EffectKind;
    use crate::team::Team;
    use crate::test_helpers::{Harness, ready_arena};

    fn prop_block(h: &Harness, prop: ParticipantId) -> BlockPos {
        h.world().location(prop).unwrap().pos.block()
    }

    fn miss_block() -> BlockPos {
        BlockPos::new(0, 64, 0)
    }

    /// Swap to a large prop so a few hits never kill it.
    fn sturdy(h: &mut Harness, prop: ParticipantId) {
        h.session.change_disguise(&mut h.host, prop, "BARREL").unwrap();
    }

    // ================================================================
    // Gates
    // ================================================================

    #[test]
    fn attack_inside_cooldown_rejected_without_damage() {
        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        h.session
            .attack(&mut h.host, hunter, AttackTarget::Block(miss_block()))
            .unwrap();
        let health = h.world().health(hunter);

        h.advance_ms(100);
        assert_eq!(
            h.session
                .attack(&mut h.host, hunter, AttackTarget::Block(miss_block())),
            Err(RejectedAction::AttackOnCooldown)
        );
        assert!((h.world().health(hunter) - health).abs() < f64::EPSILON);

        h.advance_ms(900);
        assert!(
            h.session
                .attack(&mut h.host, hunter, AttackTarget::Block(miss_block()))
                .is_ok()
        );
    }

    #[test]
    fn only_alive_hunters_attack_during_hunting() {
        let mut h = Harness::new(ready_arena("gates"));
        let ids = h.join(2);
        assert_eq!(
            h.session
                .attack(&mut h.host, ids[0], AttackTarget::Block(miss_block())),
            Err(RejectedAction::WrongPhase)
        );
        let mut h = Harness::hunting(2);
        let prop = h.session.roster().props()[0];
        assert_eq!(
            h.session
                .attack(&mut h.host, prop, AttackTarget::Block(miss_block())),
            Err(RejectedAction::NotAHunter)
        );
        assert_eq!(
            h.session.attack(
                &mut h.host,
                uuid::Uuid::new_v4(),
                AttackTarget::Block(miss_block())
            ),
            Err(RejectedAction::NotInGame)
        );
    }

    #[test]
    fn swinging_at_air_is_not_an_attack() {
        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        h.world().set_block(miss_block(), None);
        assert_eq!(
            h.session
                .attack(&mut h.host, hunter, AttackTarget::Block(miss_block())),
            Err(RejectedAction::NoTarget)
        );
        assert!(
            h.session
                .attack(&mut h.host, hunter, AttackTarget::Block(BlockPos::new(1, 64, 1)))
                .is_ok()
        );
    }

    // ================================================================
    // Hit path
    // ================================================================

    #[test]
    fn first_hit_reveals_and_awards_first_blood_once() {
        let mut h = Harness::hunting(3);
        let hunter = h.session.roster().hunters()[0];
        let props = h.session.roster().props().to_vec();
        sturdy(&mut h, props[0]);
        let target = prop_block(&h, props[0]);

        let outcome = h
            .session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        assert!(matches!(
            outcome,
            AttackOutcome::Hit {
                first_reveal: true,
                eliminated: false,
                ..
            }
        ));
        let p = h.session.roster().get(props[0]).unwrap();
        assert!(p.prop().unwrap().revealed);
        let hunter_p = h.session.roster().get(hunter).unwrap();
        assert_eq!(hunter_p.points, 25 + 25);
        assert!(hunter_p.hunter().unwrap().first_blood);
        assert_eq!(h.presentation.count("hunter.first-blood"), 1);
        assert!(h.world().has_effect(props[0], EffectKind::Speed));

        // Same prop again: no new find, no first blood.
        h.advance_ms(1000);
        let outcome = h
            .session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        assert!(matches!(
            outcome,
            AttackOutcome::Hit {
                first_reveal: false,
                ..
            }
        ));
        assert_eq!(h.session.roster().get(hunter).unwrap().points, 50);
        assert_eq!(h.presentation.count("hunter.first-blood"), 1);
    }

    #[test]
    fn small_prop_dies_in_two_hits_and_hunters_win() {
        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        let prop = h.session.roster().props()[0];
        h.session.change_disguise(&mut h.host, prop, "TORCH").unwrap();
        assert!((h.world().health(prop) - 8.0).abs() < f64::EPSILON);
        let target = prop_block(&h, prop);

        h.session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        assert!((h.world().health(prop) - 4.0).abs() < f64::EPSILON);
        h.advance_ms(1000);
        let outcome = h
            .session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        assert!(matches!(outcome, AttackOutcome::Hit { eliminated: true, .. }));

        assert!(!h.session.roster().is_alive_prop(prop));
        assert_eq!(h.session.roster().get(prop).unwrap().team, Team::Spectator);
        assert_eq!(h.session.state(), GameState::Ending);
        assert_eq!(h.session.winner(), Some(Team::Hunters));
        assert_eq!(h.world().stand_in_count(), 0);
        let hunter_p = h.session.roster().get(hunter).unwrap();
        assert_eq!(hunter_p.hunter().unwrap().props_killed, 1);
        assert_eq!(h.presentation.count("game.hunter-win"), 1);
    }

    #[test]
    fn hit_unlocks_and_stand_in_target_resolves() {
        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        let prop = h.session.roster().props()[0];
        h.session.toggle_lock(&mut h.host, prop).unwrap();
        let stand_in = h.stand_in_of(prop);

        h.session
            .attack(&mut h.host, hunter, AttackTarget::StandIn(stand_in))
            .unwrap();
        let p = h.session.roster().get(prop).unwrap().prop().unwrap();
        assert!(!p.is_locked());
        assert!(h.world().stand_in(stand_in).unwrap().glowing);
    }

    #[test]
    fn hit_heals_hunter_up_to_max() {
        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        let prop = h.session.roster().props()[0];
        sturdy(&mut h, prop);
        h.session
            .attack(&mut h.host, hunter, AttackTarget::Block(miss_block()))
            .unwrap();
        assert!((h.world().health(hunter) - 18.0).abs() < f64::EPSILON);
        h.advance_ms(1000);
        let target = prop_block(&h, prop);
        h.session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        assert!((h.world().health(hunter) - 20.0).abs() < f64::EPSILON);
        h.advance_ms(1000);
        h.session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        assert!((h.world().health(hunter) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stale_stand_in_is_a_logged_noop() {
        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        let outcome = h
            .session
            .attack(&mut h.host, hunter, AttackTarget::StandIn(9_999))
            .unwrap();
        assert_eq!(
            outcome,
            AttackOutcome::Miss {
                damage: 0.0,
                eliminated: false
            }
        );
        assert!((h.world().health(hunter) - 20.0).abs() < f64::EPSILON);
        // Cooldown untouched: an immediate real attack goes through.
        assert!(
            h.session
                .attack(&mut h.host, hunter, AttackTarget::Block(miss_block()))
                .is_ok()
        );
    }

    // ================================================================
    // Hook
    // ================================================================

    struct Shield;

    impl CombatHook for Shield {
        fn before_hit(&mut self, _ctx: &HitContext) -> HitDecision {
            HitDecision::Veto
        }
    }

    struct Double;

    impl CombatHook for Double {
        fn before_hit(&mut self, ctx: &HitContext) -> HitDecision {
            HitDecision::Proceed {
                damage: ctx.damage * 2.0,
            }
        }
    }

    #[test]
    fn vetoed_hit_changes_nothing_but_cooldown() {
        let mut h = Harness::hunting(2);
        h.host.combat_hook = Box::new(Shield);
        let hunter = h.session.roster().hunters()[0];
        let prop = h.session.roster().props()[0];
        let target = prop_block(&h, prop);
        let before = h.world().health(prop);

        let outcome = h
            .session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        assert_eq!(outcome, AttackOutcome::Vetoed);
        assert!((h.world().health(prop) - before).abs() < f64::EPSILON);
        assert!(!h.session.roster().get(prop).unwrap().prop().unwrap().revealed);
        assert_eq!(
            h.session
                .attack(&mut h.host, hunter, AttackTarget::Block(target)),
            Err(RejectedAction::AttackOnCooldown)
        );
    }

    #[test]
    fn hook_can_rescale_damage() {
        let mut h = Harness::hunting(2);
        h.host.combat_hook = Box::new(Double);
        let hunter = h.session.roster().hunters()[0];
        let prop = h.session.roster().props()[0];
        sturdy(&mut h, prop);
        let before = h.world().health(prop);
        let target = prop_block(&h, prop);
        h.session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        assert!((h.world().health(prop) - (before - 8.0)).abs() < f64::EPSILON);
    }

    // ================================================================
    // Miss path
    // ================================================================

    #[test]
    fn repeated_misses_eliminate_hunter_and_props_win() {
        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        for _ in 0..9 {
            let outcome = h
                .session
                .attack(&mut h.host, hunter, AttackTarget::Block(miss_block()))
                .unwrap();
            assert!(matches!(outcome, AttackOutcome::Miss { eliminated: false, .. }));
            h.advance_ms(1000);
        }
        let outcome = h
            .session
            .attack(&mut h.host, hunter, AttackTarget::Block(miss_block()))
            .unwrap();
        assert!(matches!(outcome, AttackOutcome::Miss { eliminated: true, .. }));
        assert_eq!(h.session.state(), GameState::Ending);
        assert_eq!(h.session.winner(), Some(Team::Props));
        let hunter_p = h.session.roster().get(hunter).unwrap();
        assert_eq!(hunter_p.hunter().unwrap().wrong_hits, 10);
        assert_eq!(h.presentation.count("game.hunter-eliminated"), 1);
    }

    // ================================================================
    // Escape
    // ================================================================

    #[test]
    fn unhit_prop_escapes_after_window() {
        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        let prop = h.session.roster().props()[0];
        sturdy(&mut h, prop);
        let target = prop_block(&h, prop);
        h.session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();

        h.tick_seconds(9);
        assert!(h.session.roster().get(prop).unwrap().prop().unwrap().revealed);
        h.tick_seconds(1);
        let p = h.session.roster().get(prop).unwrap();
        assert!(!p.prop().unwrap().revealed);
        assert_eq!(p.prop().unwrap().times_escaped, 1);
        assert_eq!(p.points, 20);
        let stand_in = h.stand_in_of(prop);
        assert!(!h.world().stand_in(stand_in).unwrap().glowing);
        assert_eq!(h.presentation.count("prop.escaped"), 1);
    }

    #[test]
    fn escape_during_final_phase_keeps_glow() {
        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        let prop = h.session.roster().props()[0];
        sturdy(&mut h, prop);
        let to_phase_three = h.session.remaining() - 30;
        h.tick_seconds(to_phase_three);
        assert_eq!(h.session.escalation().phase(), 3);

        let target = prop_block(&h, prop);
        h.session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        h.tick_seconds(10);
        assert_eq!(h.session.state(), GameState::Hunting);
        let p = h.session.roster().get(prop).unwrap().prop().unwrap();
        assert!(!p.revealed);
        assert_eq!(p.times_escaped, 1);
        let stand_in = h.stand_in_of(prop);
        assert!(h.world().stand_in(stand_in).unwrap().glowing);
    }

    #[test]
    fn rehit_restarts_escape_window() {
        let mut h = Harness::hunting(2);
        let hunter = h.session.roster().hunters()[0];
        let prop = h.session.roster().props()[0];
        sturdy(&mut h, prop);
        let target = prop_block(&h, prop);
        h.session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        h.tick_seconds(6);
        h.session
            .attack(&mut h.host, hunter, AttackTarget::Block(target))
            .unwrap();
        h.tick_seconds(6);
        assert!(h.session.roster().get(prop).unwrap().prop().unwrap().revealed);
        h.tick_seconds(4);
        assert!(!h.session.roster().get(prop).unwrap().prop().unwrap().revealed);
        assert_eq!(h.presentation.count("prop.escaped"), 1);
    }
}
