use serde::{Deserialize, Serialize};

use crate::adapters::Host;
use crate::effects::StatusEffect;
use crate::events::{Announcement, Cue};
use crate::participant::ParticipantId;
use crate::session::{PhaseKey, Session};
use crate::settings::EscalationThresholds;

const HINT_RADIUS: f64 = 30.0;
const HEARTBEAT_RADIUS: f64 = 20.0;
const HINT_EVERY: u32 = 15;
const HEARTBEAT_EVERY: u32 = 5;

/// The three one-way phases of one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    active: [bool; 3],
}

impl Escalation {
    /// Highest active phase, 0 when none.
    pub fn phase(&self) -> u8 {
        self.active
            .iter()
            .rposition(|a| *a)
            .map_or(0, |i| i as u8 + 1)
    }

    pub fn is_active(&self, phase: u8) -> bool {
        (1..=3).contains(&phase) && self.active[usize::from(phase - 1)]
    }

    /// Activate every phase whose threshold `remaining` has reached, lowest
    /// first. Returns the phases that were newly activated.
    pub fn advance(&mut self, remaining: u32, thresholds: &EscalationThresholds) -> Vec<u8> {
        let limits = [
            thresholds.phase_one,
            thresholds.phase_two,
            thresholds.phase_three,
        ];
        let mut activated = Vec::new();
        for (i, limit) in limits.into_iter().enumerate() {
            if remaining <= limit && !self.active[i] {
                self.active[i] = true;
                activated.push(i as u8 + 1);
            }
        }
        activated
    }

    pub fn reset(&mut self) {
        self.active = [false; 3];
    }
}

impl Session {
    /// Once-per-second escalation step. Only runs while the seek countdown is
    /// armed.
    pub(crate) fn run_escalation(&mut self, host: &mut Host) {
        if !self.countdown.is_armed(PhaseKey::Seek) {
            return;
        }
        let remaining = self.countdown.remaining();
        for phase in self.escalation.advance(remaining, &self.settings.escalation) {
            self.activate_phase(host, phase);
        }

        if self.escalation.is_active(3) {
            for prop in self.roster.props().to_vec() {
                if let Some(loc) = host.world.location(prop) {
                    host.presentation.cue(None, loc.pos.raised(2.0), Cue::Ambient);
                }
            }
        } else if self.escalation.is_active(2) && remaining % HEARTBEAT_EVERY == 0 {
            self.hint_hunters(host, HEARTBEAT_RADIUS, 1.5, Cue::Heartbeat);
        } else if self.escalation.is_active(1) && remaining % HINT_EVERY == 0 {
            self.hint_hunters(host, HINT_RADIUS, 2.0, Cue::Hint);
        }
    }

    fn activate_phase(&mut self, host: &mut Host, phase: u8) {
        tracing::info!(arena = %self.arena.name, phase, "Escalation phase activated");
        let everyone = self.roster.ids();
        host.announce(&everyone, Announcement::LateGame { phase });

        match phase {
            2 => {
                for hunter in self.roster.hunters() {
                    host.world.apply_effect(*hunter, StatusEffect::hunter_rush());
                }
            }
            3 => {
                let props = self.roster.props().to_vec();
                for id in &props {
                    if let Some(disguise) = self
                        .roster
                        .get_mut(*id)
                        .and_then(|p| p.prop_mut())
                        .and_then(|p| p.disguise.as_mut())
                    {
                        disguise.set_glowing(host.world.as_mut(), true);
                    }
                }
                host.announce(&props, Announcement::PropGlowing);
                for id in &everyone {
                    if let Some(loc) = host.world.location(*id) {
                        host.presentation.cue(Some(&[*id]), loc.pos, Cue::Alarm);
                    }
                }
            }
            _ => {}
        }
    }

    /// Play `cue` above every alive prop for the hunters within `radius`.
    fn hint_hunters(&self, host: &mut Host, radius: f64, lift: f64, cue: Cue) {
        for prop in self.roster.props() {
            let Some(loc) = host.world.location(*prop) else {
                continue;
            };
            let at = loc.pos.raised(lift);
            let near: Vec<ParticipantId> = self
                .roster
                .hunters()
                .iter()
                .copied()
                .filter(|h| {
                    host.world
                        .location(*h)
                        .is_some_and(|l| l.pos.distance(&at) < radius)
                })
                .collect();
            if !near.is_empty() {
                host.presentation.cue(Some(&near), at, cue);
            }
        }
    }
}
