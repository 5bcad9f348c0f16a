use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::participant::{HunterState, Participant, ParticipantId, PropState, Role};
use crate::settings::GameSettings;
use crate::team::{Team, TeamSelectionMode};

/// Owns every participant of a session and the partition each belongs to.
///
/// Every id is in exactly one of waiting, props, hunters or spectators.
/// Partitions are ordered vectors so iteration is deterministic for a
/// seeded rng.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    participants: HashMap<ParticipantId, Participant>,
    waiting: Vec<ParticipantId>,
    props: Vec<ParticipantId>,
    hunters: Vec<ParticipantId>,
    spectators: Vec<ParticipantId>,
    first_blood: bool,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.contains_key(&id)
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn get_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.get_mut(&id)
    }

    /// All ids in partition order: waiting, props, hunters, spectators.
    pub fn ids(&self) -> Vec<ParticipantId> {
        self.waiting
            .iter()
            .chain(&self.props)
            .chain(&self.hunters)
            .chain(&self.spectators)
            .copied()
            .collect()
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn waiting(&self) -> &[ParticipantId] {
        &self.waiting
    }

    /// Props still alive.
    pub fn props(&self) -> &[ParticipantId] {
        &self.props
    }

    /// Hunters still alive.
    pub fn hunters(&self) -> &[ParticipantId] {
        &self.hunters
    }

    pub fn spectators(&self) -> &[ParticipantId] {
        &self.spectators
    }

    pub fn is_alive_prop(&self, id: ParticipantId) -> bool {
        self.props.contains(&id)
    }

    pub fn is_alive_hunter(&self, id: ParticipantId) -> bool {
        self.hunters.contains(&id)
    }

    /// Partition `id` currently sits in.
    pub fn partition_of(&self, id: ParticipantId) -> Option<Team> {
        if self.waiting.contains(&id) {
            Some(Team::None)
        } else if self.props.contains(&id) {
            Some(Team::Props)
        } else if self.hunters.contains(&id) {
            Some(Team::Hunters)
        } else if self.spectators.contains(&id) {
            Some(Team::Spectator)
        } else {
            None
        }
    }

    /// Add to the lobby pool. Returns `false` if already present.
    pub fn add(&mut self, participant: Participant) -> bool {
        if self.participants.contains_key(&participant.id) {
            return false;
        }
        self.waiting.push(participant.id);
        self.participants.insert(participant.id, participant);
        true
    }

    pub fn remove(&mut self, id: ParticipantId) -> Option<Participant> {
        let participant = self.participants.remove(&id)?;
        for list in [
            &mut self.waiting,
            &mut self.props,
            &mut self.hunters,
            &mut self.spectators,
        ] {
            list.retain(|p| *p != id);
        }
        Some(participant)
    }

    pub fn set_choice(&mut self, id: ParticipantId, choice: Option<Team>) -> bool {
        match self.participants.get_mut(&id) {
            Some(p) => {
                p.chosen_team = choice;
                true
            }
            None => false,
        }
    }

    /// Split the lobby pool into props and hunters and build their role
    /// payloads. Alive props and hunters from an earlier split are drawn
    /// again; spectators stay put. The pool is empty afterwards.
    pub fn assign<R: Rng + ?Sized>(&mut self, settings: &GameSettings, rng: &mut R) {
        let mut pool = std::mem::take(&mut self.waiting);
        pool.append(&mut self.props);
        pool.append(&mut self.hunters);
        let choice = |id: &ParticipantId| {
            self.participants
                .get(id)
                .and_then(|p| p.chosen_team)
                .filter(|t| t.is_playable())
        };

        let (props, hunters) = match settings.team_selection {
            TeamSelectionMode::Random => split_random(pool, settings, rng),
            TeamSelectionMode::Choice => split_by_choice(pool, choice, settings, rng),
            TeamSelectionMode::Hybrid => {
                let (mut props, mut hunters) = split_by_choice(pool, choice, settings, rng);
                rebalance(&mut props, &mut hunters, settings, rng);
                (props, hunters)
            }
        };

        for id in &props {
            if let Some(p) = self.participants.get_mut(id) {
                p.team = Team::Props;
                p.role = Role::Prop(PropState::new(settings.prop_changes));
            }
        }
        for id in &hunters {
            if let Some(p) = self.participants.get_mut(id) {
                p.team = Team::Hunters;
                p.role = Role::Hunter(HunterState::new(settings.attack_cooldown));
            }
        }
        tracing::debug!(props = props.len(), hunters = hunters.len(), "Teams assigned");
        self.props = props;
        self.hunters = hunters;
    }

    /// Move an alive prop or hunter to spectators. The role payload stays.
    pub fn eliminate(&mut self, id: ParticipantId) -> bool {
        let before = self.props.len() + self.hunters.len();
        self.props.retain(|p| *p != id);
        self.hunters.retain(|p| *p != id);
        if self.props.len() + self.hunters.len() == before {
            return false;
        }
        self.spectators.push(id);
        if let Some(p) = self.participants.get_mut(&id) {
            p.team = Team::Spectator;
        }
        true
    }

    pub fn first_blood_awarded(&self) -> bool {
        self.first_blood
    }

    /// Claim the one-shot first-blood flag. `true` only for the first call.
    pub fn award_first_blood(&mut self) -> bool {
        !std::mem::replace(&mut self.first_blood, true)
    }

    /// Side that has won, if any.
    ///
    /// Both sides empty at once cannot come from a single elimination; it is
    /// reported and treated as undecided.
    pub fn winner(&self) -> Option<Team> {
        match (self.props.is_empty(), self.hunters.is_empty()) {
            (true, true) => {
                tracing::error!(
                    spectators = self.spectators.len(),
                    "Both teams empty at win check; no winner declared"
                );
                None
            }
            (true, false) => Some(Team::Hunters),
            (false, true) => Some(Team::Props),
            (false, false) => None,
        }
    }

    pub fn clear(&mut self) {
        self.participants.clear();
        self.waiting.clear();
        self.props.clear();
        self.hunters.clear();
        self.spectators.clear();
        self.first_blood = false;
    }
}

/// Shuffle and give the first `round(n * percentage)` to props.
fn split_random<R: Rng + ?Sized>(
    mut pool: Vec<ParticipantId>,
    settings: &GameSettings,
    rng: &mut R,
) -> (Vec<ParticipantId>, Vec<ParticipantId>) {
    pool.shuffle(rng);
    let prop_count = settings.calculate_prop_count(pool.len());
    let hunters = pool.split_off(prop_count);
    (pool, hunters)
}

/// Honour explicit choices, then fill minimums with the undecided, ties
/// going to the smaller team (props on equal size).
fn split_by_choice<R: Rng + ?Sized>(
    pool: Vec<ParticipantId>,
    choice: impl Fn(&ParticipantId) -> Option<Team>,
    settings: &GameSettings,
    rng: &mut R,
) -> (Vec<ParticipantId>, Vec<ParticipantId>) {
    let mut props = Vec::new();
    let mut hunters = Vec::new();
    let mut undecided = Vec::new();
    for id in pool {
        match choice(&id) {
            Some(Team::Props) => props.push(id),
            Some(Team::Hunters) => hunters.push(id),
            _ => undecided.push(id),
        }
    }

    undecided.shuffle(rng);
    for id in undecided {
        let needs_props = props.len() < settings.min_props;
        let needs_hunters = hunters.len() < settings.min_hunters;
        let to_props = match (needs_props, needs_hunters) {
            (true, false) => true,
            (false, true) => false,
            _ => props.len() <= hunters.len(),
        };
        if to_props {
            props.push(id);
        } else {
            hunters.push(id);
        }
    }
    (props, hunters)
}

/// Move random members from the surplus side until both minimums hold or
/// the donor would drop below its own minimum.
fn rebalance<R: Rng + ?Sized>(
    props: &mut Vec<ParticipantId>,
    hunters: &mut Vec<ParticipantId>,
    settings: &GameSettings,
    rng: &mut R,
) {
    while props.len() < settings.min_props && hunters.len() > settings.min_hunters {
        let moved = hunters.swap_remove(rng.random_range(0..hunters.len()));
        props.push(moved);
    }
    while hunters.len() < settings.min_hunters && props.len() > settings.min_props {
        let moved = props.swap_remove(rng.random_range(0..props.len()));
        hunters.push(moved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use uuid::Uuid;

    fn roster_of(n: usize) -> (Roster, Vec<ParticipantId>) {
        let mut roster = Roster::new();
        let ids: Vec<_> = (0..n).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            roster.add(Participant::new(*id, format!("p{i}"), 0));
        }
        (roster, ids)
    }

    fn assert_partitioned(roster: &Roster) {
        let all = roster.ids();
        assert_eq!(all.len(), roster.len());
        for id in &all {
            let hits = [
                roster.waiting().contains(id),
                roster.props().contains(id),
                roster.hunters().contains(id),
                roster.spectators().contains(id),
            ]
            .iter()
            .filter(|b| **b)
            .count();
            assert_eq!(hits, 1, "{id} in {hits} partitions");
        }
    }

    // ================================================================
    // Assignment
    // ================================================================

    #[test]
    fn random_split_uses_percentage() {
        let (mut roster, _) = roster_of(10);
        let mut rng = StdRng::seed_from_u64(7);
        roster.assign(&GameSettings::default(), &mut rng);
        assert_eq!(roster.props().len(), 6);
        assert_eq!(roster.hunters().len(), 4);
        assert!(roster.waiting().is_empty());
        assert_partitioned(&roster);
        for id in roster.hunters() {
            let p = roster.get(*id).unwrap();
            assert_eq!(p.team, Team::Hunters);
            assert_eq!(p.hunter().unwrap().attack_cooldown_ticks, 20);
        }
        for id in roster.props() {
            assert_eq!(roster.get(*id).unwrap().prop().unwrap().changes_remaining, 3);
        }
    }

    #[test]
    fn choice_mode_honours_choices_and_fills_minimums() {
        let (mut roster, ids) = roster_of(4);
        roster.set_choice(ids[0], Some(Team::Props));
        roster.set_choice(ids[1], Some(Team::Props));
        let settings = GameSettings {
            team_selection: TeamSelectionMode::Choice,
            ..GameSettings::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        roster.assign(&settings, &mut rng);
        assert!(roster.is_alive_prop(ids[0]));
        assert!(roster.is_alive_prop(ids[1]));
        assert!(roster.is_alive_hunter(ids[2]));
        assert!(roster.is_alive_hunter(ids[3]));
        assert_eq!(roster.props().len(), 2);
        assert_eq!(roster.hunters().len(), 2);
    }

    #[test]
    fn choice_mode_can_leave_a_side_empty() {
        let (mut roster, ids) = roster_of(2);
        roster.set_choice(ids[0], Some(Team::Props));
        roster.set_choice(ids[1], Some(Team::Props));
        let settings = GameSettings {
            team_selection: TeamSelectionMode::Choice,
            ..GameSettings::default()
        };
        roster.assign(&settings, &mut StdRng::seed_from_u64(1));
        assert_eq!(roster.hunters().len(), 0);
    }

    #[test]
    fn hybrid_moves_choosers_to_meet_minimums() {
        let (mut roster, ids) = roster_of(3);
        for id in &ids {
            roster.set_choice(*id, Some(Team::Props));
        }
        let settings = GameSettings {
            team_selection: TeamSelectionMode::Hybrid,
            min_hunters: 2,
            ..GameSettings::default()
        };
        roster.assign(&settings, &mut StdRng::seed_from_u64(11));
        assert_eq!(roster.props().len(), 1);
        assert_eq!(roster.hunters().len(), 2);
        assert_partitioned(&roster);
    }

    #[test]
    fn spectator_choice_is_ignored() {
        let (mut roster, ids) = roster_of(2);
        roster.set_choice(ids[0], Some(Team::Spectator));
        let settings = GameSettings {
            team_selection: TeamSelectionMode::Choice,
            ..GameSettings::default()
        };
        roster.assign(&settings, &mut StdRng::seed_from_u64(5));
        assert_eq!(roster.props().len(), 1);
        assert_eq!(roster.hunters().len(), 1);
    }

    // ================================================================
    // Elimination and win check
    // ================================================================

    #[test]
    fn eliminated_keep_role_and_leave_alive_sets() {
        let (mut roster, _) = roster_of(4);
        roster.assign(&GameSettings::default(), &mut StdRng::seed_from_u64(2));
        let prop = roster.props()[0];
        assert!(roster.eliminate(prop));
        assert!(!roster.eliminate(prop));
        assert!(roster.spectators().contains(&prop));
        let p = roster.get(prop).unwrap();
        assert_eq!(p.team, Team::Spectator);
        assert_eq!(p.side(), Team::Props);
        assert_partitioned(&roster);
    }

    #[test]
    fn winner_is_decided_by_empty_side() {
        let (mut roster, _) = roster_of(2);
        roster.assign(&GameSettings::default(), &mut StdRng::seed_from_u64(9));
        assert_eq!(roster.winner(), None);
        let prop = roster.props()[0];
        roster.eliminate(prop);
        assert_eq!(roster.winner(), Some(Team::Hunters));
    }

    #[test]
    fn both_sides_empty_is_undecided() {
        let (mut roster, _) = roster_of(2);
        roster.assign(&GameSettings::default(), &mut StdRng::seed_from_u64(9));
        for id in roster.ids() {
            roster.eliminate(id);
        }
        assert_eq!(roster.winner(), None);
    }

    #[test]
    fn first_blood_is_one_shot() {
        let mut roster = Roster::new();
        assert!(roster.award_first_blood());
        assert!(!roster.award_first_blood());
        assert!(roster.first_blood_awarded());
        roster.clear();
        assert!(!roster.first_blood_awarded());
    }

    #[test]
    fn duplicate_add_rejected() {
        let (mut roster, ids) = roster_of(1);
        assert!(!roster.add(Participant::new(ids[0], "again", 5)));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn reassign_redraws_existing_teams() {
        let (mut roster, ids) = roster_of(1);
        let mut rng = StdRng::seed_from_u64(0);
        roster.assign(&GameSettings::default(), &mut rng);
        let late = Uuid::new_v4();
        roster.add(Participant::new(late, "late", 0));
        roster.assign(&GameSettings::default(), &mut rng);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.ids().len(), 2);
        assert!(roster.partition_of(ids[0]).is_some());
        assert!(roster.partition_of(late).is_some());
        assert!(roster.waiting().is_empty());
        assert_partitioned(&roster);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Join,
        Assign(u64),
        Eliminate(usize),
        Leave(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Join),
            1 => any::<u64>().prop_map(Op::Assign),
            2 => (0usize..16).prop_map(Op::Eliminate),
            1 => (0usize..16).prop_map(Op::Leave),
        ]
    }

    proptest! {
        #[test]
        fn every_id_in_exactly_one_partition(ops in prop::collection::vec(op(), 1..40)) {
            let mut roster = Roster::new();
            let mut known = Vec::new();
            for op in ops {
                match op {
                    Op::Join => {
                        let id = Uuid::new_v4();
                        known.push(id);
                        roster.add(Participant::new(id, "p", 0));
                    }
                    Op::Assign(seed) => {
                        roster.assign(&GameSettings::default(), &mut StdRng::seed_from_u64(seed));
                    }
                    Op::Eliminate(i) => {
                        if let Some(id) = known.get(i) {
                            roster.eliminate(*id);
                        }
                    }
                    Op::Leave(i) => {
                        if let Some(id) = known.get(i) {
                            roster.remove(*id);
                        }
                    }
                }
                assert_partitioned(&roster);
            }
        }
    }
}
