//! Constraint evaluation.
//!
//! Penalties are summed (lower is better). Hard constraints: room clashes
//! (the gym is exempt), group clashes, days and hours outside the study
//! year's window, and room capacity. Soft constraints: a practice or lab
//! before the first lecture of the same course, idle hours inside a
//! group's day, and a course's sessions split into non-adjacent hours.

use super::chromosome::Placement;
use super::problem::Problem;
use crate::config::WeightsConfig;
use crate::model::{Day, SessionKind};
use serde::Serialize;
use std::collections::HashMap;

/// Share of the reported fitness score owed to hard constraints
const HARD_SHARE: f64 = 0.8;

/// Result of evaluating one chromosome
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub penalty: f64,
    pub hard_penalty: f64,
    pub soft_penalty: f64,
    pub room_clashes: usize,
    pub group_clashes: usize,
    pub day_violations: usize,
    pub hour_violations: usize,
    pub capacity_violations: usize,
    pub precedence_violations: usize,
    pub idle_gaps: usize,
    /// Breaks between consecutive sessions of one course and group
    pub non_consecutive: usize,
    pub sessions: usize,
    /// Sessions involved in no hard violation
    pub clean_sessions: usize,
}

impl Evaluation {
    /// Room plus group double bookings
    pub fn conflicts(&self) -> usize {
        self.room_clashes + self.group_clashes
    }

    /// Percentage of sessions free of hard violations
    pub fn hard_score(&self) -> f64 {
        if self.sessions == 0 {
            return 100.0;
        }
        round2(self.clean_sessions as f64 / self.sessions as f64 * 100.0)
    }

    /// Percentage left after soft violations, floored at zero
    pub fn soft_score(&self) -> f64 {
        if self.sessions == 0 {
            return 100.0;
        }
        let units = (self.precedence_violations + self.idle_gaps + self.non_consecutive) as f64;
        round2((1.0 - units / self.sessions as f64).max(0.0) * 100.0)
    }

    /// Headline 0..=100 score shown to users
    pub fn fitness_score(&self) -> f64 {
        round2(HARD_SHARE * self.hard_score() + (1.0 - HARD_SHARE) * self.soft_score())
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn slot_order(day: Day, hour: u8) -> u32 {
    day as u32 * 24 + hour as u32
}

/// Score a full set of placements against the problem
pub fn evaluate(problem: &Problem, genes: &[Placement], weights: &WeightsConfig) -> Evaluation {
    let mut eval = Evaluation {
        sessions: genes.len(),
        ..Evaluation::default()
    };
    let mut dirty = vec![false; genes.len()];

    let mut by_room: HashMap<(usize, Day, u8), Vec<usize>> = HashMap::new();
    let mut by_group: HashMap<(usize, Day, u8), Vec<usize>> = HashMap::new();

    for (i, gene) in genes.iter().enumerate() {
        let candidates = &problem.candidates[i];
        let room = &problem.rooms[gene.room];

        if !room.is_gym {
            by_room.entry((gene.room, gene.day, gene.hour)).or_default().push(i);
        }
        by_group
            .entry((problem.group_ids[i], gene.day, gene.hour))
            .or_default()
            .push(i);

        if !candidates.days.contains(&gene.day) {
            eval.day_violations += 1;
            eval.hard_penalty += weights.wrong_day;
            dirty[i] = true;
        }
        if !candidates.hours.contains(&gene.hour) {
            eval.hour_violations += 1;
            eval.hard_penalty += weights.wrong_hour;
            dirty[i] = true;
        }

        let size = problem.sessions[i].headcount;
        if let Some(capacity) = room.capacity {
            if size > capacity {
                eval.capacity_violations += 1;
                eval.hard_penalty += weights.capacity * ((size - capacity) / 5 + 1) as f64;
                dirty[i] = true;
            }
        }
    }

    for occupants in by_room.values().filter(|o| o.len() > 1) {
        eval.room_clashes += occupants.len() - 1;
        eval.hard_penalty += weights.room_clash * (occupants.len() - 1) as f64;
        for i in occupants {
            dirty[*i] = true;
        }
    }

    for occupants in by_group.values().filter(|o| o.len() > 1) {
        eval.group_clashes += occupants.len() - 1;
        eval.hard_penalty += weights.group_clash * (occupants.len() - 1) as f64;
        for i in occupants {
            dirty[*i] = true;
        }
    }

    eval.precedence_violations = precedence_violations(problem, genes);
    eval.idle_gaps = idle_gaps(problem, genes);
    eval.non_consecutive = non_consecutive(problem, genes);
    eval.soft_penalty = weights.precedence * eval.precedence_violations as f64
        + weights.idle_gap * eval.idle_gaps as f64
        + weights.non_consecutive * eval.non_consecutive as f64;

    eval.clean_sessions = dirty.iter().filter(|d| !**d).count();
    eval.penalty = eval.hard_penalty + eval.soft_penalty;
    eval
}

/// Practice or lab placed before the earliest lecture of its course
fn precedence_violations(problem: &Problem, genes: &[Placement]) -> usize {
    let mut first_lecture: Vec<Option<u32>> = vec![None; problem.course_count];
    for (i, gene) in genes.iter().enumerate() {
        if problem.sessions[i].kind == SessionKind::Lecture {
            let order = slot_order(gene.day, gene.hour);
            let slot = &mut first_lecture[problem.course_ids[i]];
            *slot = Some(slot.map_or(order, |o| o.min(order)));
        }
    }

    genes
        .iter()
        .enumerate()
        .filter(|(i, _)| problem.sessions[*i].kind != SessionKind::Lecture)
        .filter(|(i, gene)| {
            first_lecture[problem.course_ids[*i]]
                .map_or(false, |lecture| slot_order(gene.day, gene.hour) < lecture)
        })
        .count()
}

/// Empty hours between a group's first and last session of each day
fn idle_gaps(problem: &Problem, genes: &[Placement]) -> usize {
    let mut days: HashMap<(usize, Day), Vec<u8>> = HashMap::new();
    for (i, gene) in genes.iter().enumerate() {
        days.entry((problem.group_ids[i], gene.day)).or_default().push(gene.hour);
    }

    days.values_mut()
        .map(|hours| {
            hours.sort_unstable();
            hours.dedup();
            let span = (hours[hours.len() - 1] - hours[0]) as usize + 1;
            span - hours.len()
        })
        .sum()
}

/// Gaps between a course's sessions once sorted by time.
///
/// Two sessions are adjacent only on the same day in back-to-back hours.
fn non_consecutive(problem: &Problem, genes: &[Placement]) -> usize {
    let mut courses: HashMap<usize, Vec<u32>> = HashMap::new();
    for (i, gene) in genes.iter().enumerate() {
        courses
            .entry(problem.course_ids[i])
            .or_default()
            .push(slot_order(gene.day, gene.hour));
    }

    courses
        .values_mut()
        .map(|slots| {
            slots.sort_unstable();
            slots.windows(2).filter(|pair| pair[1] - pair[0] != 1).count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Calendar;
    use crate::solver::problem::fixtures::{rooms, session};

    fn problem() -> Problem {
        Problem::new(
            1,
            vec![
                session("IT-2301", "Programming", SessionKind::Lecture, 2),
                session("IT-2301", "Programming", SessionKind::Practice, 2),
                session("IT-2302", "Maths", SessionKind::Lecture, 2),
                session("IT-2302", "Physical Education", SessionKind::Practice, 2),
                session("IT-2301", "Physical Education", SessionKind::Practice, 2),
            ],
            &rooms(&[("101", Some(30)), ("102", Some(18)), ("Gym", None)]),
            &Calendar::default(),
        )
        .unwrap()
    }

    fn at(day: Day, hour: u8, room: usize) -> Placement {
        Placement { day, hour, room }
    }

    #[test]
    fn test_clean_schedule() {
        let problem = problem();
        let genes = vec![
            at(Day::Mon, 8, 0),
            at(Day::Mon, 9, 0),
            at(Day::Mon, 8, 1),
            at(Day::Tue, 10, 2),
            at(Day::Tue, 10, 2),
        ];

        let eval = evaluate(&problem, &genes, &WeightsConfig::default());
        // Maths in room 102 (capacity 18) with 20 students
        assert_eq!(eval.capacity_violations, 1);
        assert_eq!(eval.hard_penalty, 500.0);
        // Two groups share the gym without a clash
        assert_eq!(eval.conflicts(), 0);
        assert_eq!(eval.clean_sessions, 4);
        assert_eq!(eval.hard_score(), 80.0);
        assert_eq!(eval.soft_score(), 100.0);
        assert_eq!(eval.fitness_score(), 84.0);
    }

    #[test]
    fn test_clashes_and_soft_penalties() {
        let problem = problem();
        let genes = vec![
            at(Day::Mon, 12, 0),
            // practice before its lecture, plus a three hour gap
            at(Day::Mon, 8, 0),
            // same room and hour as the lecture
            at(Day::Mon, 12, 0),
            at(Day::Wed, 9, 2),
            // group clash with the lecture
            at(Day::Mon, 12, 2),
        ];

        let eval = evaluate(&problem, &genes, &WeightsConfig::default());
        assert_eq!(eval.room_clashes, 1);
        assert_eq!(eval.group_clashes, 1);
        assert_eq!(eval.precedence_violations, 1);
        assert_eq!(eval.idle_gaps, 3);
        // Programming at 08:00 and 12:00
        assert_eq!(eval.non_consecutive, 1);
        assert_eq!(eval.hard_penalty, 2000.0);
        assert_eq!(eval.soft_penalty, 10.0 + 24.0 + 5.0);
        assert_eq!(eval.penalty, 2039.0);
        assert_eq!(eval.clean_sessions, 2);
    }

    #[test]
    fn test_window_violations() {
        let problem = problem();
        let genes = vec![
            at(Day::Sat, 8, 0),
            at(Day::Mon, 20, 0),
            at(Day::Tue, 8, 0),
            at(Day::Tue, 9, 2),
            at(Day::Wed, 9, 2),
        ];

        let eval = evaluate(&problem, &genes, &WeightsConfig::default());
        assert_eq!(eval.non_consecutive, 1);
        assert_eq!(eval.day_violations, 1);
        assert_eq!(eval.hour_violations, 1);
        assert_eq!(eval.hard_penalty, 200.0);
    }

    #[test]
    fn test_non_consecutive_blocks() {
        let problem = problem();
        let weights = WeightsConfig::default();
        let base = vec![
            at(Day::Mon, 8, 0),
            at(Day::Mon, 9, 0),
            at(Day::Tue, 8, 0),
            at(Day::Wed, 9, 2),
            at(Day::Thu, 9, 2),
        ];
        assert_eq!(evaluate(&problem, &base, &weights).non_consecutive, 0);

        // Back-to-back hours on different days are not adjacent
        let mut split = base.clone();
        split[1] = at(Day::Tue, 9, 0);
        let eval = evaluate(&problem, &split, &weights);
        assert_eq!(eval.non_consecutive, 1);
        assert_eq!(eval.soft_penalty, 5.0);
        assert_eq!(eval.soft_score(), 80.0);
    }
}
