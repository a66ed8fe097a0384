//! Chromosome encoding and the genetic operators.

use super::problem::Problem;
use crate::model::Day;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Placement of one session: the gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub day: Day,
    pub hour: u8,
    /// Index into `Problem::rooms`
    pub room: usize,
}

/// One placement per session, in session order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chromosome {
    pub genes: Vec<Placement>,
}

impl Chromosome {
    /// Uniformly random placement within each session's candidates
    pub fn random<R: Rng>(problem: &Problem, rng: &mut R) -> Self {
        let genes = problem
            .candidates
            .iter()
            .map(|c| random_placement(c.days.as_slice(), &c.hours, &c.rooms, rng))
            .collect();
        Self { genes }
    }

    /// Greedy construction: sessions in random order take the first free
    /// (day, hour, room) among their shuffled candidates. Sessions that find
    /// no conflict-free spot fall back to a random placement.
    pub fn greedy<R: Rng>(problem: &Problem, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..problem.len()).collect();
        order.shuffle(rng);

        let mut genes: Vec<Option<Placement>> = vec![None; problem.len()];
        let mut group_busy: HashSet<(usize, Day, u8)> = HashSet::new();
        let mut room_busy: HashSet<(usize, Day, u8)> = HashSet::new();

        for session in order {
            let candidates = &problem.candidates[session];
            let group = problem.group_ids[session];

            let mut slots: Vec<(Day, u8)> = candidates
                .days
                .iter()
                .flat_map(|d| candidates.hours.iter().map(move |h| (*d, *h)))
                .collect();
            slots.shuffle(rng);
            let mut rooms = candidates.rooms.clone();
            rooms.shuffle(rng);

            let found = slots
                .iter()
                .filter(|(day, hour)| !group_busy.contains(&(group, *day, *hour)))
                .find_map(|(day, hour)| {
                    rooms
                        .iter()
                        .find(|r| problem.rooms[**r].is_gym || !room_busy.contains(&(**r, *day, *hour)))
                        .map(|r| Placement {
                            day: *day,
                            hour: *hour,
                            room: *r,
                        })
                });

            let placement = found.unwrap_or_else(|| {
                random_placement(&candidates.days, &candidates.hours, &candidates.rooms, rng)
            });

            group_busy.insert((group, placement.day, placement.hour));
            if !problem.rooms[placement.room].is_gym {
                room_busy.insert((placement.room, placement.day, placement.hour));
            }
            genes[session] = Some(placement);
        }

        Self {
            genes: genes.into_iter().flatten().collect(),
        }
    }

    /// One-point crossover: prefix of `self`, suffix of `other`
    pub fn crossover<R: Rng>(&self, other: &Chromosome, rng: &mut R) -> Chromosome {
        let len = self.genes.len().min(other.genes.len());
        if len < 2 {
            return self.clone();
        }

        let point = rng.gen_range(1..len);
        let mut genes = Vec::with_capacity(len);
        genes.extend_from_slice(&self.genes[..point]);
        genes.extend_from_slice(&other.genes[point..len]);
        Chromosome { genes }
    }

    /// Move one random gene: its day, its hour or its room
    pub fn mutate<R: Rng>(&mut self, problem: &Problem, rng: &mut R) {
        if self.genes.is_empty() {
            return;
        }

        let index = rng.gen_range(0..self.genes.len());
        let candidates = &problem.candidates[index];
        let gene = &mut self.genes[index];

        match rng.gen_range(0..3) {
            0 => {
                if let Some(day) = candidates.days.choose(rng) {
                    gene.day = *day;
                }
            }
            1 => {
                if let Some(hour) = candidates.hours.choose(rng) {
                    gene.hour = *hour;
                }
            }
            _ => {
                if let Some(room) = candidates.rooms.choose(rng) {
                    gene.room = *room;
                }
            }
        }
    }
}

fn random_placement<R: Rng>(days: &[Day], hours: &[u8], rooms: &[usize], rng: &mut R) -> Placement {
    Placement {
        day: days.choose(rng).copied().unwrap_or(Day::Mon),
        hour: hours.choose(rng).copied().unwrap_or(8),
        room: rooms.choose(rng).copied().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Calendar, SessionKind};
    use crate::solver::problem::fixtures::{rooms, session};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn problem() -> Problem {
        let sessions = vec![
            session("IT-2401", "Programming", SessionKind::Lecture, 1),
            session("IT-2401", "Programming", SessionKind::Practice, 1),
            session("IT-2401", "Maths", SessionKind::Lecture, 1),
            session("IT-2301", "Databases", SessionKind::Lecture, 2),
            session("IT-2301", "Physical Education", SessionKind::Practice, 2),
        ];
        Problem::new(1, sessions, &rooms(&[("101", Some(30)), ("102", Some(30))]), &Calendar::default())
            .unwrap()
    }

    fn within_candidates(problem: &Problem, chromosome: &Chromosome) -> bool {
        chromosome.genes.iter().zip(&problem.candidates).all(|(g, c)| {
            c.days.contains(&g.day) && c.hours.contains(&g.hour) && c.rooms.contains(&g.room)
        })
    }

    #[test]
    fn test_greedy_avoids_overlaps() {
        let problem = problem();
        let mut rng = StdRng::seed_from_u64(7);
        let chromosome = Chromosome::greedy(&problem, &mut rng);

        assert_eq!(chromosome.genes.len(), problem.len());
        assert!(within_candidates(&problem, &chromosome));

        let mut group_slots = HashSet::new();
        for (gene, group) in chromosome.genes.iter().zip(&problem.group_ids) {
            assert!(group_slots.insert((*group, gene.day, gene.hour)));
        }
    }

    #[test]
    fn test_operators_stay_within_candidates() {
        let problem = problem();
        let mut rng = StdRng::seed_from_u64(11);
        let a = Chromosome::random(&problem, &mut rng);
        let b = Chromosome::random(&problem, &mut rng);

        let mut child = a.crossover(&b, &mut rng);
        assert_eq!(child.genes.len(), problem.len());
        for _ in 0..50 {
            child.mutate(&problem, &mut rng);
        }
        assert!(within_candidates(&problem, &child));
    }

    #[test]
    fn test_crossover_splices_parents() {
        let problem = problem();
        let mut rng = StdRng::seed_from_u64(3);
        let a = Chromosome::random(&problem, &mut rng);
        let b = Chromosome::random(&problem, &mut rng);

        let child = a.crossover(&b, &mut rng);
        let point = (1..child.genes.len())
            .find(|i| child.genes[*i..] == b.genes[*i..] && child.genes[..*i] == a.genes[..*i]);
        assert!(point.is_some());
    }
}
