//! Generational genetic algorithm with elitism, tournament selection and
//! early stopping.

use super::chromosome::Chromosome;
use super::error::{SolverError, SolverResult};
use super::fitness::{evaluate, Evaluation};
use super::problem::Problem;
use crate::config::SolverConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Per-generation progress snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub best_penalty: f64,
    pub mean_penalty: f64,
    pub best_score: f64,
    pub conflicts: usize,
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub best: Chromosome,
    pub evaluation: Evaluation,
    /// Best penalty after each generation
    pub history: Vec<f64>,
    pub generations: usize,
    pub stopped_early: bool,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
struct Individual {
    chromosome: Chromosome,
    evaluation: Evaluation,
}

impl Individual {
    fn penalty(&self) -> f64 {
        self.evaluation.penalty
    }
}

pub struct GeneticSolver<'a> {
    problem: &'a Problem,
    config: SolverConfig,
}

impl<'a> GeneticSolver<'a> {
    pub fn new(problem: &'a Problem, config: SolverConfig) -> SolverResult<Self> {
        if config.population_size < 2 {
            return Err(SolverError::InvalidConfig(
                "population_size must be at least 2".to_string(),
            ));
        }
        if config.tournament_size == 0 {
            return Err(SolverError::InvalidConfig(
                "tournament_size must be at least 1".to_string(),
            ));
        }
        for (name, rate) in [
            ("crossover_rate", config.crossover_rate),
            ("mutation_rate", config.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SolverError::InvalidConfig(format!(
                    "{} must be within 0..=1, got {}",
                    name, rate
                )));
            }
        }

        Ok(Self { problem, config })
    }

    pub fn run(&self) -> SolveOutcome {
        self.run_with_progress(|_| {})
    }

    /// Evolve the population; `progress` sees every completed generation
    pub fn run_with_progress<F>(&self, mut progress: F) -> SolveOutcome
    where
        F: FnMut(&GenerationReport),
    {
        let started = Instant::now();
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut population: Vec<Individual> = (0..self.config.population_size)
            .map(|_| self.individual(Chromosome::greedy(self.problem, &mut rng)))
            .collect();
        sort_by_penalty(&mut population);

        let mut best = population[0].clone();
        let mut history = Vec::with_capacity(self.config.generations);
        let mut stagnant = 0;
        let mut stopped_early = false;

        tracing::info!(
            sessions = self.problem.len(),
            population = self.config.population_size,
            generations = self.config.generations,
            seed = self.config.seed,
            initial_penalty = best.penalty(),
            "Starting genetic search"
        );

        for generation in 1..=self.config.generations {
            if best.penalty() <= 0.0 {
                stopped_early = true;
                break;
            }

            population = self.next_generation(&population, &mut rng);
            sort_by_penalty(&mut population);

            if population[0].penalty() < best.penalty() {
                best = population[0].clone();
                stagnant = 0;
            } else {
                stagnant += 1;
            }
            history.push(best.penalty());

            let report = GenerationReport {
                generation,
                best_penalty: best.penalty(),
                mean_penalty: population.iter().map(Individual::penalty).sum::<f64>()
                    / population.len() as f64,
                best_score: best.evaluation.fitness_score(),
                conflicts: best.evaluation.conflicts(),
            };
            tracing::debug!(
                generation,
                best = report.best_penalty,
                mean = report.mean_penalty,
                "Generation complete"
            );
            progress(&report);

            if self.config.early_stop_generations > 0 && stagnant >= self.config.early_stop_generations {
                tracing::info!(generation, stagnant, "Early stopping: no improvement");
                stopped_early = true;
                break;
            }
        }

        let elapsed = started.elapsed();
        tracing::info!(
            generations = history.len(),
            best_penalty = best.penalty(),
            conflicts = best.evaluation.conflicts(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Genetic search finished"
        );

        SolveOutcome {
            generations: history.len(),
            best: best.chromosome,
            evaluation: best.evaluation,
            history,
            stopped_early,
            elapsed,
        }
    }

    fn individual(&self, chromosome: Chromosome) -> Individual {
        let evaluation = evaluate(self.problem, &chromosome.genes, &self.config.weights);
        Individual {
            chromosome,
            evaluation,
        }
    }

    fn next_generation(&self, population: &[Individual], rng: &mut StdRng) -> Vec<Individual> {
        let size = self.config.population_size;
        let elites = self.config.elitism.min(size);
        let mut next: Vec<Individual> = population.iter().take(elites).cloned().collect();

        while next.len() < size {
            let first = self.tournament(population, rng);
            let second = self.tournament(population, rng);

            let mut child = if rng.gen::<f64>() < self.config.crossover_rate {
                first.chromosome.crossover(&second.chromosome, rng)
            } else {
                first.chromosome.clone()
            };
            if rng.gen::<f64>() < self.config.mutation_rate {
                child.mutate(self.problem, rng);
            }

            next.push(self.individual(child));
        }

        next
    }

    /// Best of `tournament_size` random picks
    fn tournament<'p>(&self, population: &'p [Individual], rng: &mut StdRng) -> &'p Individual {
        let mut winner = &population[rng.gen_range(0..population.len())];
        for _ in 1..self.config.tournament_size {
            let challenger = &population[rng.gen_range(0..population.len())];
            if challenger.penalty() < winner.penalty() {
                winner = challenger;
            }
        }
        winner
    }
}

fn sort_by_penalty(population: &mut [Individual]) {
    population.sort_by(|a, b| a.penalty().total_cmp(&b.penalty()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Calendar, SessionKind};
    use crate::solver::problem::fixtures::{rooms, session};

    fn crowded_problem() -> Problem {
        let mut sessions = Vec::new();
        for group in ["IT-2401", "IT-2402", "CS-2401"] {
            for course in ["Programming", "Maths", "Physics", "English"] {
                sessions.push(session(group, course, SessionKind::Lecture, 1));
                sessions.push(session(group, course, SessionKind::Practice, 1));
            }
            sessions.push(session(group, "Physical Education", SessionKind::Practice, 1));
        }
        // 27 first-year sessions, 6 days x 6 hours, one teaching room
        Problem::new(1, sessions, &rooms(&[("101", Some(30))]), &Calendar::default()).unwrap()
    }

    fn config(generations: usize) -> SolverConfig {
        SolverConfig {
            population_size: 20,
            generations,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let problem = crowded_problem();
        let a = GeneticSolver::new(&problem, config(15)).unwrap().run();
        let b = GeneticSolver::new(&problem, config(15)).unwrap().run();

        assert_eq!(a.best, b.best);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_history_never_worsens() {
        let problem = crowded_problem();
        let mut reports = Vec::new();
        let outcome = GeneticSolver::new(&problem, config(30))
            .unwrap()
            .run_with_progress(|r| reports.push(r.clone()));

        assert_eq!(reports.len(), outcome.history.len());
        assert!(outcome.history.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(outcome.best.genes.len(), problem.len());
        assert_eq!(outcome.evaluation.penalty, *outcome.history.last().unwrap_or(&outcome.evaluation.penalty));
    }

    #[test]
    fn test_finds_conflict_free_schedule() {
        let problem = crowded_problem();
        let outcome = GeneticSolver::new(&problem, config(60)).unwrap().run();

        assert_eq!(outcome.evaluation.conflicts(), 0);
        assert_eq!(outcome.evaluation.hard_score(), 100.0);
    }

    #[test]
    fn test_early_stop_after_stagnation() {
        let problem = crowded_problem();
        let cfg = SolverConfig {
            early_stop_generations: 3,
            mutation_rate: 0.0,
            crossover_rate: 0.0,
            ..config(50)
        };
        let outcome = GeneticSolver::new(&problem, cfg).unwrap().run();

        assert!(outcome.stopped_early);
        assert!(outcome.generations < 50);
    }

    #[test]
    fn test_rejects_bad_config() {
        let problem = crowded_problem();
        let cfg = SolverConfig {
            mutation_rate: 1.5,
            ..SolverConfig::default()
        };
        assert!(matches!(
            GeneticSolver::new(&problem, cfg),
            Err(SolverError::InvalidConfig(_))
        ));
    }
}
