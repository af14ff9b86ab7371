use crate::difficulty::DifficultyConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Number of answer buttons shown per question
pub const CHOICE_COUNT: usize = 4;
/// Distractors are drawn from answer ± this spread (never ± 0)
pub const DISTRACTOR_SPREAD: i64 = 5;
/// Random draws before falling back to probing outward from the answer
pub const MAX_DISTRACTOR_ATTEMPTS: usize = 64;

/// A multiplication problem with its shuffled answer choices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub a: u32,
    pub b: u32,
    pub answer: u32,
    pub choices: [u32; CHOICE_COUNT],
}

impl Question {
    pub fn is_correct(&self, value: u32) -> bool {
        value == self.answer
    }

    pub fn prompt(&self) -> String {
        format!("{} × {}", self.a, self.b)
    }
}

/// Generate one question for `config`.
///
/// The config must already be normalized; the session controller takes care of that.
pub fn generate_question<R: Rng + ?Sized>(config: &DifficultyConfig, rng: &mut R) -> Question {
    let (a, b) = config.sample_factors(rng);
    let answer = a * b;

    let mut options = distractors(answer, rng);
    let mut choices = [0; CHOICE_COUNT];
    options.shuffle(rng);
    choices.copy_from_slice(&options[..CHOICE_COUNT]);

    Question {
        a,
        b,
        answer,
        choices,
    }
}

/// Correct answer plus three distinct positive distractors, unordered
fn distractors<R: Rng + ?Sized>(answer: u32, rng: &mut R) -> Vec<u32> {
    let mut options = BTreeSet::from([answer]);

    for _ in 0..MAX_DISTRACTOR_ATTEMPTS {
        if options.len() == CHOICE_COUNT {
            break;
        }
        options.insert(perturb(answer, draw_offset(rng)));
    }

    if options.len() < CHOICE_COUNT {
        log::debug!("distractor draws exhausted for {answer}, probing outward");
        for step in 1.. {
            for delta in [step, -step] {
                if options.len() == CHOICE_COUNT {
                    break;
                }
                let candidate = answer as i64 + delta;
                if candidate >= 1 {
                    options.insert(candidate as u32);
                }
            }
            if options.len() == CHOICE_COUNT {
                break;
            }
        }
    }

    options.into_iter().collect()
}

/// Uniform over `±1..=±DISTRACTOR_SPREAD`
fn draw_offset<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    let magnitude = rng.gen_range(1..=DISTRACTOR_SPREAD);
    if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

fn perturb(answer: u32, delta: i64) -> u32 {
    (answer as i64 + delta).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::{DifficultyLevel, RangeScope};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_well_formed(q: &Question) {
        assert_eq!(q.answer, q.a * q.b);
        assert!(q.choices.contains(&q.answer), "answer missing from {:?}", q.choices);
        assert!(q.choices.iter().all(|c| *c >= 1));
        let distinct: BTreeSet<_> = q.choices.iter().collect();
        assert_eq!(distinct.len(), CHOICE_COUNT, "duplicate choices {:?}", q.choices);
    }

    #[test]
    fn every_config_shape_yields_well_formed_questions() {
        let mut rng = StdRng::seed_from_u64(42);
        let configs = [
            DifficultyConfig::fixed(1),
            DifficultyConfig::fixed(5),
            DifficultyConfig::fixed(10),
            DifficultyConfig::tables([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
            DifficultyConfig::tables([1]),
            DifficultyLevel::Easy.config(),
            DifficultyLevel::Hard.config(),
            DifficultyConfig::range(1, 1, RangeScope::BothFactors),
            DifficultyConfig::range(3, 8, RangeScope::OneFactor),
        ];
        for cfg in configs {
            for _ in 0..250 {
                assert_well_formed(&generate_question(&cfg, &mut rng));
            }
        }
    }

    #[test]
    fn distractors_stay_close_to_the_answer() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let q = generate_question(&DifficultyConfig::fixed(7), &mut rng);
            for c in q.choices {
                assert!((c as i64 - q.answer as i64).abs() <= DISTRACTOR_SPREAD);
            }
        }
    }

    #[test]
    fn offsets_are_uniform_and_never_zero() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut counts = std::collections::BTreeMap::new();
        for _ in 0..10_000 {
            *counts.entry(draw_offset(&mut rng)).or_insert(0u32) += 1;
        }
        assert!(!counts.contains_key(&0));
        assert_eq!(counts.len(), 2 * DISTRACTOR_SPREAD as usize);
        for (offset, n) in counts {
            assert!((800..=1200).contains(&n), "offset {offset} drawn {n} times");
        }
    }

    #[test]
    fn one_times_one_still_finds_three_distractors() {
        // answer 1: every negative delta collapses onto 1
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = DifficultyConfig::range(1, 1, RangeScope::BothFactors);
        let q = generate_question(&cfg, &mut rng);
        assert_eq!(q.answer, 1);
        assert_well_formed(&q);
    }

    #[test]
    fn degenerate_rng_falls_back_to_probing() {
        // A constant rng keeps drawing the same delta, so the random phase
        // can never fill the set on its own.
        let mut rng = StepRng::new(0, 0);
        let options = distractors(12, &mut rng);
        assert_eq!(options.len(), CHOICE_COUNT);
        assert!(options.contains(&12));
        for o in &options {
            assert!((*o as i64 - 12).abs() <= DISTRACTOR_SPREAD, "unexpected value {o}");
        }
    }

    #[test]
    fn probing_skips_non_positive_values() {
        let mut rng = StepRng::new(0, 0);
        let options = distractors(1, &mut rng);
        assert_eq!(options.len(), CHOICE_COUNT);
        assert!(options.iter().all(|o| *o >= 1));
    }

    #[test]
    fn choice_order_varies() {
        let mut rng = StdRng::seed_from_u64(9);
        let cfg = DifficultyConfig::fixed(6);
        let positions: BTreeSet<usize> = (0..100)
            .map(|_| generate_question(&cfg, &mut rng))
            .filter_map(|q| q.choices.iter().position(|c| *c == q.answer))
            .collect();
        assert!(positions.len() > 1, "answer always in the same slot");
    }

    #[test]
    fn prompt_and_correctness() {
        let q = Question {
            a: 5,
            b: 5,
            answer: 25,
            choices: [24, 25, 27, 30],
        };
        assert_eq!(q.prompt(), "5 × 5");
        assert!(q.is_correct(25));
        assert!(!q.is_correct(24));
    }
}
