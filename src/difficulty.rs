use clap::ValueEnum;
use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Smallest table a user can pick
pub const MIN_TABLE: u32 = 1;
/// Largest table a user can pick
pub const MAX_TABLE: u32 = 10;
/// Table used when a table set ends up empty
pub const DEFAULT_TABLE: u32 = 1;

/// Named range presets offered by the host
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    /// Inclusive factor bounds for the preset
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            DifficultyLevel::Easy => (1, 3),
            DifficultyLevel::Medium => (3, 5),
            DifficultyLevel::Hard => (5, 7),
        }
    }

    pub fn config(&self) -> DifficultyConfig {
        let (min, max) = self.bounds();
        DifficultyConfig::Range {
            min,
            max,
            scope: RangeScope::BothFactors,
        }
    }
}

/// Which factors a range config draws from its bounds
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeScope {
    #[default]
    BothFactors,
    /// First factor from the range, second from 1..=10
    OneFactor,
}

/// Rule set determining which factors may appear in a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DifficultyConfig {
    FixedTable {
        table: u32,
    },
    TableSet {
        tables: BTreeSet<u32>,
    },
    Range {
        min: u32,
        max: u32,
        #[serde(default)]
        scope: RangeScope,
    },
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        DifficultyConfig::FixedTable { table: 5 }
    }
}

impl DifficultyConfig {
    pub fn fixed(table: u32) -> Self {
        DifficultyConfig::FixedTable { table }
    }

    pub fn tables<I: IntoIterator<Item = u32>>(tables: I) -> Self {
        DifficultyConfig::TableSet {
            tables: tables.into_iter().collect(),
        }
    }

    pub fn range(min: u32, max: u32, scope: RangeScope) -> Self {
        DifficultyConfig::Range { min, max, scope }
    }

    /// Coerce the config into one with a non-empty sampling domain.
    ///
    /// Out-of-range tables are clamped (fixed) or dropped (set); an empty set
    /// falls back to `{DEFAULT_TABLE}`. Range bounds are swapped when reversed
    /// and clamped into `MIN_TABLE..=MAX_TABLE`.
    pub fn normalized(self) -> Self {
        match self {
            DifficultyConfig::FixedTable { table } => DifficultyConfig::FixedTable {
                table: table.clamp(MIN_TABLE, MAX_TABLE),
            },
            DifficultyConfig::TableSet { tables } => {
                let mut kept: BTreeSet<u32> = tables
                    .into_iter()
                    .filter(|t| (MIN_TABLE..=MAX_TABLE).contains(t))
                    .collect();
                if kept.is_empty() {
                    log::warn!("empty table selection, falling back to ×{DEFAULT_TABLE}");
                    kept.insert(DEFAULT_TABLE);
                }
                DifficultyConfig::TableSet { tables: kept }
            }
            DifficultyConfig::Range { min, max, scope } => {
                let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
                let (min, max) = (lo.clamp(MIN_TABLE, MAX_TABLE), hi.clamp(MIN_TABLE, MAX_TABLE));
                if (min, max) != (lo, hi) {
                    log::warn!("range {lo}-{hi} clamped to {min}-{max}");
                }
                DifficultyConfig::Range { min, max, scope }
            }
        }
    }

    /// Draw the two factors of a question. Expects a normalized config.
    pub fn sample_factors<R: Rng + ?Sized>(&self, rng: &mut R) -> (u32, u32) {
        match self {
            DifficultyConfig::FixedTable { table } => (*table, rng.gen_range(1..=MAX_TABLE)),
            DifficultyConfig::TableSet { tables } => {
                let table = tables
                    .iter()
                    .nth(rng.gen_range(0..tables.len().max(1)))
                    .copied()
                    .unwrap_or(DEFAULT_TABLE);
                (table, rng.gen_range(1..=MAX_TABLE))
            }
            DifficultyConfig::Range { min, max, scope } => {
                let a = rng.gen_range(*min..=*max);
                let b = match scope {
                    RangeScope::BothFactors => rng.gen_range(*min..=*max),
                    RangeScope::OneFactor => rng.gen_range(1..=MAX_TABLE),
                };
                (a, b)
            }
        }
    }

    /// The preset this config corresponds to, if any
    pub fn level(&self) -> Option<DifficultyLevel> {
        match self {
            DifficultyConfig::Range {
                min,
                max,
                scope: RangeScope::BothFactors,
            } => [
                DifficultyLevel::Easy,
                DifficultyLevel::Medium,
                DifficultyLevel::Hard,
            ]
            .into_iter()
            .find(|level| level.bounds() == (*min, *max)),
            _ => None,
        }
    }

    /// Move a fixed table up or down, wrapping within 1..=10.
    /// Any other variant switches to the fixed default table first.
    pub fn shift_table(&self, delta: i32) -> Self {
        let current = match self {
            DifficultyConfig::FixedTable { table } => *table as i32,
            _ => return DifficultyConfig::default(),
        };
        let span = (MAX_TABLE - MIN_TABLE + 1) as i32;
        let next = (current - MIN_TABLE as i32 + delta).rem_euclid(span) + MIN_TABLE as i32;
        DifficultyConfig::FixedTable { table: next as u32 }
    }
}

impl fmt::Display for DifficultyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyConfig::FixedTable { table } => write!(f, "×{table}"),
            DifficultyConfig::TableSet { tables } => {
                write!(f, "×{}", tables.iter().join(","))
            }
            DifficultyConfig::Range { min, max, scope } => {
                let bounds = format!("{min}-{max}");
                match (self.level(), scope) {
                    (Some(level), _) => write!(f, "{level} ({bounds})"),
                    (None, RangeScope::BothFactors) => write!(f, "{bounds} × {bounds}"),
                    (None, RangeScope::OneFactor) => write!(f, "{bounds} × 1-{MAX_TABLE}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_table_set_falls_back_to_default() {
        let cfg = DifficultyConfig::tables(Vec::new()).normalized();
        assert_eq!(cfg, DifficultyConfig::tables([DEFAULT_TABLE]));
    }

    #[test]
    fn table_set_drops_out_of_range_tables() {
        let cfg = DifficultyConfig::tables([0, 3, 11, 7]).normalized();
        assert_eq!(cfg, DifficultyConfig::tables([3, 7]));

        let cfg = DifficultyConfig::tables([0, 42]).normalized();
        assert_eq!(cfg, DifficultyConfig::tables([DEFAULT_TABLE]));
    }

    #[test]
    fn fixed_table_is_clamped() {
        assert_eq!(
            DifficultyConfig::fixed(0).normalized(),
            DifficultyConfig::fixed(1)
        );
        assert_eq!(
            DifficultyConfig::fixed(99).normalized(),
            DifficultyConfig::fixed(10)
        );
    }

    #[test]
    fn reversed_range_is_swapped_and_floored() {
        let cfg = DifficultyConfig::range(7, 0, RangeScope::OneFactor).normalized();
        assert_eq!(cfg, DifficultyConfig::range(1, 7, RangeScope::OneFactor));
    }

    #[test]
    fn oversized_range_is_capped_at_max_table() {
        let cfg = DifficultyConfig::range(70000, 70000, RangeScope::BothFactors).normalized();
        assert_eq!(cfg, DifficultyConfig::range(10, 10, RangeScope::BothFactors));

        let cfg = DifficultyConfig::range(u32::MAX, 4, RangeScope::OneFactor).normalized();
        assert_eq!(cfg, DifficultyConfig::range(4, 10, RangeScope::OneFactor));
    }

    #[test]
    fn fixed_table_samples_constant_first_factor() {
        let mut rng = StdRng::seed_from_u64(7);
        let cfg = DifficultyConfig::fixed(5);
        for _ in 0..200 {
            let (a, b) = cfg.sample_factors(&mut rng);
            assert_eq!(a, 5);
            assert!((1..=10).contains(&b));
        }
    }

    #[test]
    fn table_set_samples_only_selected_tables() {
        let mut rng = StdRng::seed_from_u64(11);
        let cfg = DifficultyConfig::tables([2, 9]);
        let mut seen = BTreeSet::new();
        for _ in 0..200 {
            let (a, b) = cfg.sample_factors(&mut rng);
            assert!(a == 2 || a == 9);
            assert!((1..=10).contains(&b));
            seen.insert(a);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn range_samples_within_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let both = DifficultyLevel::Hard.config();
        let one = DifficultyConfig::range(5, 7, RangeScope::OneFactor);
        for _ in 0..200 {
            let (a, b) = both.sample_factors(&mut rng);
            assert!((5..=7).contains(&a) && (5..=7).contains(&b));
            let (a, b) = one.sample_factors(&mut rng);
            assert!((5..=7).contains(&a) && (1..=10).contains(&b));
        }
    }

    #[test]
    fn level_is_recognised_from_range() {
        assert_eq!(
            DifficultyLevel::Easy.config().level(),
            Some(DifficultyLevel::Easy)
        );
        assert_eq!(DifficultyConfig::range(2, 4, RangeScope::BothFactors).level(), None);
        assert_eq!(DifficultyConfig::fixed(3).level(), None);
    }

    #[test]
    fn shift_table_wraps() {
        assert_eq!(DifficultyConfig::fixed(10).shift_table(1), DifficultyConfig::fixed(1));
        assert_eq!(DifficultyConfig::fixed(1).shift_table(-1), DifficultyConfig::fixed(10));
        assert_eq!(DifficultyConfig::fixed(4).shift_table(2), DifficultyConfig::fixed(6));
        assert_eq!(
            DifficultyLevel::Easy.config().shift_table(1),
            DifficultyConfig::default()
        );
    }

    #[test]
    fn display_labels() {
        assert_eq!(DifficultyConfig::fixed(5).to_string(), "×5");
        assert_eq!(DifficultyConfig::tables([10, 2, 5]).to_string(), "×2,5,10");
        assert_eq!(DifficultyLevel::Easy.config().to_string(), "easy (1-3)");
    }

    #[test]
    fn serde_uses_tagged_shape() {
        let json = r#"{"kind":"range","min":1,"max":3}"#;
        let cfg: DifficultyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg, DifficultyLevel::Easy.config());
    }
}
