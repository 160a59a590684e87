use std::{fmt, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::{Error, Result};

/// The largest number of alive neighbors a cell can have in a Moore neighborhood.
pub const MAX_NEIGHBORS: usize = 8;

/// A set of neighbor counts drawn from `0..=MAX_NEIGHBORS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct NeighborCounts(u16);

impl NeighborCounts {
    pub fn new<I>(counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut mask = 0;

        for count in counts {
            if count > MAX_NEIGHBORS {
                return Err(Error::InvalidRule(count));
            }
            mask |= 1 << count;
        }

        Ok(Self(mask))
    }

    const fn from_table(counts: &[u8]) -> Self {
        let mut mask = 0;
        let mut i = 0;
        while i < counts.len() {
            mask |= 1 << counts[i];
            i += 1;
        }
        Self(mask)
    }

    pub fn contains(&self, count: usize) -> bool {
        count <= MAX_NEIGHBORS && self.0 & (1 << count) != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..=MAX_NEIGHBORS).filter(|count| self.contains(*count))
    }
}

impl TryFrom<Vec<usize>> for NeighborCounts {
    type Error = Error;

    fn try_from(value: Vec<usize>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<NeighborCounts> for Vec<usize> {
    fn from(value: NeighborCounts) -> Self {
        value.iter().collect()
    }
}

/// A life-like transition rule: dead cells are born on a count in `birth`,
/// alive cells survive on a count in `survive`, everything else is dead next generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleSet {
    birth: NeighborCounts,
    survive: NeighborCounts,
}

impl RuleSet {
    pub fn new<B, S>(birth: B, survive: S) -> Result<Self>
    where
        B: IntoIterator<Item = usize>,
        S: IntoIterator<Item = usize>,
    {
        Ok(Self {
            birth: NeighborCounts::new(birth)?,
            survive: NeighborCounts::new(survive)?,
        })
    }

    pub fn birth(&self) -> NeighborCounts {
        self.birth
    }

    pub fn survive(&self) -> NeighborCounts {
        self.survive
    }

    pub fn next_liveness(&self, is_alive: bool, alive_neighbors: usize) -> bool {
        if is_alive {
            self.survive.contains(alive_neighbors)
        } else {
            self.birth.contains(alive_neighbors)
        }
    }

    /// The preset this rule is equal to, if any.
    pub fn preset(&self) -> Option<Preset> {
        Preset::iter().find(|preset| preset.rule() == *self)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Preset::Classic.rule()
    }
}

impl From<Preset> for RuleSet {
    fn from(value: Preset) -> Self {
        value.rule()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "B{}/S{}",
            self.birth.iter().join(""),
            self.survive.iter().join("")
        )
    }
}

/// Parses `B3/S23` style notation. The halves may come in either order and case is ignored.
impl FromStr for RuleSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidNotation(s.to_owned());

        let mut birth = None;
        let mut survive = None;

        for part in s.trim().split('/') {
            let mut chars = part.trim().chars();

            let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('B') => &mut birth,
                Some('S') => &mut survive,
                _ => return Err(invalid()),
            };

            if slot.is_some() {
                return Err(invalid());
            }

            let counts = chars
                .map(|c| c.to_digit(10).map(|digit| digit as usize).ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()?;

            *slot = Some(NeighborCounts::new(counts)?);
        }

        Ok(Self {
            birth: birth.ok_or_else(invalid)?,
            survive: survive.ok_or_else(invalid)?,
        })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Classic,
    HighLife,
    Seeds,
    LifeWithoutDeath,
    DayAndNight,
    Replicator,
    Diamoeba,
    Maze,
    Vote,
    TwoByTwo,
}

impl Preset {
    pub fn all() -> impl Iterator<Item = Preset> {
        Preset::iter()
    }

    pub fn rule(self) -> RuleSet {
        let (birth, survive): (&[u8], &[u8]) = match self {
            Preset::Classic => (&[3], &[2, 3]),
            Preset::HighLife => (&[3, 6], &[2, 3]),
            Preset::Seeds => (&[2], &[]),
            Preset::LifeWithoutDeath => (&[3], &[0, 1, 2, 3, 4, 5, 6, 7, 8]),
            Preset::DayAndNight => (&[3, 6, 7, 8], &[3, 4, 6, 7, 8]),
            Preset::Replicator => (&[1, 3, 5, 7], &[1, 3, 5, 7]),
            Preset::Diamoeba => (&[3, 5, 6, 7], &[5, 6, 7, 8]),
            Preset::Maze => (&[3], &[1, 2, 3, 4, 5]),
            Preset::Vote => (&[5, 6, 7, 8], &[4, 5, 6, 7, 8]),
            Preset::TwoByTwo => (&[3, 6], &[1, 2, 5, 6]),
        };

        RuleSet {
            birth: NeighborCounts::from_table(birth),
            survive: NeighborCounts::from_table(survive),
        }
    }

    /// Looks a preset up by name, ignoring case and any `_`, `-` or whitespace,
    /// so `DayAndNight`, `day_and_night`, `day-and-night` and `Day&Night` all match.
    pub fn from_name(name: &str) -> Result<Self> {
        let wanted = normalize_name(name);

        Preset::iter()
            .find(|preset| normalize_name(&preset.to_string()) == wanted)
            .ok_or_else(|| Error::UnknownPreset(name.to_owned()))
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

// `&` reads as "and" so `Day&Night` lines up with `day_and_night`.
pub(crate) fn normalize_name(name: &str) -> String {
    name.replace('&', "and")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
