use std::str::FromStr;

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{
    error::{Error, Result},
    rule::normalize_name,
};

/// Well known starting shapes, stamped onto a board with `Board::stamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Pattern {
    Glider,
    Block,
    Blinker,
    Toad,
    Beacon,
    LightweightSpaceship,
}

impl Pattern {
    /// Alive cells as (x, y) offsets from the pattern's top left corner.
    pub fn cells(self) -> &'static [(usize, usize)] {
        match self {
            Pattern::Glider => &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
            Pattern::Block => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Pattern::Blinker => &[(0, 0), (1, 0), (2, 0)],
            Pattern::Toad => &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
            Pattern::Beacon => &[(0, 0), (1, 0), (0, 1), (3, 2), (2, 3), (3, 3)],
            Pattern::LightweightSpaceship => &[
                (1, 0),
                (4, 0),
                (0, 1),
                (0, 2),
                (4, 2),
                (0, 3),
                (1, 3),
                (2, 3),
                (3, 3),
            ],
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let wanted = normalize_name(name);

        Pattern::iter()
            .find(|pattern| normalize_name(&pattern.to_string()) == wanted)
            .ok_or_else(|| Error::UnknownPattern(name.to_owned()))
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!("glider".parse::<Pattern>(), Ok(Pattern::Glider));
        assert_eq!(
            Pattern::from_name("LightweightSpaceship"),
            Ok(Pattern::LightweightSpaceship)
        );
        assert_eq!(
            Pattern::from_name("pulsar"),
            Err(Error::UnknownPattern("pulsar".to_owned()))
        );
    }
}
