use std::fmt;

/// Life stage of an organism at an instant.
///
/// Stages are derived from maturity (and, before birth in the extended model,
/// time) and select which branch each power formula takes. They are never
/// stored as state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifeStage {
    /// Before birth in the standard model; lives off its initial reserve.
    Embryo,

    /// Before birth in the extended model; supplied by the mother once
    /// gestation has started.
    Fetus { gestating: bool },

    /// Born but not weaned; feeds on milk.
    Suckling,

    /// Feeding independently, below puberty.
    Juvenile,

    /// At or above puberty; invests in reproduction.
    Adult,
}

impl LifeStage {
    /// Returns `true` before birth.
    #[must_use]
    pub fn is_unborn(self) -> bool {
        matches!(self, Self::Embryo | Self::Fetus { .. })
    }

    /// Returns `true` at or after puberty.
    #[must_use]
    pub fn is_adult(self) -> bool {
        self == Self::Adult
    }
}

impl fmt::Display for LifeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Embryo => "embryo",
            Self::Fetus { gestating: false } => "fetus (awaiting gestation)",
            Self::Fetus { gestating: true } => "fetus",
            Self::Suckling => "suckling",
            Self::Juvenile => "juvenile",
            Self::Adult => "adult",
        })
    }
}
