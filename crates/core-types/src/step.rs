//! Workflow step stages.
//!
//! The driven workflow advances through four ordered stages. Progress is
//! persisted as the bare step number, so the enum round-trips through
//! `u8` on the wire and in the state file.

use serde::{Deserialize, Serialize};

/// Ordered workflow stage. Advances monotonically within one logical
/// run; never regresses except through an explicit reset.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum StepStage {
    #[default]
    Init,
    SignInClicked,
    SignUpClicked,
    FormSubmitted,
}

impl StepStage {
    pub fn step_number(self) -> u8 {
        match self {
            StepStage::Init => 0,
            StepStage::SignInClicked => 1,
            StepStage::SignUpClicked => 2,
            StepStage::FormSubmitted => 3,
        }
    }

    pub fn from_step_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(StepStage::Init),
            1 => Some(StepStage::SignInClicked),
            2 => Some(StepStage::SignUpClicked),
            3 => Some(StepStage::FormSubmitted),
            _ => None,
        }
    }

    /// The stage reached once the action for this target stage succeeds
    /// has this stage as its prerequisite. `Init` has no action.
    pub fn prerequisite(self) -> Option<Self> {
        match self {
            StepStage::Init => None,
            other => StepStage::from_step_number(other.step_number() - 1),
        }
    }

    pub fn next(self) -> Option<Self> {
        StepStage::from_step_number(self.step_number() + 1)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, StepStage::FormSubmitted)
    }

    pub fn describe(self) -> &'static str {
        match self {
            StepStage::Init => "initial",
            StepStage::SignInClicked => "sign-in clicked",
            StepStage::SignUpClicked => "sign-up clicked",
            StepStage::FormSubmitted => "form submitted",
        }
    }
}

impl From<StepStage> for u8 {
    fn from(stage: StepStage) -> u8 {
        stage.step_number()
    }
}

impl TryFrom<u8> for StepStage {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        StepStage::from_step_number(n).ok_or_else(|| format!("invalid step number: {}", n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert!(StepStage::Init < StepStage::SignInClicked);
        assert!(StepStage::SignUpClicked < StepStage::FormSubmitted);
    }

    #[test]
    fn prerequisite_chain() {
        assert_eq!(StepStage::Init.prerequisite(), None);
        assert_eq!(
            StepStage::SignInClicked.prerequisite(),
            Some(StepStage::Init)
        );
        assert_eq!(
            StepStage::FormSubmitted.prerequisite(),
            Some(StepStage::SignUpClicked)
        );
    }

    #[test]
    fn terminal_stage_has_no_next() {
        assert_eq!(StepStage::FormSubmitted.next(), None);
        assert!(StepStage::FormSubmitted.is_terminal());
    }

    #[test]
    fn round_trips_through_step_number() {
        for n in 0..=3u8 {
            let stage = StepStage::from_step_number(n).unwrap();
            assert_eq!(stage.step_number(), n);
        }
        assert_eq!(StepStage::from_step_number(4), None);
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&StepStage::SignUpClicked).unwrap();
        assert_eq!(json, "2");
        let back: StepStage = serde_json::from_str("2").unwrap();
        assert_eq!(back, StepStage::SignUpClicked);
        assert!(serde_json::from_str::<StepStage>("7").is_err());
    }
}
