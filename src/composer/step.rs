//! Wizard steps and the step transition reducer

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entry::ItemStep;

/// Stage of the entry wizard, in order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Situation,
    Thoughts,
    Emotions,
    Reactions,
}

impl Step {
    pub fn all() -> &'static [Step] {
        &[Step::Situation, Step::Thoughts, Step::Emotions, Step::Reactions]
    }

    pub fn is_first(&self) -> bool {
        *self == Step::Situation
    }

    pub fn is_last(&self) -> bool {
        *self == Step::Reactions
    }

    /// The list edited on this step; `None` for `Situation`
    pub fn item_step(&self) -> Option<ItemStep> {
        match self {
            Step::Situation => None,
            Step::Thoughts => Some(ItemStep::Thoughts),
            Step::Emotions => Some(ItemStep::Emotions),
            Step::Reactions => Some(ItemStep::Reactions),
        }
    }
}

impl From<ItemStep> for Step {
    fn from(step: ItemStep) -> Self {
        match step {
            ItemStep::Thoughts => Step::Thoughts,
            ItemStep::Emotions => Step::Emotions,
            ItemStep::Reactions => Step::Reactions,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Situation => write!(f, "situation"),
            Step::Thoughts => write!(f, "thoughts"),
            Step::Emotions => write!(f, "emotions"),
            Step::Reactions => write!(f, "reactions"),
        }
    }
}

/// Navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Forward,
    Backward,
    JumpTo(Step),
}

/// Pure step reducer
///
/// `Forward` stops at `Reactions` and `Backward` stops at `Situation`.
/// `JumpTo` is never refused; gating jumps is the caller's job.
pub fn transition(step: Step, action: StepAction) -> Step {
    match action {
        StepAction::Forward => match step {
            Step::Situation => Step::Thoughts,
            Step::Thoughts => Step::Emotions,
            Step::Emotions | Step::Reactions => Step::Reactions,
        },
        StepAction::Backward => match step {
            Step::Situation | Step::Thoughts => Step::Situation,
            Step::Emotions => Step::Thoughts,
            Step::Reactions => Step::Emotions,
        },
        StepAction::JumpTo(target) => target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_walks_in_order_and_saturates() {
        let mut step = Step::default();
        let mut seen = vec![step];
        for _ in 0..4 {
            step = transition(step, StepAction::Forward);
            seen.push(step);
        }
        assert_eq!(
            seen,
            vec![
                Step::Situation,
                Step::Thoughts,
                Step::Emotions,
                Step::Reactions,
                Step::Reactions,
            ]
        );
    }

    #[test]
    fn test_backward_stops_at_situation() {
        assert_eq!(transition(Step::Reactions, StepAction::Backward), Step::Emotions);
        assert_eq!(transition(Step::Thoughts, StepAction::Backward), Step::Situation);
        assert_eq!(transition(Step::Situation, StepAction::Backward), Step::Situation);
    }

    #[test]
    fn test_jump_is_unconditional() {
        for from in Step::all() {
            for to in Step::all() {
                assert_eq!(transition(*from, StepAction::JumpTo(*to)), *to);
            }
        }
    }

    #[test]
    fn test_item_step_mapping() {
        assert_eq!(Step::Situation.item_step(), None);
        for item in ItemStep::all() {
            assert_eq!(Step::from(*item).item_step(), Some(*item));
        }
    }
}
