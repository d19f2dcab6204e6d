/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// No tape has been loaded yet.
    #[default]
    Uninitialized,
    /// A tape is loaded and the last step (if any) found a transition.
    Ready,
    /// The last step found no transition for the current key.
    Halted,
}

impl RunState {
    /// Returns `true` once a tape has been loaded.
    #[must_use]
    pub const fn is_loaded(self) -> bool {
        !matches!(self, Self::Uninitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::RunState;

    #[test]
    fn run_state_default_is_uninitialized() {
        assert_eq!(RunState::default(), RunState::Uninitialized);
        assert!(!RunState::Uninitialized.is_loaded());
        assert!(RunState::Ready.is_loaded());
        assert!(RunState::Halted.is_loaded());
    }
}
