use clawcade_core::PlayDisplay;
use tracing::trace;

/// Cabinet play counter: a row of digit indicators with exactly one lit.
///
/// Counts beyond the last indicator show the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitDisplay {
    indicators: usize,
    shown: Option<usize>,
}

impl DigitDisplay {
    pub fn new(indicators: usize) -> Self {
        Self {
            indicators,
            shown: None,
        }
    }

    /// Index of the lit indicator.
    pub fn shown(&self) -> Option<usize> {
        self.shown
    }
}

impl PlayDisplay for DigitDisplay {
    fn update_display(&mut self, remaining_plays: u32) {
        if self.indicators == 0 {
            return;
        }
        let index = usize::try_from(remaining_plays)
            .unwrap_or(usize::MAX)
            .min(self.indicators - 1);
        trace!(remaining_plays, index, "display updated");
        self.shown = Some(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lights_one_indicator_clamped_to_range() {
        let mut display = DigitDisplay::new(4);
        assert_eq!(display.shown(), None);

        display.update_display(2);
        assert_eq!(display.shown(), Some(2));

        display.update_display(9);
        assert_eq!(display.shown(), Some(3));

        display.update_display(0);
        assert_eq!(display.shown(), Some(0));
    }

    #[test]
    fn empty_display_ignores_updates() {
        let mut display = DigitDisplay::new(0);
        display.update_display(3);
        assert_eq!(display.shown(), None);
    }
}
