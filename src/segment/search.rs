//! Confidence-guided boundary search.
//!
//! The oracle is asked about a crop between two split points; while it is
//! not convinced, the crop is widened by `extend_step` columns and asked
//! again. The search is a small state machine:
//! Searching → Accepted | BestEffort | OutOfBounds
//!
//! Only Accepted keeps the last crop. The other two fall back to the
//! extension that scored highest, not the last one attempted.

use anyhow::Result;

use crate::config::SplitterConfig;

/// Where a segment sits in its word, which decides how it may grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Touches the right edge: grows leftward only
    RightEdge,
    /// Starts at the left edge: anchored at column 0, grows rightward only
    LeftEdge,
    /// Grows on both sides at once
    Interior,
}

impl Regime {
    /// Classifies the segment `[start, end)` of a `width`-column word.
    pub fn for_segment(start: u32, end: u32, width: u32, config: &SplitterConfig) -> Self {
        if width.saturating_sub(end) <= config.right_edge_margin {
            Regime::RightEdge
        } else if start <= config.left_edge_margin {
            Regime::LeftEdge
        } else {
            Regime::Interior
        }
    }

    /// Largest extension the search may attempt.
    pub fn budget(&self, min_letter_width: u32) -> u32 {
        match self {
            Regime::RightEdge | Regime::LeftEdge => min_letter_width / 2,
            Regime::Interior => min_letter_width,
        }
    }

    /// Columns covered by the segment grown by `extend`, or `None` when
    /// that would leave the word.
    pub fn window(&self, start: u32, end: u32, width: u32, extend: u32) -> Option<(u32, u32)> {
        match self {
            Regime::RightEdge => start.checked_sub(extend).map(|left| (left, end)),
            Regime::LeftEdge => {
                let right = end + extend;
                (right <= width).then_some((0, right))
            }
            Regime::Interior => {
                let left = start.checked_sub(extend)?;
                let right = end + extend;
                (right <= width).then_some((left, right))
            }
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::RightEdge => write!(f, "right edge"),
            Regime::LeftEdge => write!(f, "left edge"),
            Regime::Interior => write!(f, "interior"),
        }
    }
}

/// Boundary search states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Still widening the crop
    Searching,
    /// The oracle cleared the acceptance threshold
    Accepted,
    /// The extension budget ran out
    BestEffort,
    /// The next extension would leave the word
    OutOfBounds,
}

impl std::fmt::Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchState::Searching => write!(f, "Searching"),
            SearchState::Accepted => write!(f, "Accepted"),
            SearchState::BestEffort => write!(f, "Best effort"),
            SearchState::OutOfBounds => write!(f, "Out of bounds"),
        }
    }
}

/// Mutable record of one boundary search. Discarded once the crop is chosen.
#[derive(Debug, Clone)]
pub struct SearchRun {
    pub state: SearchState,
    /// Extension currently being evaluated
    pub extend_budget: u32,
    pub best_confidence: Option<u8>,
    pub best_extend: u32,
}

impl SearchRun {
    fn new() -> Self {
        Self {
            state: SearchState::Searching,
            extend_budget: 0,
            best_confidence: None,
            best_extend: 0,
        }
    }

    /// Remembers the evaluation if it beats every earlier one.
    fn record(&mut self, confidence: u8) {
        if self.best_confidence.is_none_or(|best| confidence > best) {
            self.best_confidence = Some(confidence);
            self.best_extend = self.extend_budget;
        }
    }
}

/// Result of a finished boundary search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub state: SearchState,
    /// Extension of the chosen crop
    pub extend: u32,
    /// Oracle confidence of the chosen crop
    pub confidence: u8,
    /// Chosen columns, half-open
    pub range: (u32, u32),
    /// Extensions attempted beyond the initial crop
    pub steps: u32,
}

/// Searches for the tightest crop around `[start, end)` that the oracle accepts.
///
/// `evaluate` receives a half-open column range and returns the oracle's
/// confidence for it. It is called once per step, never batched.
pub fn search_boundary<F>(
    regime: Regime,
    start: u32,
    end: u32,
    width: u32,
    config: &SplitterConfig,
    mut evaluate: F,
) -> Result<SearchOutcome>
where
    F: FnMut(u32, u32) -> Result<u8>,
{
    let budget = regime.budget(config.min_letter_width);
    let step = config.extend_step.max(1);
    let mut run = SearchRun::new();
    let mut steps = 0;
    let mut last_confidence = 0;

    // Extension 0 is always inside the word
    let mut range = regime
        .window(start, end, width, 0)
        .unwrap_or((start.min(end), end));

    while run.state == SearchState::Searching {
        let confidence = evaluate(range.0, range.1)?;
        last_confidence = confidence;
        run.record(confidence);

        if confidence > config.accept_confidence {
            run.state = SearchState::Accepted;
            break;
        }

        let next = run.extend_budget + step;
        if next > budget {
            run.state = SearchState::BestEffort;
            break;
        }

        match regime.window(start, end, width, next) {
            Some(grown) => {
                range = grown;
                run.extend_budget = next;
                steps += 1;
            }
            None => run.state = SearchState::OutOfBounds,
        }
    }

    if run.state == SearchState::Accepted {
        return Ok(SearchOutcome {
            state: run.state,
            extend: run.extend_budget,
            confidence: last_confidence,
            range,
            steps,
        });
    }

    let best_range = regime
        .window(start, end, width, run.best_extend)
        .unwrap_or(range);

    Ok(SearchOutcome {
        state: run.state,
        extend: run.best_extend,
        confidence: run.best_confidence.unwrap_or(0),
        range: best_range,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SplitterConfig {
        SplitterConfig::default()
    }

    #[test]
    fn test_regime_selection() {
        let cfg = config();
        assert_eq!(Regime::for_segment(40, 80, 80, &cfg), Regime::RightEdge);
        assert_eq!(Regime::for_segment(40, 75, 80, &cfg), Regime::RightEdge);
        assert_eq!(Regime::for_segment(0, 40, 80, &cfg), Regime::LeftEdge);
        assert_eq!(Regime::for_segment(4, 40, 80, &cfg), Regime::LeftEdge);
        assert_eq!(Regime::for_segment(5, 40, 80, &cfg), Regime::Interior);
        // A single segment spanning the word counts as right edge
        assert_eq!(Regime::for_segment(0, 80, 80, &cfg), Regime::RightEdge);
    }

    #[test]
    fn test_regime_budgets() {
        assert_eq!(Regime::RightEdge.budget(12), 6);
        assert_eq!(Regime::LeftEdge.budget(12), 6);
        assert_eq!(Regime::Interior.budget(12), 12);
    }

    #[test]
    fn test_windows() {
        assert_eq!(Regime::RightEdge.window(20, 50, 50, 4), Some((16, 50)));
        assert_eq!(Regime::RightEdge.window(3, 50, 50, 4), None);
        assert_eq!(Regime::LeftEdge.window(0, 30, 50, 4), Some((0, 34)));
        assert_eq!(Regime::LeftEdge.window(0, 48, 50, 4), None);
        assert_eq!(Regime::Interior.window(20, 30, 50, 2), Some((18, 32)));
        assert_eq!(Regime::Interior.window(1, 30, 50, 2), None);
    }

    #[test]
    fn test_confident_oracle_accepts_immediately() {
        let mut calls = Vec::new();
        let outcome = search_boundary(Regime::Interior, 20, 40, 80, &config(), |a, b| {
            calls.push((a, b));
            Ok(95)
        })
        .unwrap();

        assert_eq!(outcome.state, SearchState::Accepted);
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.extend, 0);
        assert_eq!(outcome.range, (20, 40));
        assert_eq!(calls, vec![(20, 40)]);
    }

    #[test]
    fn test_unconvinced_oracle_falls_back_to_initial_crop() {
        let mut calls = 0;
        let outcome = search_boundary(Regime::Interior, 20, 40, 80, &config(), |_, _| {
            calls += 1;
            Ok(10)
        })
        .unwrap();

        assert_eq!(outcome.state, SearchState::BestEffort);
        assert_eq!(outcome.extend, 0);
        assert_eq!(outcome.range, (20, 40));
        assert_eq!(outcome.confidence, 10);
        // extensions 0, 2, .., 12
        assert_eq!(calls, 7);
        assert_eq!(outcome.steps, 6);
    }

    #[test]
    fn test_edge_budget_is_half_letter() {
        let mut calls = 0;
        let outcome = search_boundary(Regime::RightEdge, 30, 60, 60, &config(), |_, _| {
            calls += 1;
            Ok(0)
        })
        .unwrap();
        // extensions 0, 2, 4, 6
        assert_eq!(calls, 4);
        assert_eq!(outcome.state, SearchState::BestEffort);
        assert_eq!(outcome.range, (30, 60));
    }

    #[test]
    fn test_keeps_best_not_last() {
        // Peaks at extension 4 but never clears 60
        let scores = [20u8, 30, 55, 40, 35, 25, 10];
        let mut i = 0;
        let outcome = search_boundary(Regime::Interior, 20, 40, 80, &config(), |_, _| {
            let s = scores[i];
            i += 1;
            Ok(s)
        })
        .unwrap();

        assert_eq!(outcome.state, SearchState::BestEffort);
        assert_eq!(outcome.extend, 4);
        assert_eq!(outcome.confidence, 55);
        assert_eq!(outcome.range, (16, 44));
    }

    #[test]
    fn test_ties_keep_earlier_extension() {
        let outcome = search_boundary(Regime::Interior, 20, 40, 80, &config(), |a, _| {
            Ok(if a <= 18 { 50 } else { 30 })
        })
        .unwrap();
        assert_eq!(outcome.extend, 2);
    }

    #[test]
    fn test_accepts_after_growing() {
        let outcome = search_boundary(Regime::LeftEdge, 0, 20, 80, &config(), |_, b| {
            Ok(if b >= 24 { 75 } else { 40 })
        })
        .unwrap();
        assert_eq!(outcome.state, SearchState::Accepted);
        assert_eq!(outcome.range, (0, 24));
        assert_eq!(outcome.steps, 2);
        assert_eq!(outcome.confidence, 75);
    }

    #[test]
    fn test_stops_at_word_boundary() {
        // Only 3 columns left of the segment: extension 4 leaves the word
        let outcome = search_boundary(Regime::RightEdge, 3, 30, 30, &config(), |a, _| {
            Ok(if a == 1 { 50 } else { 20 })
        })
        .unwrap();
        assert_eq!(outcome.state, SearchState::OutOfBounds);
        assert_eq!(outcome.range, (1, 30));
        assert_eq!(outcome.extend, 2);
    }

    #[test]
    fn test_oracle_error_propagates() {
        let result = search_boundary(Regime::Interior, 20, 40, 80, &config(), |_, _| {
            Err(anyhow::anyhow!("oracle down"))
        });
        assert!(result.is_err());
    }
}
