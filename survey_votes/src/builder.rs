pub use crate::config::*;
use crate::{aggregate, allocate_votes_with_rules};

/// The cell contents that data exports commonly use to mark a missing value.
pub const DEFAULT_NO_SELECTION_LABELS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A builder for the responses of one question.
///
/// Raw cell contents are added one by one. Empty cells and missing-value
/// markers are all recorded as "no selection".
///
/// ```
/// pub use survey_votes::builder::Builder;
/// pub use survey_votes::AllocationRules;
/// # use survey_votes::AllocationErrors;
///
/// let mut builder = Builder::new(&AllocationRules::DEFAULT_RULES)?;
///
/// builder.add_response("Yes");
/// builder.add_response("NA");
/// builder.add_response("No");
/// builder.add_missing();
///
/// let distribution = builder.distribution();
/// assert_eq!(distribution.total_present, 2);
/// assert_eq!(distribution.no_selection, 2);
///
/// let allocation = builder.allocate()?.unwrap();
/// assert_eq!(allocation.get("Yes"), Some(2));
///
/// # Ok::<(), AllocationErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AllocationRules,
    pub(crate) _no_selection_labels: Vec<String>,
    pub(crate) _responses: Vec<Response>,
}

impl Builder {
    pub fn new(rules: &AllocationRules) -> Result<Builder, AllocationErrors> {
        if rules.total_votes < 1 {
            return Err(AllocationErrors::InvalidTotal);
        }
        Ok(Builder {
            _rules: rules.clone(),
            _no_selection_labels: DEFAULT_NO_SELECTION_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            _responses: Vec::new(),
        })
    }

    /// Replaces the markers recognized as a missing value.
    ///
    /// A blank cell is always a missing value, whatever the markers. Responses
    /// already added are kept as they were recorded.
    pub fn no_selection_labels(self, labels: &[String]) -> Builder {
        Builder {
            _rules: self._rules,
            _no_selection_labels: labels.to_vec(),
            _responses: self._responses,
        }
    }

    /// Adds the raw content of a cell.
    ///
    /// Surrounding whitespace is ignored when looking for a missing-value
    /// marker, but an actual answer is kept verbatim.
    pub fn add_response(&mut self, cell: &str) {
        let trimmed = cell.trim();
        let response = if trimmed.is_empty()
            || self._no_selection_labels.iter().any(|l| l == trimmed)
        {
            Response::NoSelection
        } else {
            Response::Answer(cell.to_string())
        };
        self._responses.push(response);
    }

    /// Adds a cell that has no content at all.
    pub fn add_missing(&mut self) {
        self._responses.push(Response::NoSelection);
    }

    pub fn responses(&self) -> &[Response] {
        &self._responses
    }

    pub fn distribution(&self) -> Distribution {
        aggregate(&self._responses)
    }

    /// Apportions the votes of the rules between the answers.
    ///
    /// Returns `None` when no respondent selected an answer.
    pub fn allocate(&self) -> Result<Option<VoteAllocation>, AllocationErrors> {
        let distribution = self.distribution();
        if distribution.is_empty() {
            return Ok(None);
        }
        allocate_votes_with_rules(&distribution.percentages, &self._rules).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_no_selection() {
        let mut b = Builder::new(&AllocationRules::DEFAULT_RULES).unwrap();
        for cell in ["Yes", "", "  ", "NaN", " NA ", "null", "No"] {
            b.add_response(cell);
        }
        let d = b.distribution();
        assert_eq!(d.total_present, 2);
        assert_eq!(d.no_selection, 5);
    }

    #[test]
    fn answers_are_kept_verbatim() {
        let mut b = Builder::new(&AllocationRules::DEFAULT_RULES).unwrap();
        b.add_response("Yes");
        b.add_response("Yes ");
        b.add_response("yes");
        assert_eq!(
            b.responses(),
            &[
                Response::Answer("Yes".to_string()),
                Response::Answer("Yes ".to_string()),
                Response::Answer("yes".to_string()),
            ]
        );
        assert_eq!(b.distribution().tally.len(), 3);
    }

    #[test]
    fn custom_markers() {
        let mut b = Builder::new(&AllocationRules::DEFAULT_RULES)
            .unwrap()
            .no_selection_labels(&["No Selection".to_string()]);
        b.add_response("No Selection");
        b.add_response("NA");
        b.add_response("");
        let d = b.distribution();
        assert_eq!(d.no_selection, 2);
        assert_eq!(d.tally, vec![("NA".to_string(), 1)]);
    }

    #[test]
    fn changing_markers_keeps_previous_responses() {
        let mut b = Builder::new(&AllocationRules::DEFAULT_RULES).unwrap();
        b.add_response("Yes");
        b.add_response("NA");
        let mut b = b.no_selection_labels(&["Skip".to_string()]);
        b.add_response("NA");
        b.add_response("Skip");
        assert_eq!(
            b.responses(),
            &[
                Response::Answer("Yes".to_string()),
                Response::NoSelection,
                Response::Answer("NA".to_string()),
                Response::NoSelection,
            ]
        );
    }

    #[test]
    fn allocate_skips_empty_questions() {
        let mut b = Builder::new(&AllocationRules::DEFAULT_RULES).unwrap();
        b.add_missing();
        b.add_response("N/A");
        assert_eq!(b.allocate().unwrap(), None);
    }

    #[test]
    fn zero_votes_rejected() {
        let rules = AllocationRules {
            total_votes: 0,
            ..AllocationRules::DEFAULT_RULES
        };
        assert_eq!(Builder::new(&rules).err(), Some(AllocationErrors::InvalidTotal));
    }
}
