// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The content of one cell of a question column.
///
/// In most cases, it is enough to use the higher-level builder API, which
/// recognizes the usual missing-value markers.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Response {
    /// An answer, compared by exact label equality.
    Answer(String),
    /// The respondent did not pick anything for this question.
    NoSelection,
}

// ******** Output data structures *********

/// The distribution of the answers of one question.
///
/// The tally and the percentages are listed in order of first appearance
/// in the column.
#[derive(PartialEq, Debug, Clone)]
pub struct Distribution {
    pub tally: Vec<(String, u64)>,
    pub percentages: Vec<(String, f64)>,
    /// Respondents who selected an answer.
    pub total_present: u64,
    pub no_selection: u64,
}

impl Distribution {
    /// True when nobody answered the question. Such a question has nothing
    /// to apportion.
    pub fn is_empty(&self) -> bool {
        self.total_present == 0
    }

    pub fn total_respondents(&self) -> u64 {
        self.total_present + self.no_selection
    }

    pub fn percentage(&self, label: &str) -> Option<f64> {
        self.percentages
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| *p)
    }

    /// The percentages, largest first. Equal shares keep their column order.
    pub fn sorted_percentages(&self) -> Vec<(String, f64)> {
        let mut res = self.percentages.clone();
        res.sort_by(|a, b| b.1.total_cmp(&a.1));
        res
    }
}

/// One line of the derivation of a vote allocation.
#[derive(PartialEq, Debug, Clone)]
pub enum AuditStep {
    Quota {
        label: String,
        percentage: f64,
        total_votes: u32,
        quota: f64,
    },
    Floor {
        label: String,
        floor: u64,
        remainder: f64,
    },
    Remaining {
        allocated: u64,
        remaining: u32,
    },
    /// The position of a label in the remainder ranking and the extra votes it got from it.
    Ranked {
        label: String,
        remainder: f64,
        bonus: u32,
    },
    /// The floors exceeded the total and `count` votes were taken back from this label.
    Trimmed {
        label: String,
        remainder: f64,
        count: u64,
    },
    Final {
        label: String,
        votes: u32,
    },
}

impl Display for AuditStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStep::Quota {
                label,
                percentage,
                total_votes,
                quota,
            } => write!(
                f,
                "  {}: {:.1}% × {} = {:.2}",
                label, percentage, total_votes, quota
            ),
            AuditStep::Floor {
                label,
                floor,
                remainder,
            } => write!(
                f,
                "  {}: {} vote(s) (remainder: {:.2})",
                label, floor, remainder
            ),
            AuditStep::Remaining {
                allocated,
                remaining,
            } => write!(
                f,
                "  {} vote(s) allocated, {} remaining",
                allocated, remaining
            ),
            AuditStep::Ranked {
                label,
                remainder,
                bonus: 1,
            } => write!(f, "  {}: +1 vote (remainder: {:.2})", label, remainder),
            AuditStep::Ranked {
                label,
                remainder,
                bonus,
            } => write!(
                f,
                "  {}: +{} votes (remainder: {:.2})",
                label, bonus, remainder
            ),
            AuditStep::Trimmed {
                label,
                remainder,
                count: 1,
            } => write!(f, "  {}: -1 vote (remainder: {:.2})", label, remainder),
            AuditStep::Trimmed {
                label,
                remainder,
                count,
            } => write!(
                f,
                "  {}: -{} votes (remainder: {:.2})",
                label, count, remainder
            ),
            AuditStep::Final { label, votes } => write!(f, "  {}: {} vote(s)", label, votes),
        }
    }
}

/// The outcome of the apportionment of one question.
#[derive(PartialEq, Debug, Clone)]
pub struct VoteAllocation {
    /// The votes of every label, in the order of the input percentages.
    /// Labels without votes are kept with a count of 0.
    pub votes: Vec<(String, u32)>,
    pub total_votes: u32,
    pub audit: Vec<AuditStep>,
}

impl VoteAllocation {
    pub fn get(&self, label: &str) -> Option<u32> {
        self.votes
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }

    /// The labels that received at least one vote, most votes first.
    pub fn sorted_nonzero(&self) -> Vec<(String, u32)> {
        let mut res: Vec<(String, u32)> =
            self.votes.iter().filter(|(_, v)| *v > 0).cloned().collect();
        res.sort_by_key(|(_, v)| std::cmp::Reverse(*v));
        res
    }

    /// Renders the audit trail as a step-by-step calculation.
    pub fn calculation_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut last_section: Option<u8> = None;
        for step in self.audit.iter() {
            let section = match step {
                AuditStep::Quota { .. } => 1,
                AuditStep::Floor { .. } => 2,
                AuditStep::Remaining { .. } => 3,
                AuditStep::Ranked { .. } => 3,
                AuditStep::Trimmed { .. } => 4,
                AuditStep::Final { .. } => 5,
            };
            if last_section != Some(section) {
                if last_section.is_some() {
                    lines.push(String::new());
                }
                lines.push(self.section_title(section));
                last_section = Some(section);
            }
            // The final listing only shows the answers that got votes.
            match step {
                AuditStep::Remaining { .. } | AuditStep::Final { votes: 0, .. } => {}
                _ => lines.push(step.to_string()),
            }
        }
        lines.join("\n")
    }

    fn section_title(&self, section: u8) -> String {
        match section {
            1 => format!(
                "Step 1: Calculate proportional votes (percentage × {})",
                self.total_votes
            ),
            2 => "Step 2: Allocate whole votes only".to_string(),
            3 => {
                let remaining = self
                    .audit
                    .iter()
                    .find_map(|s| match s {
                        AuditStep::Remaining { remaining, .. } => Some(*remaining),
                        _ => None,
                    })
                    .unwrap_or(0);
                format!(
                    "Step 3: Allocate {} remaining vote(s) by largest remainder",
                    remaining
                )
            }
            4 => "Step 3b: Take back over-allocated votes by smallest remainder".to_string(),
            _ => format!("Final {}-vote allocation:", self.total_votes),
        }
    }
}

/// Errors that prevent the apportionment from running.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AllocationErrors {
    /// No answer to apportion the votes to.
    EmptyInput,
    /// The number of votes to hand out must be at least 1.
    InvalidTotal,
    /// A percentage is negative, infinite or not a number, or so large that
    /// its quota alone exceeds `u32::MAX` votes.
    InvalidPercentage { label: String },
}

impl Error for AllocationErrors {}

impl Display for AllocationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationErrors::EmptyInput => {
                write!(f, "cannot allocate votes without any answer")
            }
            AllocationErrors::InvalidTotal => {
                write!(f, "the total number of votes must be at least 1")
            }
            AllocationErrors::InvalidPercentage { label } => {
                write!(f, "invalid percentage for answer {:?}", label)
            }
        }
    }
}

// ********* Configuration **********

/// How to order answers whose remainders are tied.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// The order of the percentages, which is the order in which the answers
    /// first appear in the column.
    FirstAppearance,
    /// Byte-wise ascending order of the labels.
    Lexicographic,
    /// An order that is hard to guess in advance but fixed for a given seed.
    /// It sorts the labels by the SHA-256 digest of the seed and the label.
    Random(u32),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AllocationRules {
    pub total_votes: u32,
    pub tiebreak_mode: TieBreakMode,
}

impl AllocationRules {
    pub const DEFAULT_TOTAL_VOTES: u32 = 3;

    pub const DEFAULT_RULES: AllocationRules = AllocationRules {
        total_votes: AllocationRules::DEFAULT_TOTAL_VOTES,
        tiebreak_mode: TieBreakMode::FirstAppearance,
    };
}

impl Default for AllocationRules {
    fn default() -> Self {
        AllocationRules::DEFAULT_RULES
    }
}
