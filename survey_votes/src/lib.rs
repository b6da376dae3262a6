/*!
Response distributions and largest-remainder vote apportionment for survey questions.

For every question of a survey, [`aggregate`] turns the column of responses into
counts and percentages, and [`allocate_votes`] hands out a small fixed number of
votes (3 by default) to the answers in proportion to their share. The votes always
add up to the requested total.

```
use survey_votes::*;

let column = vec![
    Response::Answer("Yes".to_string()),
    Response::Answer("No".to_string()),
    Response::NoSelection,
    Response::Answer("Yes".to_string()),
];
let distribution = aggregate(&column);
assert_eq!(distribution.total_present, 3);
assert_eq!(distribution.no_selection, 1);

let allocation = allocate_votes(&distribution.percentages, 3)?;
assert_eq!(allocation.get("Yes"), Some(2));
assert_eq!(allocation.get("No"), Some(1));
# Ok::<(), AllocationErrors>(())
```

See the [manual] for the details of the method.
*/
mod config;
pub mod builder;
pub mod manual;

use log::{debug, info, warn};

use std::{cmp::Reverse, collections::HashMap};

pub use crate::config::*;

/// Two remainders closer than this are tied.
pub const REMAINDER_EPSILON: f64 = 1e-9;

/// How far the percentages may add up from 100 before a warning is emitted.
pub const PERCENTAGE_TOLERANCE: f64 = 1e-6;

// **** Private structures ****

// The position of an answer in the percentage map.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct AnswerId(usize);

#[derive(PartialEq, Debug, Clone)]
struct QuotaEntry {
    id: AnswerId,
    quota: f64,
    floor: u64,
    remainder: f64,
}

/// Computes the distribution of the answers in a column.
///
/// Answers are grouped by exact label equality and listed in order of first
/// appearance. A column without any answer gives an empty distribution, which
/// is not an error: there is simply nothing to apportion.
pub fn aggregate(column: &[Response]) -> Distribution {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut tally: Vec<(String, u64)> = Vec::new();
    let mut no_selection: u64 = 0;

    for response in column.iter() {
        match response {
            Response::NoSelection => {
                no_selection += 1;
            }
            Response::Answer(label) => {
                if let Some(&idx) = positions.get(label.as_str()) {
                    tally[idx].1 += 1;
                } else {
                    positions.insert(label.as_str(), tally.len());
                    tally.push((label.clone(), 1));
                }
            }
        }
    }

    let total_present = column.len() as u64 - no_selection;
    debug!(
        "aggregate: {:?} responses, {:?} without selection, tally: {:?}",
        column.len(),
        no_selection,
        tally
    );

    if total_present == 0 {
        return Distribution {
            tally: Vec::new(),
            percentages: Vec::new(),
            total_present: 0,
            no_selection,
        };
    }

    let percentages: Vec<(String, f64)> = tally
        .iter()
        .map(|(label, count)| {
            (
                label.clone(),
                (*count as f64 / total_present as f64) * 100.0,
            )
        })
        .collect();

    Distribution {
        tally,
        percentages,
        total_present,
        no_selection,
    }
}

/// Allocates `total_votes` votes to the answers with the default tie-break
/// (order of first appearance).
pub fn allocate_votes(
    percentages: &[(String, f64)],
    total_votes: u32,
) -> Result<VoteAllocation, AllocationErrors> {
    let rules = AllocationRules {
        total_votes,
        ..AllocationRules::DEFAULT_RULES
    };
    allocate_votes_with_rules(percentages, &rules)
}

/// Runs the largest remainder method with the given rules.
///
/// Arguments:
/// * `percentages` the share of each answer, expected to add up to 100. The
/// values are used as given, without normalization.
/// * `rules` the number of votes to allocate and how to break ties between
/// equal remainders.
///
/// The votes of the result always add up to `rules.total_votes`.
pub fn allocate_votes_with_rules(
    percentages: &[(String, f64)],
    rules: &AllocationRules,
) -> Result<VoteAllocation, AllocationErrors> {
    check_inputs(percentages, rules.total_votes)?;
    let total_votes = rules.total_votes;
    info!(
        "Allocating {:?} votes to {:?} answers, rules: {:?}",
        total_votes,
        percentages.len(),
        rules
    );

    let percentage_sum: f64 = percentages.iter().map(|(_, p)| *p).sum();
    if (percentage_sum - 100.0).abs() > PERCENTAGE_TOLERANCE {
        warn!(
            "allocate_votes: percentages add up to {:?} instead of 100, using them as given",
            percentage_sum
        );
    }

    let label = |id: AnswerId| percentages[id.0].0.clone();
    let mut audit: Vec<AuditStep> = Vec::new();

    let entries = compute_quotas(percentages, total_votes);
    debug!("allocate_votes: quotas: {:?}", entries);
    for e in entries.iter() {
        audit.push(AuditStep::Quota {
            label: label(e.id),
            percentage: percentages[e.id.0].1,
            total_votes,
            quota: e.quota,
        });
    }
    for e in entries.iter() {
        audit.push(AuditStep::Floor {
            label: label(e.id),
            floor: e.floor,
            remainder: e.remainder,
        });
    }

    let allocated: u64 = entries.iter().map(|e| e.floor).sum();
    // Never more than total_votes.
    let remaining = (total_votes as u64).saturating_sub(allocated) as u32;
    audit.push(AuditStep::Remaining {
        allocated,
        remaining,
    });
    debug!(
        "allocate_votes: allocated {:?} whole votes, {:?} remaining",
        allocated, remaining
    );

    let ranking = rank_remainders(&entries, percentages, rules.tiebreak_mode);
    debug!("allocate_votes: remainder ranking: {:?}", ranking);

    let mut votes: Vec<u64> = entries.iter().map(|e| e.floor).collect();
    let bonuses = distribute_leftovers(remaining, &ranking, entries.len());
    for id in ranking.iter() {
        votes[id.0] += bonuses[id.0] as u64;
        audit.push(AuditStep::Ranked {
            label: label(*id),
            remainder: entries[id.0].remainder,
            bonus: bonuses[id.0],
        });
    }

    if allocated > total_votes as u64 {
        let excess = allocated - total_votes as u64;
        let taken = trim_over_allocation(excess, &mut votes, &ranking);
        for id in ranking.iter().rev().filter(|id| taken[id.0] > 0) {
            audit.push(AuditStep::Trimmed {
                label: label(*id),
                remainder: entries[id.0].remainder,
                count: taken[id.0],
            });
        }
    }

    // Once the excess is taken back, every count is at most total_votes.
    let final_votes: Vec<(String, u32)> = percentages
        .iter()
        .zip(votes.iter())
        .map(|((l, _), v)| (l.clone(), *v as u32))
        .collect();

    let mut by_votes = final_votes.clone();
    by_votes.sort_by_key(|(_, v)| Reverse(*v));
    for (l, v) in by_votes {
        audit.push(AuditStep::Final { label: l, votes: v });
    }

    let sum: u64 = votes.iter().sum();
    debug_assert_eq!(sum, total_votes as u64);
    info!("allocate_votes: final allocation: {:?}", final_votes);

    Ok(VoteAllocation {
        votes: final_votes,
        total_votes,
        audit,
    })
}

fn check_inputs(percentages: &[(String, f64)], total_votes: u32) -> Result<(), AllocationErrors> {
    if percentages.is_empty() {
        return Err(AllocationErrors::EmptyInput);
    }
    if total_votes < 1 {
        return Err(AllocationErrors::InvalidTotal);
    }
    // A single quota above u32::MAX cannot be counted in votes.
    if let Some((label, _)) = percentages.iter().find(|(_, p)| {
        !p.is_finite() || *p < 0.0 || (p / 100.0) * total_votes as f64 > u32::MAX as f64
    }) {
        return Err(AllocationErrors::InvalidPercentage {
            label: label.clone(),
        });
    }
    Ok(())
}

fn compute_quotas(percentages: &[(String, f64)], total_votes: u32) -> Vec<QuotaEntry> {
    percentages
        .iter()
        .enumerate()
        .map(|(idx, (_, pct))| {
            let quota = (pct / 100.0) * total_votes as f64;
            // Quotas are never negative: truncation is the floor.
            let whole = quota.floor();
            QuotaEntry {
                id: AnswerId(idx),
                quota,
                floor: whole as u64,
                remainder: quota - whole,
            }
        })
        .collect()
}

/// Orders the answers by remainder, largest first, ties resolved by the tiebreak mode.
fn rank_remainders(
    entries: &[QuotaEntry],
    percentages: &[(String, f64)],
    tiebreak: TieBreakMode,
) -> Vec<AnswerId> {
    let tiebreak_ranks = tiebreak_order(percentages, tiebreak);
    let mut by_remainder: Vec<&QuotaEntry> = entries.iter().collect();
    by_remainder.sort_by(|a, b| {
        b.remainder
            .total_cmp(&a.remainder)
            .then(tiebreak_ranks[a.id.0].cmp(&tiebreak_ranks[b.id.0]))
    });

    // A group holds the remainders within REMAINDER_EPSILON of its largest one.
    let mut groups: Vec<(f64, Vec<AnswerId>)> = Vec::new();
    for e in by_remainder {
        match groups.last_mut() {
            Some((leader, group)) if *leader - e.remainder <= REMAINDER_EPSILON => {
                group.push(e.id);
            }
            _ => {
                groups.push((e.remainder, vec![e.id]));
            }
        }
    }

    let mut ranking: Vec<AnswerId> = Vec::with_capacity(entries.len());
    for (_, mut group) in groups {
        group.sort_by_key(|id| tiebreak_ranks[id.0]);
        ranking.append(&mut group);
    }
    ranking
}

/// The rank of every answer in the tiebreak order, indexed by answer position.
fn tiebreak_order(percentages: &[(String, f64)], tiebreak: TieBreakMode) -> Vec<usize> {
    let mut ordered: Vec<usize> = (0..percentages.len()).collect();
    match tiebreak {
        TieBreakMode::FirstAppearance => {}
        TieBreakMode::Lexicographic => {
            ordered.sort_by(|a, b| percentages[*a].0.cmp(&percentages[*b].0).then(a.cmp(b)));
        }
        TieBreakMode::Random(seed) => {
            let digests = label_digests(percentages, seed);
            ordered.sort_by(|a, b| digests[*a].cmp(&digests[*b]).then(a.cmp(b)));
        }
    }
    debug!(
        "tiebreak_order: mode {:?} order: {:?}",
        tiebreak,
        ordered
            .iter()
            .map(|idx| percentages[*idx].0.as_str())
            .collect::<Vec<&str>>()
    );

    let mut ranks: Vec<usize> = vec![0; percentages.len()];
    for (rank, idx) in ordered.iter().enumerate() {
        ranks[*idx] = rank;
    }
    ranks
}

/// Generates a "random" permutation key for each answer. Random in this context means
/// hard to guess in advance, while staying identical across runs for the same seed.
fn label_digests(percentages: &[(String, f64)], seed: u32) -> Vec<String> {
    percentages
        .iter()
        .map(|(label, _)| sha256::digest(format!("{:08}{}", seed, label).as_str()))
        .collect()
}

/// The extra votes of every answer, indexed by answer position.
///
/// When the quotas add up to much less than the total, there may be more
/// votes left than answers: the ranking is then walked again from the top.
fn distribute_leftovers(remaining: u32, ranking: &[AnswerId], num_answers: usize) -> Vec<u32> {
    let mut bonuses: Vec<u32> = vec![0; num_answers];
    if ranking.is_empty() {
        return bonuses;
    }
    let n = ranking.len() as u64;
    let rounds = (remaining as u64 / n) as u32;
    let extra = remaining as u64 % n;
    for (pos, id) in ranking.iter().enumerate() {
        bonuses[id.0] = rounds + u32::from((pos as u64) < extra);
    }
    bonuses
}

/// Takes back `excess` votes when the floors alone exceed the total.
///
/// Each round takes one vote from every answer that still has some, starting
/// from the smallest remainder. Returns the votes taken from each answer,
/// indexed by answer position.
fn trim_over_allocation(excess: u64, votes: &mut [u64], ranking: &[AnswerId]) -> Vec<u64> {
    let mut taken: Vec<u64> = vec![0; votes.len()];
    let mut left = excess;
    while left > 0 {
        let active: Vec<AnswerId> = ranking
            .iter()
            .rev()
            .filter(|id| votes[id.0] > 0)
            .copied()
            .collect();
        if active.is_empty() {
            break;
        }
        let k = active.len() as u64;
        let lowest = active.iter().map(|id| votes[id.0]).min().unwrap_or(0);
        // Whole rounds, until an answer runs out of votes or less than a round is left.
        let rounds = lowest.min(left / k);
        if rounds > 0 {
            for id in active.iter() {
                votes[id.0] -= rounds;
                taken[id.0] += rounds;
            }
            left -= rounds * k;
        } else {
            for id in active.iter().take(left as usize) {
                votes[id.0] -= 1;
                taken[id.0] += 1;
            }
            left = 0;
        }
    }
    debug!("trim_over_allocation: taken {:?}", taken);
    taken
}
