//! Reading worker answers
//!
//! Workers answer a matchup by filling one `rating_<n>` field per candidate
//! with the 1-based place they assign it. Ties share a place.

use crate::error::{ArenaError, Result};
use crate::types::Answers;
use crate::utils::filter_non_ascii;

/// Answer field holding the place of the candidate at `position`
pub fn rating_field(position: usize) -> String {
    format!("rating_{}", position + 1)
}

/// Read `len` places from an answer and convert them to 0-based ranks
pub fn parse_ranking(answers: &Answers, len: usize) -> Result<Vec<u32>> {
    (0..len)
        .map(|position| -> Result<u32> {
            let field = rating_field(position);
            let raw = answers
                .get(&field)
                .ok_or_else(|| ArenaError::validation(format!("missing answer field {}", field)))?;

            let place: u32 = raw.trim().parse().map_err(|_| {
                ArenaError::validation(format!("{} is not a place number: {:?}", field, raw))
            })?;
            if place == 0 {
                return Err(ArenaError::validation(format!("{} must be 1 or more", field)).into());
            }
            Ok(place - 1)
        })
        .collect()
}

/// Build the answer a worker would submit for the given 0-based ranks
pub fn ranking_answers(ranks: &[u32]) -> Answers {
    ranks
        .iter()
        .enumerate()
        .map(|(position, rank)| (rating_field(position), (rank + 1).to_string()))
        .collect()
}

/// Free-text answer field with non-ASCII characters stripped
pub fn free_text_answer(answers: &Answers, field: &str) -> Result<String> {
    let raw = answers
        .get(field)
        .ok_or_else(|| ArenaError::validation(format!("missing answer field {}", field)))?;

    let text = filter_non_ascii(raw).trim().to_string();
    if text.is_empty() {
        return Err(ArenaError::validation(format!("{} is empty", field)).into());
    }
    Ok(text)
}
