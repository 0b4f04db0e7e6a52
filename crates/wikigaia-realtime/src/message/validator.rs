//! Subscription list parsing.

use wikigaia_core::types::ProblemId;

/// Outcome of parsing a comma-separated problem id list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedProblemIds {
    /// Well-formed ids, deduplicated, in request order.
    pub accepted: Vec<ProblemId>,
    /// Malformed or over-limit entries, verbatim.
    pub rejected: Vec<String>,
}

/// Parse `raw` (e.g. `"id1,id2"`), keeping at most `max` ids.
///
/// Blank entries are ignored. Malformed ids are dropped, never fatal.
pub fn parse_problem_ids(raw: &str, max: usize) -> ParsedProblemIds {
    let mut parsed = ParsedProblemIds::default();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match entry.parse::<ProblemId>() {
            Ok(id) if parsed.accepted.contains(&id) => {}
            Ok(id) if parsed.accepted.len() < max => parsed.accepted.push(id),
            _ => parsed.rejected.push(entry.to_string()),
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_ids_dropped() {
        let p1 = ProblemId::new();
        let parsed = parse_problem_ids(&format!("{p1}, not-a-uuid,,"), 10);
        assert_eq!(parsed.accepted, vec![p1]);
        assert_eq!(parsed.rejected, vec!["not-a-uuid".to_string()]);
    }

    #[test]
    fn test_duplicates_and_limit() {
        let ids: Vec<ProblemId> = (0..3).map(|_| ProblemId::new()).collect();
        let raw = format!("{},{},{},{}", ids[0], ids[0], ids[1], ids[2]);
        let parsed = parse_problem_ids(&raw, 2);
        assert_eq!(parsed.accepted, vec![ids[0], ids[1]]);
        assert_eq!(parsed.rejected, vec![ids[2].to_string()]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_problem_ids("", 5), ParsedProblemIds::default());
    }
}
