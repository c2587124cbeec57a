use m365_catalog::CommandDescriptor;
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};

/// Field weights: a hit on the command name outranks the same hit on the
/// description.
const NAME_WEIGHT: f32 = 0.7;
const DESCRIPTION_WEIGHT: f32 = 0.3;

/// Query atoms shorter than this are dropped to avoid single-character noise
/// matches.
const MIN_ATOM_LEN: usize = 2;

/// Fuzzy search over a catalog snapshot using nucleo-matcher.
///
/// The index has no identity beyond the snapshot it is given: it is rebuilt
/// per call, which is cheap at catalog scale (hundreds of entries).
pub struct CommandSearch {
    matcher: Matcher,
}

impl CommandSearch {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    /// Search descriptors by fuzzy matching against names and descriptions.
    /// Returns (descriptor_index, score) ordered best match first; ties keep
    /// catalog insertion order. The caller is responsible for clamping
    /// `limit`.
    pub fn search(
        &mut self,
        query: &str,
        commands: &[CommandDescriptor],
        limit: usize,
    ) -> Vec<(usize, f32)> {
        let atoms: Vec<&str> = query
            .split_whitespace()
            .filter(|atom| atom.chars().count() >= MIN_ATOM_LEN)
            .collect();
        if atoms.is_empty() {
            return Vec::new();
        }

        let pattern = Pattern::parse(
            &atoms.join(" "),
            CaseMatching::Smart,
            Normalization::Smart,
        );

        let mut scored: Vec<(usize, f32)> = commands
            .iter()
            .enumerate()
            .filter_map(|(idx, command)| {
                let name_haystack = Utf32String::from(command.name.as_str());
                let name_score = pattern.score(name_haystack.slice(..), &mut self.matcher);

                let description_haystack = Utf32String::from(command.description.as_str());
                let description_score =
                    pattern.score(description_haystack.slice(..), &mut self.matcher);

                if name_score.is_none() && description_score.is_none() {
                    return None;
                }

                let weighted = NAME_WEIGHT * name_score.unwrap_or(0) as f32
                    + DESCRIPTION_WEIGHT * description_score.unwrap_or(0) as f32;
                Some((idx, weighted))
            })
            .collect();

        // Stable sort keeps insertion order across equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        // Normalize scores to 0-1 range
        let max_score = scored.first().map(|(_, s)| *s).unwrap_or(1.0);

        scored
            .into_iter()
            .map(|(idx, score)| {
                let normalized = if max_score > 0.0 { score / max_score } else { 0.0 };
                (idx, normalized)
            })
            .collect()
    }
}

impl Default for CommandSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(name: &str, description: &str) -> CommandDescriptor {
        CommandDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            docs: None,
            options: Vec::new(),
        }
    }

    fn catalog() -> Vec<CommandDescriptor> {
        vec![
            command("spo-list-add", "Creates list in the specified SharePoint site"),
            command("spo-list-get", "Gets information about the specific SharePoint list"),
            command("spo-list-list", "Lists all available lists in the SharePoint site"),
            command("teams-channel-add", "Adds a channel to a Microsoft Teams team"),
        ]
    }

    #[test]
    fn ranks_relevant_commands_first_and_truncates() {
        let mut search = CommandSearch::new();
        let commands = catalog();

        let results = search.search("sharepoint list", &commands, 3);

        assert_eq!(results.len(), 3);
        let mut indices: Vec<usize> = results.iter().map(|(idx, _)| *idx).collect();
        indices.sort_unstable();
        // all three spo-list-* commands, teams-channel-add excluded
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn name_matches_outrank_description_matches() {
        let mut search = CommandSearch::new();
        let commands = vec![
            command("entra-user-add", "Creates an account"),
            command("outlook-message-send", "entra-user-add is unrelated to this"),
        ];

        let results = search.search("user add", &commands, 5);

        assert_eq!(results[0].0, 0);
    }

    #[test]
    fn scores_are_best_first() {
        let mut search = CommandSearch::new();
        let commands = catalog();

        let results = search.search("list", &commands, 10);

        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn drops_single_character_atoms() {
        let mut search = CommandSearch::new();
        let commands = catalog();

        assert!(search.search("a", &commands, 10).is_empty());
        assert!(search.search("  ", &commands, 10).is_empty());

        // "a list" degrades to exactly what "list" alone matches
        let degraded: Vec<usize> = search
            .search("a list", &commands, 10)
            .into_iter()
            .map(|(idx, _)| idx)
            .collect();
        let plain: Vec<usize> = search
            .search("list", &commands, 10)
            .into_iter()
            .map(|(idx, _)| idx)
            .collect();
        assert!(!degraded.is_empty());
        assert_eq!(degraded, plain);
    }

    #[test]
    fn respects_limit() {
        let mut search = CommandSearch::new();
        let commands = catalog();

        for limit in 1..=4 {
            let results = search.search("spo", &commands, limit);
            assert!(results.len() <= limit);
        }
    }

    #[test]
    fn unmatched_query_returns_empty() {
        let mut search = CommandSearch::new();
        let commands = catalog();

        assert!(search.search("kubernetes", &commands, 10).is_empty());
    }
}
