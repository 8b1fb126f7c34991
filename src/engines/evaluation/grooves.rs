/// A named one-bar onset pattern with its reward.
#[derive(Debug, Clone, Copy)]
pub struct GrooveTemplate {
    pub name: &'static str,
    pub pattern: [u8; 8],
    pub reward: f64,
}

const fn groove(name: &'static str, pattern: [u8; 8], reward: f64) -> GrooveTemplate {
    GrooveTemplate {
        name,
        pattern,
        reward,
    }
}

/// Reference grooves over one 8-step bar. Every template starts on the
/// downbeat.
pub const GROOVE_TEMPLATES: [GrooveTemplate; 19] = [
    // Basic
    groove("quarters", [1, 0, 1, 0, 1, 0, 1, 0], 10.0),
    groove("halves", [1, 0, 0, 0, 1, 0, 0, 0], 5.0),
    groove("front-loaded", [1, 0, 1, 0, 1, 0, 0, 0], 10.0),
    groove("back-loaded", [1, 0, 0, 0, 1, 0, 1, 0], 10.0),
    groove("straight-eighths", [1, 1, 1, 1, 1, 1, 1, 1], 4.0),
    // Pop and syncopation
    groove("tresillo", [1, 0, 0, 1, 0, 0, 1, 0], 15.0),
    groove("charleston", [1, 0, 0, 1, 0, 0, 0, 0], 15.0),
    groove("anticipation", [1, 0, 1, 0, 1, 0, 0, 1], 15.0),
    groove("mid-syncopation", [1, 0, 0, 1, 1, 0, 1, 0], 15.0),
    // Rock
    groove("rock-drive", [1, 0, 1, 1, 1, 0, 1, 0], 12.0),
    groove("rock-push", [1, 0, 1, 1, 0, 1, 0, 0], 12.0),
    groove("rock-tail", [1, 0, 1, 0, 1, 1, 1, 0], 12.0),
    // Funk
    groove("funk", [1, 0, 1, 1, 0, 1, 1, 0], 18.0),
    groove("funk-offset", [1, 1, 0, 1, 0, 1, 0, 0], 15.0),
    groove("funk-late", [1, 0, 0, 0, 1, 1, 0, 1], 15.0),
    // Misc
    groove("cinquillo-a", [1, 0, 1, 1, 1, 1, 0, 0], 10.0),
    groove("cinquillo-b", [1, 0, 1, 1, 0, 0, 1, 0], 10.0),
    groove("busy", [1, 0, 1, 1, 1, 1, 1, 0], 5.0),
    groove("double-hit", [1, 1, 0, 1, 1, 0, 1, 0], 15.0),
];

/// Exact-match lookup of a bar's onset pattern.
pub fn match_groove(pattern: &[u8]) -> Option<&'static GrooveTemplate> {
    GROOVE_TEMPLATES.iter().find(|t| t.pattern[..] == *pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_distinct_and_start_on_downbeat() {
        for (i, a) in GROOVE_TEMPLATES.iter().enumerate() {
            assert_eq!(a.pattern[0], 1, "{} starts off the beat", a.name);
            for b in &GROOVE_TEMPLATES[i + 1..] {
                assert_ne!(a.pattern, b.pattern, "{} duplicates {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn test_match_groove() {
        assert_eq!(match_groove(&[1, 0, 0, 1, 0, 0, 1, 0]).map(|t| t.name), Some("tresillo"));
        assert!(match_groove(&[0, 1, 0, 1, 0, 1, 0, 1]).is_none());
        assert!(match_groove(&[1, 0, 0, 1]).is_none());
    }
}
