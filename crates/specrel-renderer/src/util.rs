//! Shared utility functions for markdown rendering.

use pulldown_cmark::{CowStr, HeadingLevel, Options};

/// Parser options used by both the renderer and the outline pass.
pub(crate) fn parser_options(gfm: bool) -> Options {
    if gfm {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM
    } else {
        Options::empty()
    }
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Language of a fenced code block (first word of the info string).
pub(crate) fn fence_language(info: &CowStr<'_>) -> Option<String> {
    info.split_whitespace().next().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_to_num() {
        assert_eq!(heading_level_to_num(HeadingLevel::H1), 1);
        assert_eq!(heading_level_to_num(HeadingLevel::H6), 6);
    }

    #[test]
    fn test_fence_language() {
        assert_eq!(
            fence_language(&CowStr::from("rust title=\"x\"")),
            Some("rust".to_owned())
        );
        assert_eq!(fence_language(&CowStr::from("")), None);
        assert_eq!(fence_language(&CowStr::from("   ")), None);
    }

    #[test]
    fn test_parser_options_without_gfm() {
        assert!(parser_options(false).is_empty());
        assert!(parser_options(true).contains(Options::ENABLE_TABLES));
    }
}
