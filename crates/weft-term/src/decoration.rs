// SPDX-License-Identifier: MIT
//
// Text decorations: emphasis attributes independent of color.
//
// A compact bitfield; combining is bitwise OR and the empty set is the
// neutral element. Each flag maps to one SGR parameter in `ansi.rs`.
//
// The name table drives both directions of the markup round-trip:
// `parse_decoration` accepts canonical names and short aliases,
// `decoration_names` yields canonical names in declaration order.

bitflags::bitflags! {
    /// Text decorations stored as a compact bitfield.
    ///
    /// ```
    /// use weft_term::decoration::Decoration;
    ///
    /// let d = Decoration::BOLD | Decoration::ITALIC;
    /// assert!(d.contains(Decoration::BOLD));
    /// assert!(!d.contains(Decoration::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Decoration: u16 {
        /// SGR 1: increased intensity.
        const BOLD          = 1 << 0;
        /// SGR 2: decreased intensity (faint).
        const DIM           = 1 << 1;
        /// SGR 3: italic.
        const ITALIC        = 1 << 2;
        /// SGR 4: single underline.
        const UNDERLINED    = 1 << 3;
        /// SGR 5: slow blink.
        const SLOW_BLINK    = 1 << 4;
        /// SGR 6: rapid blink. Rarely supported.
        const RAPID_BLINK   = 1 << 5;
        /// SGR 7: swap foreground and background.
        const INVERT        = 1 << 6;
        /// SGR 8: hidden text.
        const CONCEAL       = 1 << 7;
        /// SGR 9: crossed-out text.
        const STRIKETHROUGH = 1 << 8;
    }
}

impl Decoration {
    /// The neutral element: no decorations.
    pub const NONE: Self = Self::empty();
}

/// Canonical names, one per flag, in declaration order.
const CANONICAL: &[(&str, Decoration)] = &[
    ("bold", Decoration::BOLD),
    ("dim", Decoration::DIM),
    ("italic", Decoration::ITALIC),
    ("underline", Decoration::UNDERLINED),
    ("slowblink", Decoration::SLOW_BLINK),
    ("rapidblink", Decoration::RAPID_BLINK),
    ("invert", Decoration::INVERT),
    ("conceal", Decoration::CONCEAL),
    ("strikethrough", Decoration::STRIKETHROUGH),
];

/// Aliases accepted on input only.
const ALIASES: &[(&str, Decoration)] = &[
    ("none", Decoration::NONE),
    ("b", Decoration::BOLD),
    ("i", Decoration::ITALIC),
    ("u", Decoration::UNDERLINED),
    ("reverse", Decoration::INVERT),
    ("blink", Decoration::SLOW_BLINK),
    ("strike", Decoration::STRIKETHROUGH),
    ("s", Decoration::STRIKETHROUGH),
];

/// Look up a decoration by name or alias, ignoring ASCII case.
///
/// `"none"` resolves to the empty set, so it is accepted but changes
/// nothing when OR'd into a style.
///
/// ```
/// use weft_term::decoration::{parse_decoration, Decoration};
///
/// assert_eq!(parse_decoration("B"), Some(Decoration::BOLD));
/// assert_eq!(parse_decoration("strike"), Some(Decoration::STRIKETHROUGH));
/// assert_eq!(parse_decoration("red"), None);
/// ```
#[must_use]
pub fn parse_decoration(name: &str) -> Option<Decoration> {
    CANONICAL
        .iter()
        .chain(ALIASES)
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, d)| d)
}

/// Canonical names of every flag set in `flags`, in declaration order.
///
/// ```
/// use weft_term::decoration::{decoration_names, Decoration};
///
/// let names = decoration_names(Decoration::STRIKETHROUGH | Decoration::BOLD);
/// assert_eq!(names, ["bold", "strikethrough"]);
/// ```
#[must_use]
pub fn decoration_names(flags: Decoration) -> Vec<&'static str> {
    CANONICAL
        .iter()
        .filter(|&&(_, d)| flags.contains(d))
        .map(|&(name, _)| name)
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_empty_and_neutral() {
        assert!(Decoration::NONE.is_empty());
        assert_eq!(Decoration::default(), Decoration::NONE);
        assert_eq!(Decoration::BOLD | Decoration::NONE, Decoration::BOLD);
    }

    #[test]
    fn all_flags_are_distinct() {
        let mut seen = Decoration::empty();
        for &(_, flag) in CANONICAL {
            assert!(!seen.intersects(flag));
            seen |= flag;
        }
        assert_eq!(seen, Decoration::all());
    }

    // ── parse_decoration ────────────────────────────────────────────────

    #[test]
    fn canonical_names_parse() {
        assert_eq!(parse_decoration("bold"), Some(Decoration::BOLD));
        assert_eq!(parse_decoration("dim"), Some(Decoration::DIM));
        assert_eq!(parse_decoration("italic"), Some(Decoration::ITALIC));
        assert_eq!(parse_decoration("underline"), Some(Decoration::UNDERLINED));
        assert_eq!(parse_decoration("slowblink"), Some(Decoration::SLOW_BLINK));
        assert_eq!(parse_decoration("rapidblink"), Some(Decoration::RAPID_BLINK));
        assert_eq!(parse_decoration("invert"), Some(Decoration::INVERT));
        assert_eq!(parse_decoration("conceal"), Some(Decoration::CONCEAL));
        assert_eq!(
            parse_decoration("strikethrough"),
            Some(Decoration::STRIKETHROUGH)
        );
    }

    #[test]
    fn aliases_parse() {
        assert_eq!(parse_decoration("b"), Some(Decoration::BOLD));
        assert_eq!(parse_decoration("i"), Some(Decoration::ITALIC));
        assert_eq!(parse_decoration("u"), Some(Decoration::UNDERLINED));
        assert_eq!(parse_decoration("reverse"), Some(Decoration::INVERT));
        assert_eq!(parse_decoration("blink"), Some(Decoration::SLOW_BLINK));
        assert_eq!(parse_decoration("s"), Some(Decoration::STRIKETHROUGH));
        assert_eq!(parse_decoration("none"), Some(Decoration::NONE));
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(parse_decoration("BOLD"), Some(Decoration::BOLD));
        assert_eq!(parse_decoration("Italic"), Some(Decoration::ITALIC));
    }

    #[test]
    fn unknown_is_none() {
        assert_eq!(parse_decoration("blue"), None);
        assert_eq!(parse_decoration(""), None);
    }

    // ── decoration_names ────────────────────────────────────────────────

    #[test]
    fn names_of_empty_set() {
        assert!(decoration_names(Decoration::NONE).is_empty());
    }

    #[test]
    fn names_follow_declaration_order() {
        let d = Decoration::CONCEAL | Decoration::DIM | Decoration::UNDERLINED;
        assert_eq!(decoration_names(d), ["dim", "underline", "conceal"]);
    }

    #[test]
    fn names_round_trip_every_flag() {
        for flag in Decoration::all().iter() {
            for name in decoration_names(flag) {
                assert_eq!(parse_decoration(name), Some(flag), "{name}");
            }
        }
    }

    #[test]
    fn names_round_trip_full_set() {
        let all = Decoration::all();
        let rebuilt = decoration_names(all)
            .into_iter()
            .filter_map(parse_decoration)
            .fold(Decoration::NONE, |acc, d| acc | d);
        assert_eq!(rebuilt, all);
    }
}
