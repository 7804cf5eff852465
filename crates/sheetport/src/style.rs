//! Style identifiers and resolution
//!
//! Layout calls carry bold/wrap flags; each backend maps the resolved
//! [`StyleId`] to a native style it pre-built once at initialization.
//! Title levels are their own axis, supplied directly by the title
//! operations rather than derived from flags.

use crate::options::LineOptions;

/// An enumerated formatting intent, resolved once per written row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleId {
    /// No explicit formatting
    Default,
    /// Bold text
    Bold,
    /// Wrapped text
    Wrap,
    /// Bold, wrapped text
    BoldWrap,
    /// Main document title
    Title1,
    /// Secondary title
    Title2,
    /// Inline body title
    Title3,
}

impl StyleId {
    /// Whether this style wraps text (drives row auto-height)
    pub fn wraps(&self) -> bool {
        matches!(self, StyleId::Wrap | StyleId::BoldWrap)
    }
}

/// Resolve the style for a row from its option flags.
///
/// Pure and total: bold and wrap are independent, both set combine, and
/// absent flags fall back to [`StyleId::Default`].
pub fn resolve_style(options: &LineOptions) -> StyleId {
    match (options.bold, options.wrap_text) {
        (true, true) => StyleId::BoldWrap,
        (true, false) => StyleId::Bold,
        (false, true) => StyleId::Wrap,
        (false, false) => StyleId::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_combinations() {
        assert_eq!(resolve_style(&LineOptions::default()), StyleId::Default);
        assert_eq!(resolve_style(&LineOptions::default().bold()), StyleId::Bold);
        assert_eq!(resolve_style(&LineOptions::default().wrap()), StyleId::Wrap);
        assert_eq!(
            resolve_style(&LineOptions::default().bold().wrap()),
            StyleId::BoldWrap
        );
    }

    #[test]
    fn test_resolution_ignores_construction_order() {
        let a = LineOptions::default().bold().wrap();
        let b = LineOptions::default().wrap().bold();
        assert_eq!(resolve_style(&a), resolve_style(&b));
    }

    #[test]
    fn test_index_override_does_not_affect_style() {
        let opts = LineOptions::default().at_index(4);
        assert_eq!(resolve_style(&opts), StyleId::Default);
    }
}
