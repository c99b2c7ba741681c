//! Flag types attached to tokens.

bitflags::bitflags! {
    /// Facts about a scanned token that are not captured by its kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TokenFlags: u16 {
        const NONE                      = 0;
        /// A line break was crossed between the previous token and this one.
        const PRECEDING_LINE_BREAK      = 1 << 0;
        /// A comment sat between the previous significant token and this one.
        const PRECEDING_COMMENT         = 1 << 1;
        const UNTERMINATED              = 1 << 2;
        const EXTENDED_UNICODE_ESCAPE   = 1 << 3;
        const SCIENTIFIC                = 1 << 4;
        const HEX_SPECIFIER             = 1 << 5;
        const BINARY_SPECIFIER          = 1 << 6;
        const OCTAL_SPECIFIER           = 1 << 7;
        const CONTAINS_INVALID_ESCAPE   = 1 << 8;
        const SINGLE_QUOTE              = 1 << 9;
        /// Produced by an interceptor rather than read from source.
        const SYNTHESIZED               = 1 << 10;

        const NUMERIC_LITERAL_FLAGS = Self::SCIENTIFIC.bits()
            | Self::HEX_SPECIFIER.bits()
            | Self::BINARY_SPECIFIER.bits()
            | Self::OCTAL_SPECIFIER.bits();
    }
}
