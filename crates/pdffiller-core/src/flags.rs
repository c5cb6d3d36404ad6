//! Field and annotation flag bit sets.

use bitflags::bitflags;

bitflags! {
    /// Field flags from the `/Ff` entry (PDF 1.7 Tables 221, 226, 228, 230).
    ///
    /// Bit positions are shared between field types; a few bits have a
    /// different meaning per type (bit 26 is `RadiosInUnison` for buttons and
    /// `RichText` for text fields).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u32 {
        const READ_ONLY = 1 << 0;
        const REQUIRED = 1 << 1;
        const NO_EXPORT = 1 << 2;
        const MULTILINE = 1 << 12;
        const PASSWORD = 1 << 13;
        const NO_TOGGLE_TO_OFF = 1 << 14;
        const RADIO = 1 << 15;
        const PUSHBUTTON = 1 << 16;
        const COMBO = 1 << 17;
        const EDIT = 1 << 18;
        const SORT = 1 << 19;
        const FILE_SELECT = 1 << 20;
        const MULTI_SELECT = 1 << 21;
        const DO_NOT_SPELL_CHECK = 1 << 22;
        const DO_NOT_SCROLL = 1 << 23;
        const COMB = 1 << 24;
        const RADIOS_IN_UNISON = 1 << 25;
        const COMMIT_ON_SEL_CHANGE = 1 << 26;
    }
}

impl FieldFlags {
    /// Build from a raw `/Ff` integer, keeping unknown bits.
    pub fn from_raw(raw: i64) -> Self {
        Self::from_bits_retain(raw as u32)
    }
}

bitflags! {
    /// Annotation flags from the `/F` entry (PDF 1.7 Table 165).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnnotationFlags: u32 {
        const INVISIBLE = 1 << 0;
        const HIDDEN = 1 << 1;
        const PRINT = 1 << 2;
        const NO_ZOOM = 1 << 3;
        const NO_ROTATE = 1 << 4;
        const NO_VIEW = 1 << 5;
        const READ_ONLY = 1 << 6;
        const LOCKED = 1 << 7;
    }
}

impl AnnotationFlags {
    pub fn from_raw(raw: i64) -> Self {
        Self::from_bits_retain(raw as u32)
    }

    /// Whether a viewer would draw this annotation at all.
    pub fn is_drawn(&self) -> bool {
        !self.intersects(Self::HIDDEN | Self::NO_VIEW)
    }
}
