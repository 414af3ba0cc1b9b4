//! Eclipse and occultation classification bits.

use bitflags::bitflags;

bitflags! {
    /// Classification returned by eclipse and occultation searches,
    /// numerically identical to the engine's `SE_ECL_*` values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EclipseClass: i32 {
        const CENTRAL = 1;
        const NONCENTRAL = 2;
        const TOTAL = 4;
        const ANNULAR = 8;
        const PARTIAL = 16;
        /// Hybrid: annular along part of the track, total elsewhere.
        const ANNULAR_TOTAL = 32;
        const PENUMBRAL = 64;
        const VISIBLE = 128;
        const MAX_VISIBLE = 256;
        const FIRST_VISIBLE = 512;
        const SECOND_VISIBLE = 1024;
        const THIRD_VISIBLE = 2048;
        const FOURTH_VISIBLE = 4096;
        const ONE_TRY = 32 * 1024;
    }
}

impl EclipseClass {
    /// Interpret a raw class code, keeping unknown bits.
    pub fn from_code(code: i32) -> Self {
        Self::from_bits_retain(code)
    }

    /// Display label for a solar eclipse or an occultation.
    pub fn solar_label(self) -> &'static str {
        if self.contains(Self::TOTAL) {
            "Total"
        } else if self.contains(Self::ANNULAR) {
            "Annular"
        } else if self.contains(Self::PARTIAL) {
            "Partial"
        } else if self.contains(Self::ANNULAR_TOTAL) {
            "Hybrid"
        } else {
            "Other"
        }
    }

    /// Display label for a lunar eclipse.
    pub fn lunar_label(self) -> &'static str {
        if self.contains(Self::TOTAL) {
            "Total"
        } else if self.contains(Self::PENUMBRAL) {
            "Penumbral"
        } else if self.contains(Self::PARTIAL) {
            "Partial"
        } else {
            "Other"
        }
    }

    pub fn is_visible(self) -> bool {
        self.contains(Self::VISIBLE)
    }
}
