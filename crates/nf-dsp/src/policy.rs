//! Apply policy for auxiliary and ADC channels
//!
//! Regular channels are only ever bypassed explicitly. Aux/ADC channels
//! additionally follow one global switch: when the switch is off they are
//! bypassed, when it is on they are filtered.

use nf_core::ChannelKind;

/// Global apply-to-ADC rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyPolicy {
    apply_on_adc: bool,
}

impl ApplyPolicy {
    pub const fn new(apply_on_adc: bool) -> Self {
        Self { apply_on_adc }
    }

    #[inline]
    pub fn apply_on_adc(&self) -> bool {
        self.apply_on_adc
    }

    /// Bypass state the rule imposes on a channel of `kind`, or `None` if
    /// the rule does not govern that kind
    #[inline]
    pub fn bypass_for(&self, kind: ChannelKind) -> Option<bool> {
        kind.is_auxiliary().then_some(!self.apply_on_adc)
    }
}
