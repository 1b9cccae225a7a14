//! Dry/wet crossfading.

/*
Dry/Wet Balance
===============

An effect's output is rarely used on its own. The mixer blends the
unprocessed (dry) signal with the processed (wet) one:

    output = dry × (1 - balance) + wet × balance

      balance = 0.0  →  100% dry
      balance = 0.5  →  half of each
      balance = 1.0  →  100% wet

The crossfade is LINEAR: the weights always sum to 1.0, so two full-scale
signals can never sum past full scale. The price is a perceived loudness
dip around 0.5 when dry and wet are uncorrelated (a reverb tail mostly is).

    Level
      1.0 ──────╲      ╱──────
                 ╲    ╱
      0.5         ╲  ╱
                   ╲╱
      0.0 ─────────────────────
          0.0     0.5     1.0
                balance

Two entry points:

  mix()            Checked. Rejects a balance outside [0, 1] or non-finite.
                   For callers outside the audio thread.

  blend_dry_wet()  Unchecked, inlined. The audio thread uses this after the
                   balance has been validated on its way in.
*/

use crate::error::{ChainError, Result};

/// Blend one dry and one wet sample, rejecting an invalid balance.
pub fn mix(dry: f32, wet: f32, balance: f32) -> Result<f32> {
    validate_balance(balance)?;
    Ok(blend_dry_wet(dry, wet, balance))
}

/// Check that `balance` is a finite value in `[0, 1]`.
pub fn validate_balance(balance: f32) -> Result<()> {
    if !balance.is_finite() {
        return Err(ChainError::invalid("balance", balance, "not a finite number"));
    }
    if !(0.0..=1.0).contains(&balance) {
        return Err(ChainError::invalid("balance", balance, "outside 0..=1"));
    }
    Ok(())
}

/// `dry × (1 - balance) + wet × balance`, no range check.
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, balance: f32) -> f32 {
    dry * (1.0 - balance) + wet * balance
}

/// Blend whole buffers with a fixed balance, writing into `out`.
pub fn mix_block(dry: &[f32], wet: &[f32], balance: f32, out: &mut [f32]) -> Result<()> {
    validate_balance(balance)?;
    debug_assert_eq!(dry.len(), wet.len());
    debug_assert_eq!(dry.len(), out.len());

    for ((&d, &w), o) in dry.iter().zip(wet.iter()).zip(out.iter_mut()) {
        *o = blend_dry_wet(d, w, balance);
    }
    Ok(())
}
