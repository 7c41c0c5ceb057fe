//! # Epoch Windows
//!
//! Every network epoch, and every mint epoch mirroring it, covers a signing
//! window `[sign_start, sign_end)` followed by a validation window ending at
//! `validate_end`.
//!
//! ```text
//! epoch i-1:  |==== sign ====|---- validate ----|
//! epoch i:                   |==== sign ====|---- validate ----|
//!                            ^ sign_start(i) == sign_end(i-1)
//!                                           ^ validate_end(i-1) <= sign_end(i)
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};

use dbcfed_core::Timestamp;

use crate::error::NetconfError;

/// Signing and validation boundaries of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpochWindow {
    /// Start of the signing window.
    pub sign_start: Timestamp,
    /// End of the signing window.
    pub sign_end: Timestamp,
    /// End of the validation window.
    pub validate_end: Timestamp,
}

impl EpochWindow {
    /// A window starting at `sign_start`, signing for `signing_period` and
    /// validating for `validation_period` after that.
    pub fn starting_at(
        sign_start: Timestamp,
        signing_period: Duration,
        validation_period: Duration,
    ) -> Result<Self, NetconfError> {
        let sign_end = sign_start.checked_add(signing_period)?;
        let validate_end = sign_end.checked_add(validation_period)?;
        Ok(Self {
            sign_start,
            sign_end,
            validate_end,
        })
    }

    /// The window that directly follows this one.
    pub fn successor(
        &self,
        signing_period: Duration,
        validation_period: Duration,
    ) -> Result<Self, NetconfError> {
        Self::starting_at(self.sign_end, signing_period, validation_period)
    }

    /// `sign_start < sign_end < validate_end`.
    pub fn validate(&self) -> Result<(), NetconfError> {
        if self.sign_start >= self.sign_end {
            return Err(NetconfError::SignStartNotBeforeSignEnd {
                sign_start: self.sign_start,
                sign_end: self.sign_end,
            });
        }
        if self.sign_end >= self.validate_end {
            return Err(NetconfError::SignEndNotBeforeValidateEnd {
                sign_end: self.sign_end,
                validate_end: self.validate_end,
            });
        }
        Ok(())
    }

    /// Whether `now` falls inside the signing window.
    pub fn is_signing(&self, now: Timestamp) -> bool {
        self.sign_start <= now && now < self.sign_end
    }
}

/// Check the transition rules between consecutive windows.
pub fn validate_chain<'a>(
    windows: impl IntoIterator<Item = &'a EpochWindow>,
) -> Result<(), NetconfError> {
    let mut prev: Option<&EpochWindow> = None;
    for (index, w) in windows.into_iter().enumerate() {
        if let Some(p) = prev {
            if p.sign_end != w.sign_start {
                return Err(NetconfError::EpochBoundaryGap {
                    index,
                    previous_sign_end: p.sign_end,
                    sign_start: w.sign_start,
                });
            }
            if p.validate_end > w.sign_end {
                return Err(NetconfError::ValidationOutlivesNextSigning {
                    index: index - 1,
                    validate_end: p.validate_end,
                    next_sign_end: w.sign_end,
                });
            }
        }
        prev = Some(w);
    }
    Ok(())
}
