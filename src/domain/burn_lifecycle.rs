//! Burn Transaction Lifecycle
//!
//! State machine for one approve+burn round trip. The UI layer receives the
//! current `BurnState` as data and renders it; it never tracks loading flags
//! of its own.
//!
//! ```text
//! Idle -> Approving -> AwaitingApprovalConfirm -> ReadyToBurn
//!      -> Burning -> AwaitingBurnConfirm -> Done
//! (any non-terminal state) -> Failed
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Invalid burn transition: {event} while {from}")]
    InvalidTransition { from: &'static str, event: &'static str },
}

/// Where a burn currently stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum BurnState {
    Idle,
    Approving,
    AwaitingApprovalConfirm {
        #[serde(rename = "txHash")]
        tx_hash: String,
    },
    ReadyToBurn,
    Burning,
    AwaitingBurnConfirm {
        #[serde(rename = "txHash")]
        tx_hash: String,
    },
    Done {
        #[serde(rename = "txHash")]
        tx_hash: String,
    },
    Failed {
        reason: String,
    },
}

impl BurnState {
    pub fn name(&self) -> &'static str {
        match self {
            BurnState::Idle => "idle",
            BurnState::Approving => "approving",
            BurnState::AwaitingApprovalConfirm { .. } => "awaitingApprovalConfirm",
            BurnState::ReadyToBurn => "readyToBurn",
            BurnState::Burning => "burning",
            BurnState::AwaitingBurnConfirm { .. } => "awaitingBurnConfirm",
            BurnState::Done { .. } => "done",
            BurnState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BurnState::Done { .. } | BurnState::Failed { .. })
    }

    /// Whether the wallet is waiting on the user or the chain
    pub fn is_busy(&self) -> bool {
        !matches!(
            self,
            BurnState::Idle | BurnState::ReadyToBurn | BurnState::Done { .. } | BurnState::Failed { .. }
        )
    }
}

/// Inputs that move the lifecycle forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BurnEvent {
    StartApproval,
    ApprovalSubmitted { tx_hash: String },
    ApprovalConfirmed,
    StartBurn,
    BurnSubmitted { tx_hash: String },
    BurnConfirmed,
    Fail { reason: String },
    Reset,
}

impl BurnEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BurnEvent::StartApproval => "startApproval",
            BurnEvent::ApprovalSubmitted { .. } => "approvalSubmitted",
            BurnEvent::ApprovalConfirmed => "approvalConfirmed",
            BurnEvent::StartBurn => "startBurn",
            BurnEvent::BurnSubmitted { .. } => "burnSubmitted",
            BurnEvent::BurnConfirmed => "burnConfirmed",
            BurnEvent::Fail { .. } => "fail",
            BurnEvent::Reset => "reset",
        }
    }
}

/// Lifecycle of a single burn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnLifecycle {
    state: BurnState,
}

impl Default for BurnLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl BurnLifecycle {
    pub fn new() -> Self {
        Self {
            state: BurnState::Idle,
        }
    }

    pub fn state(&self) -> &BurnState {
        &self.state
    }

    /// Apply an event, returning the new state.
    ///
    /// The state is left untouched when the transition is invalid.
    pub fn apply(&mut self, event: BurnEvent) -> Result<&BurnState, LifecycleError> {
        let next = match (&self.state, event) {
            (BurnState::Idle, BurnEvent::StartApproval) => BurnState::Approving,
            (BurnState::Approving, BurnEvent::ApprovalSubmitted { tx_hash }) => {
                BurnState::AwaitingApprovalConfirm { tx_hash }
            }
            (BurnState::AwaitingApprovalConfirm { .. }, BurnEvent::ApprovalConfirmed) => {
                BurnState::ReadyToBurn
            }
            (BurnState::ReadyToBurn, BurnEvent::StartBurn) => BurnState::Burning,
            (BurnState::Burning, BurnEvent::BurnSubmitted { tx_hash }) => {
                BurnState::AwaitingBurnConfirm { tx_hash }
            }
            (BurnState::AwaitingBurnConfirm { tx_hash }, BurnEvent::BurnConfirmed) => {
                BurnState::Done {
                    tx_hash: tx_hash.clone(),
                }
            }
            (state, BurnEvent::Fail { reason }) if !state.is_terminal() => {
                BurnState::Failed { reason }
            }
            (state, BurnEvent::Reset) if state.is_terminal() => BurnState::Idle,
            (state, event) => {
                return Err(LifecycleError::InvalidTransition {
                    from: state.name(),
                    event: event.name(),
                })
            }
        };

        self.state = next;
        Ok(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_done(lifecycle: &mut BurnLifecycle) {
        lifecycle.apply(BurnEvent::StartApproval).unwrap();
        lifecycle
            .apply(BurnEvent::ApprovalSubmitted {
                tx_hash: "0xapprove".to_string(),
            })
            .unwrap();
        lifecycle.apply(BurnEvent::ApprovalConfirmed).unwrap();
        lifecycle.apply(BurnEvent::StartBurn).unwrap();
        lifecycle
            .apply(BurnEvent::BurnSubmitted {
                tx_hash: "0xburn".to_string(),
            })
            .unwrap();
        lifecycle.apply(BurnEvent::BurnConfirmed).unwrap();
    }

    #[test]
    fn test_happy_path_reaches_done() {
        let mut lifecycle = BurnLifecycle::new();
        run_to_done(&mut lifecycle);
        assert_eq!(
            lifecycle.state(),
            &BurnState::Done {
                tx_hash: "0xburn".to_string()
            }
        );
        assert!(lifecycle.state().is_terminal());
    }

    #[test]
    fn test_cannot_burn_before_approval() {
        let mut lifecycle = BurnLifecycle::new();
        let err = lifecycle.apply(BurnEvent::StartBurn).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: "idle",
                event: "startBurn"
            }
        );
        assert_eq!(lifecycle.state(), &BurnState::Idle);
    }

    #[test]
    fn test_fail_from_any_active_state() {
        let mut lifecycle = BurnLifecycle::new();
        lifecycle.apply(BurnEvent::StartApproval).unwrap();
        lifecycle
            .apply(BurnEvent::ApprovalSubmitted {
                tx_hash: "0xapprove".to_string(),
            })
            .unwrap();
        lifecycle
            .apply(BurnEvent::Fail {
                reason: "approval reverted".to_string(),
            })
            .unwrap();
        assert_eq!(lifecycle.state().name(), "failed");
    }

    #[test]
    fn test_terminal_states_only_reset() {
        let mut lifecycle = BurnLifecycle::new();
        run_to_done(&mut lifecycle);

        assert!(lifecycle
            .apply(BurnEvent::Fail {
                reason: "late".to_string()
            })
            .is_err());

        lifecycle.apply(BurnEvent::Reset).unwrap();
        assert_eq!(lifecycle.state(), &BurnState::Idle);
    }

    #[test]
    fn test_reset_rejected_mid_flight() {
        let mut lifecycle = BurnLifecycle::new();
        lifecycle.apply(BurnEvent::StartApproval).unwrap();
        assert!(lifecycle.apply(BurnEvent::Reset).is_err());
    }

    #[test]
    fn test_busy_states() {
        assert!(!BurnState::Idle.is_busy());
        assert!(BurnState::Approving.is_busy());
        assert!(!BurnState::ReadyToBurn.is_busy());
        assert!(BurnState::Burning.is_busy());
    }

    #[test]
    fn test_state_serializes_as_tagged_data() {
        let state = BurnState::AwaitingBurnConfirm {
            tx_hash: "0xabc".to_string(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "awaitingBurnConfirm");
        assert_eq!(json["txHash"], "0xabc");
    }
}
