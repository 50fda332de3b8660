//! Client payment flow as an explicit state machine.
//!
//! Generation is attempted first. A 402 from the server is what opens
//! checkout; there is no separate authorization step. After the gateway
//! reports success and the server verifies the payment, the original
//! generation is retried. Only a successful generation moves the flow into
//! `Verified`, so the client never grants itself access.

use thiserror::Error;

use crate::models::package::PackageType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentApproval {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    NoPackageSelected,
    PackageSelected {
        package: PackageType,
    },
    CheckoutOpen {
        package: PackageType,
        order_id: String,
    },
    PaymentPending {
        package: PackageType,
        approval: PaymentApproval,
    },
    /// Paid in this session and confirmed by a successful generation.
    Verified {
        package: PackageType,
        remaining_credits: i64,
    },
    /// A generation succeeded without checkout: the identifier paid earlier.
    RestoredAccess {
        remaining_credits: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    SelectPackage(PackageType),
    /// Server answered 402 to a generation attempt.
    PaymentRequired,
    OrderCreated { order_id: String },
    CheckoutDismissed,
    /// Gateway widget success callback.
    GatewayApproved(PaymentApproval),
    VerificationFailed,
    GenerationSucceeded { remaining_credits: i64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("select a package before checkout")]
    NoPackage,

    #[error("event {event:?} is not valid in state {state:?}")]
    InvalidTransition {
        state: CheckoutState,
        event: CheckoutEvent,
    },
}

impl CheckoutState {
    pub fn package(&self) -> Option<PackageType> {
        match self {
            CheckoutState::PackageSelected { package }
            | CheckoutState::CheckoutOpen { package, .. }
            | CheckoutState::PaymentPending { package, .. }
            | CheckoutState::Verified { package, .. } => Some(*package),
            CheckoutState::NoPackageSelected | CheckoutState::RestoredAccess { .. } => None,
        }
    }

    pub fn has_access(&self) -> bool {
        matches!(
            self,
            CheckoutState::Verified { .. } | CheckoutState::RestoredAccess { .. }
        )
    }

    /// Applies `event`, returning the next state. `self` is left untouched on error.
    pub fn next(&self, event: CheckoutEvent) -> Result<CheckoutState, FlowError> {
        use CheckoutEvent as E;
        use CheckoutState as S;

        let next = match (self, &event) {
            (S::PaymentPending { .. }, E::SelectPackage(_)) => None,
            (_, E::SelectPackage(package)) => Some(S::PackageSelected { package: *package }),

            (S::NoPackageSelected, E::PaymentRequired) => return Err(FlowError::NoPackage),
            (S::PackageSelected { package }, E::PaymentRequired) => {
                Some(S::PackageSelected { package: *package })
            }
            // Credits ran out: start over with the same package preselected.
            (S::Verified { package, .. }, E::PaymentRequired) => {
                Some(S::PackageSelected { package: *package })
            }
            (S::RestoredAccess { .. }, E::PaymentRequired) => Some(S::NoPackageSelected),
            // Verification passed but the retry still needs payment.
            (S::PaymentPending { package, .. }, E::PaymentRequired) => {
                Some(S::PackageSelected { package: *package })
            }

            (S::PackageSelected { package }, E::OrderCreated { order_id }) => {
                Some(S::CheckoutOpen {
                    package: *package,
                    order_id: order_id.clone(),
                })
            }
            (S::CheckoutOpen { package, .. }, E::CheckoutDismissed) => {
                Some(S::PackageSelected { package: *package })
            }
            (S::CheckoutOpen { package, order_id }, E::GatewayApproved(approval))
                if approval.order_id == *order_id =>
            {
                Some(S::PaymentPending {
                    package: *package,
                    approval: approval.clone(),
                })
            }
            (S::PaymentPending { package, .. }, E::VerificationFailed) => {
                Some(S::PackageSelected { package: *package })
            }

            (
                S::PaymentPending { package, .. } | S::Verified { package, .. },
                E::GenerationSucceeded { remaining_credits },
            ) => Some(S::Verified {
                package: *package,
                remaining_credits: *remaining_credits,
            }),
            (
                S::NoPackageSelected | S::PackageSelected { .. } | S::RestoredAccess { .. },
                E::GenerationSucceeded { remaining_credits },
            ) => Some(S::RestoredAccess {
                remaining_credits: *remaining_credits,
            }),

            _ => None,
        };

        next.ok_or_else(|| FlowError::InvalidTransition {
            state: self.clone(),
            event,
        })
    }
}

/// Mutable holder for the current state.
#[derive(Debug, Clone, Default)]
pub struct CheckoutFlow {
    state: CheckoutState,
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn apply(&mut self, event: CheckoutEvent) -> Result<&CheckoutState, FlowError> {
        self.state = self.state.next(event)?;
        Ok(&self.state)
    }
}
