//! The checkout state machine.
//!
//! One [`CheckoutSession`] covers the lifetime of a checkout attempt: it is
//! created from a non-empty cart's grand total, walks through payment
//! selection (and, for cash, tender entry and change computation), and ends
//! with [`CheckoutSession::finish`] emitting a [`SaleReceipt`]. The session
//! owns payment state only - the cart stays with the caller, which clears
//! it on receipt of the terminal event.
//!
//! The states make invalid combinations unrepresentable: change due exists
//! only once a tender has been entered, and a tender can only be entered
//! once cash has been selected.

use core::fmt;

use crate::types::Money;

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    /// Cash over the counter; requires a tendered amount and yields change.
    Cash,
    /// Twint mobile payment. Declared but disabled by the default policy.
    Twint,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "Cash"),
            Self::Twint => write!(f, "Twint"),
        }
    }
}

/// Which payment methods a host accepts.
///
/// Twint is disabled by default: the method exists as a first-class value so
/// the rejection is enforced here rather than by hiding a button in the
/// presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPolicy {
    disabled: Vec<PaymentMethod>,
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        Self {
            disabled: vec![PaymentMethod::Twint],
        }
    }
}

impl PaymentPolicy {
    /// A policy that accepts every declared method.
    #[must_use]
    pub const fn all_enabled() -> Self {
        Self { disabled: Vec::new() }
    }

    /// Mark a method as unavailable.
    #[must_use]
    pub fn disable(mut self, method: PaymentMethod) -> Self {
        if !self.disabled.contains(&method) {
            self.disabled.push(method);
        }
        self
    }

    /// Whether the policy accepts `method`.
    #[must_use]
    pub fn allows(&self, method: PaymentMethod) -> bool {
        !self.disabled.contains(&method)
    }
}

/// Errors that can occur while driving a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    /// The selected payment method is disabled by the host policy.
    #[error("payment method {0} is not available")]
    PaymentMethodUnavailable(PaymentMethod),

    /// The tendered amount does not parse as a non-negative decimal.
    #[error("not a valid tendered amount: {raw:?}")]
    InvalidAmount {
        /// The rejected input.
        raw: String,
    },

    /// The attempted transition needs a resolved payment method first.
    #[error("checkout is incomplete: no payment method has been resolved")]
    IncompleteCheckout,

    /// The sale has already been finished; reset before starting another.
    #[error("sale has already been finished")]
    AlreadyFinished,
}

/// Cash handed over by the customer and the change owed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashTender {
    /// Amount the customer handed over.
    pub tendered: Money,
    /// `tendered - total`, rounded to two decimal places. Negative when
    /// undertendered; rejecting that is the caller's policy decision.
    pub change_due: Money,
}

/// Observable checkout state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// No payment method chosen yet.
    AwaitingPayment,
    /// Cash selected; waiting for the tendered amount.
    AwaitingTender,
    /// A method is resolved; the sale can be finished.
    Settled,
    /// The terminal event has been emitted.
    Finished,
}

#[derive(Clone, Copy)]
enum State {
    AwaitingPayment,
    AwaitingTender,
    Settled {
        method: PaymentMethod,
        tender: Option<CashTender>,
    },
    Finished,
}

/// One checkout attempt, from cart non-empty to sale finished.
pub struct CheckoutSession {
    total: Money,
    policy: PaymentPolicy,
    state: State,
}

impl CheckoutSession {
    /// Open a session for a cart totalling `total`, with the default
    /// payment policy (Twint disabled).
    #[must_use]
    pub fn new(total: Money) -> Self {
        Self::with_policy(total, PaymentPolicy::default())
    }

    /// Open a session with an explicit payment policy.
    #[must_use]
    pub const fn with_policy(total: Money, policy: PaymentPolicy) -> Self {
        Self {
            total,
            policy,
            state: State::AwaitingPayment,
        }
    }

    /// The grand total this session was opened with.
    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    /// Current state of the session.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        match self.state {
            State::AwaitingPayment => CheckoutState::AwaitingPayment,
            State::AwaitingTender => CheckoutState::AwaitingTender,
            State::Settled { .. } => CheckoutState::Settled,
            State::Finished => CheckoutState::Finished,
        }
    }

    /// The chosen payment method, if any.
    #[must_use]
    pub const fn payment_method(&self) -> Option<PaymentMethod> {
        match self.state {
            State::AwaitingPayment | State::Finished => None,
            State::AwaitingTender => Some(PaymentMethod::Cash),
            State::Settled { method, .. } => Some(method),
        }
    }

    /// The entered cash tender, if any.
    #[must_use]
    pub const fn tender(&self) -> Option<CashTender> {
        match self.state {
            State::Settled { tender, .. } => tender,
            _ => None,
        }
    }

    /// The amount the customer handed over, if entered.
    #[must_use]
    pub fn tendered(&self) -> Option<Money> {
        self.tender().map(|t| t.tendered)
    }

    /// The change owed back, if a tender has been entered.
    #[must_use]
    pub fn change_due(&self) -> Option<Money> {
        self.tender().map(|t| t.change_due)
    }

    /// Whether the entered tender falls short of the total.
    #[must_use]
    pub fn is_undertendered(&self) -> bool {
        self.change_due().is_some_and(|change| change.is_negative())
    }

    /// Choose how the customer pays.
    ///
    /// `Cash` opens the tender-entry step; any other enabled method settles
    /// the session directly, with no tender step. Selecting again before
    /// [`finish`](Self::finish) replaces the earlier choice and discards
    /// any entered tender.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::PaymentMethodUnavailable`] if the policy disables
    /// `method` (state unchanged), [`CheckoutError::AlreadyFinished`] after
    /// the terminal transition.
    pub fn select_payment(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        if matches!(self.state, State::Finished) {
            return Err(CheckoutError::AlreadyFinished);
        }
        if !self.policy.allows(method) {
            return Err(CheckoutError::PaymentMethodUnavailable(method));
        }
        self.state = match method {
            PaymentMethod::Cash => State::AwaitingTender,
            other => State::Settled {
                method: other,
                tender: None,
            },
        };
        Ok(())
    }

    /// Enter the cash amount the customer handed over.
    ///
    /// Parses `raw` as a non-negative decimal and computes
    /// `change_due = round2(tendered - total)`. Undertender is not rejected
    /// here: the change is simply negative and the caller decides whether
    /// to accept it. Re-entering a tender before the sale finishes replaces
    /// the previous one.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidAmount`] if `raw` is not a non-negative
    /// decimal (state unchanged), [`CheckoutError::IncompleteCheckout`] if
    /// cash is not the pending method, [`CheckoutError::AlreadyFinished`]
    /// after the terminal transition.
    pub fn enter_tendered_amount(&mut self, raw: &str) -> Result<CashTender, CheckoutError> {
        match self.state {
            State::Finished => return Err(CheckoutError::AlreadyFinished),
            State::AwaitingTender
            | State::Settled {
                method: PaymentMethod::Cash,
                ..
            } => {}
            _ => return Err(CheckoutError::IncompleteCheckout),
        }

        let tendered = Money::parse(raw).map_err(|_| CheckoutError::InvalidAmount {
            raw: raw.to_owned(),
        })?;
        let tender = CashTender {
            tendered,
            change_due: tendered - self.total,
        };
        self.state = State::Settled {
            method: PaymentMethod::Cash,
            tender: Some(tender),
        };
        Ok(tender)
    }

    /// Finish the sale and emit the terminal event.
    ///
    /// Valid once a payment method is resolved: tender entered for cash, or
    /// the direct path for methods without a tender step. The caller clears
    /// the cart on receipt of the returned [`SaleReceipt`]; the session
    /// itself never owned it.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::IncompleteCheckout`] before a method is resolved,
    /// [`CheckoutError::AlreadyFinished`] on a second call without an
    /// intervening reset - duplicate completion is an error, not a no-op.
    pub fn finish(&mut self) -> Result<SaleReceipt, CheckoutError> {
        match self.state {
            State::Finished => Err(CheckoutError::AlreadyFinished),
            State::AwaitingPayment | State::AwaitingTender => {
                Err(CheckoutError::IncompleteCheckout)
            }
            State::Settled { method, tender } => {
                self.state = State::Finished;
                Ok(SaleReceipt {
                    method,
                    total: self.total,
                    tender,
                })
            }
        }
    }
}

/// The terminal event of a finished sale.
///
/// Consumed by the surrounding shell, which clears the cart and returns to
/// the catalog view. Deliberately not persisted anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleReceipt {
    /// How the customer paid.
    pub method: PaymentMethod,
    /// The grand total of the sale.
    pub total: Money,
    /// Cash tender and change, for cash sales.
    pub tender: Option<CashTender>,
}
