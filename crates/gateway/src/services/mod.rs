//! Order-and-payment orchestration services.
//!
//! Data flow: [`locator`] resolves product references, [`order`] builds and
//! submits orders, [`signing`] routes the resulting serialized transaction
//! through signing and the passkey-approval relay, and the webhook layer
//! reconciles settlement events against [`session`] state, notifying users
//! through [`notifier`].

pub mod locator;
pub mod notifier;
pub mod order;
pub mod session;
pub mod signing;

pub use notifier::{InlineAction, LogNotifier, Notifier, NotifyError, OutboundMessage};
pub use order::{
    OrderBuildError, OrderBuilder, OrderError, OrderOutcome, PreparedOrder, SubmissionEngine,
};
pub use session::{InMemorySessionStore, SessionStore, WalletSession};
pub use signing::{
    ApprovalOutcome, ApprovalRelay, ApprovalState, ApprovalSubmission, PendingApproval,
    SigningCoordinator, SigningResult,
};
