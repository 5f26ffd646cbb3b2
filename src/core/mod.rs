// Core library modules
pub mod attack;
pub mod candidates;
pub mod channel;
pub mod dictionary;
pub mod error;
pub mod oracle;
pub mod reporter;
pub mod user;

// Re-exports
pub use attack::{
    AttackConfig, AttackController, AttackOutcome, AttackState, AttackSummary, CancelToken,
};
pub use candidates::{candidates, CasingMode, CasingPermutations, Candidates};
pub use channel::{Conduit, Delivery, DEFAULT_FIFO_MODE};
pub use dictionary::Dictionary;
pub use error::{AttackError, Result};
pub use oracle::{check, locate_helper, verify_helper, ChkpwdOracle, Oracle, HELPER_NAME};
pub use reporter::{RecordingSink, Reporter, SilentSink, Stage, StageEnd, StageSink};
pub use user::current_username;
