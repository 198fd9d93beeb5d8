//! Ticket offers: synthesis of mock results and ranking for display.
//!
//! Both entry points are synchronous and hold no state. [`synthesize`]
//! builds the offers for a recorded search from an injected random source;
//! [`rank`] filters and orders them on every change of the user's
//! sort/filter selection.

mod ranker;
mod synthesizer;
mod types;

pub use ranker::{group_by_provider, rank, ProviderGroup};
pub use synthesizer::{synthesize, synthesize_with_policy, ModeProfile, SynthesisPolicy};
pub use types::{Mode, Offer, ParseModeError, RankCriteria, RouteKind, SortKey};
