use std::str::FromStr;

use crate::error::ConversionError;

/// What happens to a task after its dependency gate failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockedPolicy {
    /// The task stays on the blocked list and is never placed.
    Drop,

    /// Every scheduling pass starts by moving all blocked tasks back into the pending queue.
    RequeueNextPass,

    /// A blocked task returns to the pending queue as soon as its last open dependency completes.
    #[default]
    OnDependencyCompletion,
}

impl FromStr for BlockedPolicy {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Drop" => Ok(BlockedPolicy::Drop),
            "RequeueNextPass" => Ok(BlockedPolicy::RequeueNextPass),
            "OnDependencyCompletion" => Ok(BlockedPolicy::OnDependencyCompletion),
            _ => Err(ConversionError::UnknownBlockedPolicy(s.to_string())),
        }
    }
}
