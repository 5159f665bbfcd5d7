//! Scheduling algorithm identifiers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifies which scheduling algorithm a session runs under.
///
/// The engine computes SM-2 itself; every other identifier is forwarded to
/// the remote scheduling service, which owns that algorithm's weights. When
/// the service is unreachable the local fallback always computes SM-2,
/// whatever the session was created with.
///
/// # Example
///
/// ```
/// use rote_core::types::AlgorithmId;
/// use std::str::FromStr;
///
/// assert_eq!(AlgorithmId::from_str("sm2").unwrap(), AlgorithmId::Sm2);
/// assert_eq!(AlgorithmId::Fsrs.to_string(), "fsrs");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlgorithmId {
    /// SM-2 interval scheduling. The default and the only local algorithm.
    #[default]
    Sm2,
    /// FSRS scheduling, computed by the remote service.
    Fsrs,
}
