//! Query abstraction consumed from the driver's retry hook.

/// CQL consistency level. Carried so the policy fits the driver's hook
/// contract; retry decisions never look at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consistency {
    Any,
    #[default]
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    Serial,
    LocalSerial,
    LocalOne,
}

/// A failed request as seen by the transport before it re-issues it.
pub trait RetryableQuery {
    /// Attempts already made by the transport for this request.
    fn attempts(&self) -> u32;
    fn consistency(&self) -> Consistency;
    fn set_consistency(&mut self, consistency: Consistency);
}
