/// An upstream endpoint with an externally managed request budget.
///
/// The dispatcher only ever asks two things of a proxy: where to send the
/// request, and whether one more request may go out right now.
pub trait ProxyEndpoint: Send + Sync {
    /// Name used in logs and metrics.
    fn name(&self) -> &str;

    /// Base address requests routed through this proxy should use.
    fn base_url(&self) -> &str;

    /// Atomically check for and consume one unit of capacity.
    ///
    /// Must not block. Returns `false` when no capacity is available.
    fn try_acquire_capacity(&self) -> bool;
}
