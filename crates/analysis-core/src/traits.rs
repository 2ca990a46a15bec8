use crate::{FinancialSnapshot, RawSnapshot};

/// Maps one provider's raw ratio payload into the canonical snapshot.
///
/// Implementations hold all the field-name matching and scale handling so
/// that scoring engines only ever see `FinancialSnapshot`.
pub trait SnapshotAdapter: Send + Sync {
    /// Provider name, for logs.
    fn provider(&self) -> &str;

    fn normalize(&self, raw: &RawSnapshot) -> FinancialSnapshot;
}
