//! Mutable state shared by the pipeline stages while one order is processed.

use crate::book::tracker::{Condition, OrderTracker};
use crate::book::trade::MatchResult;
use crate::orders::Order;

/// Everything a stage may need while validating and executing one order.
///
/// The context borrows the incoming order and the opposite-side tracker for
/// the duration of the pipeline run; both live on the owning worker's stack,
/// so sharing is plain mutable borrowing within one thread.
///
/// Abortion state is the presence of `abort_reason`: no separate flag, the
/// reason string is the single source of truth.
pub struct ProcessingContext<'a> {
    /// The incoming order; stages mutate its quantity and status.
    pub order: &'a mut Order,
    /// The tracker the order trades against.
    pub opposite_tracker: &'a mut OrderTracker,
    /// Matching condition; prepared from the order type, tightened by TIF.
    pub condition: Condition,
    /// Populated when a stage aborts the run.
    pub abort_reason: Option<String>,
    /// Executions accumulated by the execute stage.
    pub matches: MatchResult,
}

impl<'a> ProcessingContext<'a> {
    /// Build a context with a default (empty) condition.
    pub fn new(order: &'a mut Order, opposite_tracker: &'a mut OrderTracker) -> Self {
        Self {
            order,
            opposite_tracker,
            condition: Condition::default(),
            abort_reason: None,
            matches: MatchResult::default(),
        }
    }

    /// True once any stage recorded an abort reason.
    #[inline]
    pub fn aborted(&self) -> bool {
        self.abort_reason.is_some()
    }

    /// Record an abort reason, appending with a comma when one exists.
    pub fn add_abort_reason(&mut self, reason: impl Into<String>) {
        match &mut self.abort_reason {
            Some(existing) => {
                existing.push(',');
                existing.push_str(&reason.into());
            }
            None => self.abort_reason = Some(reason.into()),
        }
    }
}
