//! The order-processing pipeline: an ordered chain of stages over one
//! mutable [`ProcessingContext`].
//!
//! Stages are stateless; each receives the context, does its one step, and
//! reports whether the chain should continue. The standard chain is
//! prepare-condition → TIF-adjust → validate → execute → finalize.

mod context;

pub use context::ProcessingContext;

use crate::orders::OrderType;
use crate::strategies::{tif_strategy, type_strategy};
use tracing::trace;

/// One step of order processing.
pub trait Stage: Send + Sync {
    /// Execute this stage. Returning `false` stops the chain; stages that
    /// merely skip work on an aborted context return `true` so later stages
    /// (validation, finalize) still run.
    fn run(&self, ctx: &mut ProcessingContext<'_>) -> bool;
}

/// Ordered chain of stages sharing one context.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// An empty pipeline; processes trivially.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard order-processing chain.
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.push(Box::new(PrepareConditionStage));
        pipeline.push(Box::new(TifAdjustStage));
        pipeline.push(Box::new(ValidateStage));
        pipeline.push(Box::new(ExecuteStage));
        pipeline.push(Box::new(FinalizeStage));
        pipeline
    }

    /// Append a stage to the end of the chain.
    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Run all stages in order. Returns `false` if a stage stopped the chain.
    pub fn process(&self, ctx: &mut ProcessingContext<'_>) -> bool {
        for stage in &self.stages {
            if !stage.run(ctx) {
                return false;
            }
        }
        true
    }
}

/// Asks the order type's strategy for the base matching condition.
pub struct PrepareConditionStage;

impl Stage for PrepareConditionStage {
    fn run(&self, ctx: &mut ProcessingContext<'_>) -> bool {
        if ctx.aborted() {
            return true;
        }
        ctx.condition = type_strategy(ctx.order.order_type()).prepare_condition(ctx.order);
        true
    }
}

/// Lets the time-in-force strategy tighten the condition.
pub struct TifAdjustStage;

impl Stage for TifAdjustStage {
    fn run(&self, ctx: &mut ProcessingContext<'_>) -> bool {
        if ctx.aborted() {
            return true;
        }
        tif_strategy(ctx.order.time_in_force()).adjust_condition(&mut ctx.condition, ctx.order);
        true
    }
}

/// Structural checks on the prepared condition. Runs even on an aborted
/// context so every failure is recorded.
pub struct ValidateStage;

impl Stage for ValidateStage {
    fn run(&self, ctx: &mut ProcessingContext<'_>) -> bool {
        if ctx.condition.quantity == 0 {
            ctx.add_abort_reason("Invalid Quantity");
        }
        if ctx.order.order_type() == OrderType::Limit && ctx.order.price() <= 0 {
            ctx.add_abort_reason("Invalid limit price");
        }
        true
    }
}

/// Runs the actual match against the opposite-side tracker.
///
/// For all-or-nothing conditions the tracker is dry-run first; when the full
/// quantity cannot fill, no resting order is touched and the remainder stays
/// at the full quantity for the finalize stage to judge.
pub struct ExecuteStage;

impl Stage for ExecuteStage {
    fn run(&self, ctx: &mut ProcessingContext<'_>) -> bool {
        if ctx.aborted() {
            return true;
        }

        if ctx.condition.all_or_none {
            let available = ctx.opposite_tracker.available_quantity(&ctx.condition);
            if available < ctx.condition.quantity {
                trace!(
                    order_id = ctx.order.id(),
                    requested = ctx.condition.quantity,
                    available,
                    "all-or-none order not fully fillable, skipping match"
                );
                return true;
            }
        }

        let result = ctx.opposite_tracker.match_order(&mut ctx.condition);
        ctx.matches.merge(result);
        true
    }
}

/// Settles open quantity and status: TIF strategy first, then the type
/// strategy, which may override (market orders never stay pending).
pub struct FinalizeStage;

impl Stage for FinalizeStage {
    fn run(&self, ctx: &mut ProcessingContext<'_>) -> bool {
        let remaining = ctx.condition.quantity;
        tif_strategy(ctx.order.time_in_force()).finalize(ctx.order, remaining);
        type_strategy(ctx.order.order_type()).finalize(ctx.order);
        true
    }
}
