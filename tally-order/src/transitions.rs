use tally_core::{OrderError, OrderStatus};

/// Which status changes `change_status` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any status may be set from any status.
    #[default]
    Unrestricted,
    /// Only the forward moves of the purchase lifecycle.
    Strict,
}

impl TransitionPolicy {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Unrestricted
        }
    }

    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Unrestricted => true,
            TransitionPolicy::Strict => matches!(
                (from, to),
                (OrderStatus::Pending, OrderStatus::Paid)
                    | (OrderStatus::Pending, OrderStatus::Cancelled)
                    | (OrderStatus::Paid, OrderStatus::Delivered)
                    | (OrderStatus::Paid, OrderStatus::Cancelled)
            ),
        }
    }

    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidInput(format!(
                "Invalid state transition from {} to {}",
                from, to
            )))
        }
    }
}
