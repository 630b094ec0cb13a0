//! Running state carried from month to month during a projection

/// State of the business at a point in time during projection
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection month (1-indexed; 0 before the first advance)
    pub projection_month: u32,

    /// Month index (0-based) at which the demand ramp begins.
    /// Negative when the store opened before the model start.
    pub launch_offset: i64,

    /// Cash balance after the current month's net cash flow
    pub cumulative_cash: f64,

    /// Prior month's EBITDA, for the first difference
    pub prior_ebitda: Option<f64>,
}

impl ProjectionState {
    /// Initialize state at projection start
    pub fn new(initial_cash: f64, launch_offset: i64) -> Self {
        Self {
            projection_month: 0,
            launch_offset,
            cumulative_cash: initial_cash,
            prior_ebitda: None,
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.projection_month += 1;
    }

    /// 0-based index of the current month
    pub fn month_index(&self) -> usize {
        self.projection_month.saturating_sub(1) as usize
    }

    /// Months elapsed since launch, or `None` while still before launch
    pub fn months_since_launch(&self) -> Option<u32> {
        let elapsed = self.month_index() as i64 - self.launch_offset;
        if elapsed < 0 {
            None
        } else {
            Some(u32::try_from(elapsed).unwrap_or(u32::MAX))
        }
    }

    /// Book the month's net cash flow and return the new balance
    pub fn apply_cash_flow(&mut self, net_cash_flow: f64) -> f64 {
        self.cumulative_cash += net_cash_flow;
        self.cumulative_cash
    }

    /// Record this month's EBITDA and return the change from last month
    /// (0 in the first month)
    pub fn record_ebitda(&mut self, ebitda: f64) -> f64 {
        let delta = self.prior_ebitda.map_or(0.0, |prior| ebitda - prior);
        self.prior_ebitda = Some(ebitda);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_tracking() {
        let mut state = ProjectionState::new(1000.0, 2);
        state.advance_month();
        assert_eq!(state.months_since_launch(), None);
        state.advance_month();
        assert_eq!(state.months_since_launch(), None);
        state.advance_month();
        assert_eq!(state.month_index(), 2);
        assert_eq!(state.months_since_launch(), Some(0));
    }

    #[test]
    fn test_launch_before_model_start() {
        let mut state = ProjectionState::new(0.0, -3);
        state.advance_month();
        assert_eq!(state.months_since_launch(), Some(3));
    }

    #[test]
    fn test_cash_and_ebitda_tracking() {
        let mut state = ProjectionState::new(500.0, 0);
        assert_eq!(state.apply_cash_flow(-200.0), 300.0);
        assert_eq!(state.record_ebitda(50.0), 0.0);
        assert_eq!(state.record_ebitda(80.0), 30.0);
    }
}
