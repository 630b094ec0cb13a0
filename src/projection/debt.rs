//! Loan debt service: interest-only during construction, level payments after launch

/// Level monthly payment that retires `principal` over `term_months` at
/// `annual_rate / 12` per month.
///
/// The annuity denominator `1 - (1 + r)^-n` is evaluated as
/// `-expm1(-n * ln1p(r))`, which stays positive for rates far below f64
/// epsilon. A zero rate, or any rate where the annuity still has no finite
/// value, repays straight-line.
pub fn amortizing_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    let n = f64::from(term_months.max(1));
    let r = annual_rate / 12.0;
    let denominator = -(-n * r.ln_1p()).exp_m1();
    let payment = principal * r / denominator;
    if r > 0.0 && payment.is_finite() {
        payment
    } else {
        principal / n
    }
}

/// Monthly interest on the full principal
pub fn interest_only_payment(principal: f64, annual_rate: f64) -> f64 {
    if principal <= 0.0 {
        0.0
    } else {
        principal * annual_rate / 12.0
    }
}

/// Resolved loan terms for one projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate: f64,
    pub term_months: u32,
    /// Level payment once amortization starts
    pub payment: f64,
    /// Interest-only payment before launch
    pub interest_only: f64,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate: f64, term_years: u32) -> Self {
        let principal = principal.max(0.0);
        let annual_rate = annual_rate.max(0.0);
        let term_months = term_years.max(1) * 12;
        Self {
            principal,
            annual_rate,
            term_months,
            payment: amortizing_payment(principal, annual_rate, term_months),
            interest_only: interest_only_payment(principal, annual_rate),
        }
    }

    /// Payment due in a month, given months elapsed since launch
    /// (`None` while still before launch). Positive amount.
    pub fn payment_due(&self, months_since_launch: Option<u32>) -> f64 {
        if self.principal <= 0.0 {
            return 0.0;
        }
        match months_since_launch {
            None => self.interest_only,
            Some(k) if k < self.term_months => self.payment,
            // Loan retired
            Some(_) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_annuity() {
        // 100k over 10 years at 6%: textbook payment 1110.21
        let payment = amortizing_payment(100_000.0, 0.06, 120);
        assert_relative_eq!(payment, 1110.205, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let payment = amortizing_payment(240_000.0, 0.0, 240);
        assert_eq!(payment, 1000.0);
    }

    #[test]
    fn test_tiny_rate_stays_finite() {
        // r = 1e-16 per month: 1 - (1 + r)^-n rounds to exactly 0 in f64
        for annual_rate in [1.2e-15, 1e-16, 1e-300] {
            let payment = amortizing_payment(120_000.0, annual_rate, 120);
            assert!(payment.is_finite());
            assert_relative_eq!(payment, 1000.0, max_relative = 1e-9);
        }

        let loan = LoanTerms::new(120_000.0, 1e-16, 10);
        assert!(loan.payment.is_finite());
        assert!(loan.payment_due(Some(0)) > 0.0);
    }

    #[test]
    fn test_payment_schedule() {
        let loan = LoanTerms::new(120_000.0, 0.06, 1);
        assert_relative_eq!(loan.payment_due(None), 600.0, epsilon = 1e-9);
        assert_relative_eq!(loan.payment_due(Some(0)), loan.payment);
        assert_relative_eq!(loan.payment_due(Some(11)), loan.payment);
        assert_eq!(loan.payment_due(Some(12)), 0.0);
    }

    #[test]
    fn test_no_loan_no_payment() {
        let loan = LoanTerms::new(0.0, 0.08, 10);
        assert_eq!(loan.payment_due(None), 0.0);
        assert_eq!(loan.payment_due(Some(3)), 0.0);
    }

    #[test]
    fn test_zero_term_treated_as_one_year() {
        let loan = LoanTerms::new(12_000.0, 0.0, 0);
        assert_eq!(loan.term_months, 12);
        assert_eq!(loan.payment, 1000.0);
    }
}
