/// Estimated cost of drawing `power_w` watts for `period_minutes` minutes at
/// `price_per_kwh`, formatted with two decimals.
///
/// Returns `"0.00"` when any input is zero or not a finite number.
///
/// ```
/// assert_eq!(powersense_core::cost::estimate(120.0, 5.0, 9.0), "0.09");
/// assert_eq!(powersense_core::cost::estimate(0.0, 5.0, 9.0), "0.00");
/// ```
pub fn estimate(power_w: f64, period_minutes: f64, price_per_kwh: f64) -> String {
    let usable = |x: f64| x.is_finite() && x != 0.0;
    if !(usable(power_w) && usable(period_minutes) && usable(price_per_kwh)) {
        return "0.00".to_owned();
    }
    let kwh = (power_w / 1000.0) * (period_minutes / 60.0);
    format!("{:.2}", kwh * price_per_kwh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_estimate() {
        assert_eq!(estimate(120.0, 5.0, 9.0), "0.09");
        assert_eq!(estimate(2000.0, 30.0, 9.0), "9.00");
        assert_eq!(estimate(1500.0, 60.0, 7.5), "11.25");
    }

    #[test]
    fn any_zero_input_yields_zero() {
        assert_eq!(estimate(0.0, 5.0, 9.0), "0.00");
        assert_eq!(estimate(120.0, 0.0, 9.0), "0.00");
        assert_eq!(estimate(120.0, 5.0, 0.0), "0.00");
    }

    #[test]
    fn non_finite_inputs_yield_zero() {
        assert_eq!(estimate(f64::NAN, 5.0, 9.0), "0.00");
        assert_eq!(estimate(120.0, f64::INFINITY, 9.0), "0.00");
        assert_eq!(estimate(120.0, 5.0, f64::NEG_INFINITY), "0.00");
    }
}
