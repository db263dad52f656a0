//! Unit conversions used by the card.

/// Standard affine conversion, °C → °F.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// "12.3 °C / 54.1 °F"
pub fn format_dual_temperature(celsius: f64) -> String {
    format!(
        "{:.1} °C / {:.1} °F",
        celsius,
        celsius_to_fahrenheit(celsius)
    )
}
