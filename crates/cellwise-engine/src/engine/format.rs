/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        let s = format!("{:.6}", n);
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        // Too small for six places; show it in full rather than as zero.
        if trimmed == "0" || trimmed == "-0" {
            n.to_string()
        } else {
            trimmed.to_string()
        }
    }
}
