use regex::Regex;
use std::sync::LazyLock;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    // Seconds are accepted and dropped.
    Regex::new(r"^P(?:(\d+)D)?T(?:(\d+)H)?(?:(\d+)M)?(?:\d+(?:\.\d+)?S)?$").expect("duration pattern is valid")
});

/// Hours and minutes of a provider duration token such as `PT10H30M`.
/// Days (`P1DT2H`) are folded into hours.
pub fn parse_hours_minutes(token: &str) -> Option<(u32, u32)> {
    let token = token.trim().to_ascii_uppercase();
    let caps = ISO_DURATION.captures(&token)?;
    if caps.get(2).is_none() && caps.get(3).is_none() {
        return None;
    }

    let part = |i: usize| -> Option<u32> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let days = part(1)?;
    let hours = part(2)?;
    let minutes = part(3)?;

    let hours = days.checked_mul(24)?.checked_add(hours)?;
    let hours = hours.checked_add(minutes / 60)?;
    Some((hours, minutes % 60))
}

/// Total minutes, used as the sort key for `fastest`.
pub fn parse_minutes(token: &str) -> Option<u32> {
    let (hours, minutes) = parse_hours_minutes(token)?;
    hours.checked_mul(60)?.checked_add(minutes)
}

/// `<H>h <M>m`; an unreadable token is shown lower-cased without its `PT`.
pub fn render(token: &str) -> String {
    match parse_hours_minutes(token) {
        Some((hours, minutes)) => format!("{}h {}m", hours, minutes),
        None => {
            let token = token.trim();
            token.strip_prefix("PT").unwrap_or(token).to_lowercase()
        }
    }
}
