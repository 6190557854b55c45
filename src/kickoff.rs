use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

pub fn parse_kickoff(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .ok()?;
    Some(date.and_time(time))
}

/// "Fri 22 Mar 21:00", or the raw parts when they do not parse.
pub fn format_kickoff(date: &str, time: &str) -> String {
    match parse_kickoff(date, time) {
        Some(dt) => dt.format("%a %-d %b %H:%M").to_string(),
        None if date.is_empty() && time.is_empty() => "TBD".to_string(),
        None => format!("{} {}", date.trim(), time.trim()).trim().to_string(),
    }
}

/// True once kickoff is `window` or less away, including after kickoff.
pub fn within_reveal_window(kickoff: NaiveDateTime, now: NaiveDateTime, window: Duration) -> bool {
    kickoff - now <= window
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn formats_known_kickoff() {
        assert_eq!(format_kickoff("2024-03-22", "21:00"), "Fri 22 Mar 21:00");
        assert_eq!(format_kickoff("soon", "21:00"), "soon 21:00");
        assert_eq!(format_kickoff("", ""), "TBD");
    }

    #[test]
    fn reveal_window_edges() {
        let kickoff = at("2024-03-22 21:00");
        let window = Duration::minutes(5);
        assert!(!within_reveal_window(kickoff, at("2024-03-22 20:54"), window));
        assert!(within_reveal_window(kickoff, at("2024-03-22 20:55"), window));
        assert!(within_reveal_window(kickoff, at("2024-03-22 21:30"), window));
    }
}
