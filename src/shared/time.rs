use std::fmt::Display;

/// Seconds since the start of the service day.
/// Values past `24:00:00` are valid for trips running after midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(u32);

impl From<u32> for Time {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Time {
    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub fn to_hms_string(&self) -> String {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        format!("{:02}:{:02}:{:02}", h, m, s)
    }

    pub fn from_hms(time: &str) -> Option<Self> {
        const HOUR_TO_SEC: u32 = 60 * 60;
        const MINUTE_TO_SEC: u32 = 60;
        let mut split = time.trim().split(':');
        let hours: u32 = split.next()?.parse().ok()?;
        let minutes: u32 = split.next()?.parse().ok()?;
        let seconds: u32 = split.next()?.parse().ok()?;
        if split.next().is_some() || minutes >= 60 || seconds >= 60 {
            return None;
        }
        hours
            .checked_mul(HOUR_TO_SEC)?
            .checked_add(minutes * MINUTE_TO_SEC + seconds)
            .map(Self)
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hms_string())
    }
}

#[test]
fn parse_unparse_1() {
    let time = "00:00:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_2() {
    let time = "12:30:30";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn past_midnight_is_kept() {
    let time = Time::from_hms("25:10:00").unwrap();
    assert_eq!(time.as_seconds(), 25 * 3600 + 600);
    assert_eq!(time.to_string(), "25:10:00");
}

#[test]
fn single_digit_hour() {
    assert_eq!(Time::from_hms("7:05:00").unwrap().as_seconds(), 7 * 3600 + 300);
}

#[test]
fn invalid_time_test_1() {
    assert!(Time::from_hms("00:00:0a").is_none())
}

#[test]
fn invalid_time_test_2() {
    assert!(Time::from_hms("00:00").is_none())
}

#[test]
fn hours_overflowing_seconds_are_rejected() {
    assert!(Time::from_hms("2000000:00:00").is_none());
    assert!(Time::from_hms("1193046:28:15").is_some());
    assert!(Time::from_hms("1193046:28:16").is_none());
}

#[test]
fn invalid_time_test_3() {
    assert!(Time::from_hms("00:61:00").is_none());
    assert!(Time::from_hms("00:00:00:00").is_none());
}
