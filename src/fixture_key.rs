use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Field order drives the derived `Ord`: date first, then the sorted team pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FixtureKey {
    pub date: NaiveDate,
    pub first: String,
    pub second: String,
}

impl FixtureKey {
    pub fn new(date: NaiveDate, team: &str, opponent: &str) -> Self {
        let (first, second) = if team <= opponent {
            (team, opponent)
        } else {
            (opponent, team)
        };
        Self {
            date,
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

impl fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.date.format("%Y-%m-%d"),
            self.first,
            self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::FixtureKey;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 5, d).unwrap()
    }

    #[test]
    fn key_is_symmetric_in_team_order() {
        let a = FixtureKey::new(day(1), "Lazio", "Bayern");
        let b = FixtureKey::new(day(1), "Bayern", "Lazio");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "2021-05-01_Bayern_Lazio");
    }

    #[test]
    fn keys_order_by_date_before_names() {
        let early = FixtureKey::new(day(1), "Zwickau", "Wolfsburg");
        let late = FixtureKey::new(day(2), "Augsburg", "Bochum");
        assert!(early < late);
    }
}
