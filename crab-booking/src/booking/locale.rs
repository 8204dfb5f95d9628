//! Display locale for day names and human-readable dates

use chrono::{Datelike, NaiveDate, Weekday};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayLocale {
    #[default]
    Fr,
    En,
}

impl FromStr for DisplayLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fr" | "fr-fr" => Ok(Self::Fr),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

impl DisplayLocale {
    pub fn day_name(&self, weekday: Weekday) -> &'static str {
        match (self, weekday) {
            (Self::Fr, Weekday::Mon) => "Lundi",
            (Self::Fr, Weekday::Tue) => "Mardi",
            (Self::Fr, Weekday::Wed) => "Mercredi",
            (Self::Fr, Weekday::Thu) => "Jeudi",
            (Self::Fr, Weekday::Fri) => "Vendredi",
            (Self::Fr, Weekday::Sat) => "Samedi",
            (Self::Fr, Weekday::Sun) => "Dimanche",
            (Self::En, Weekday::Mon) => "Monday",
            (Self::En, Weekday::Tue) => "Tuesday",
            (Self::En, Weekday::Wed) => "Wednesday",
            (Self::En, Weekday::Thu) => "Thursday",
            (Self::En, Weekday::Fri) => "Friday",
            (Self::En, Weekday::Sat) => "Saturday",
            (Self::En, Weekday::Sun) => "Sunday",
        }
    }

    fn month_name(&self, month: u32) -> &'static str {
        const FR: [&str; 12] = [
            "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
            "septembre", "octobre", "novembre", "décembre",
        ];
        const EN: [&str; 12] = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Self::Fr => FR[idx],
            Self::En => EN[idx],
        }
    }

    /// `DD/MM/YYYY`
    pub fn display_date(&self, date: NaiveDate) -> String {
        date.format("%d/%m/%Y").to_string()
    }

    /// Long form used in confirmation emails
    pub fn long_date(&self, date: NaiveDate) -> String {
        let day = self.day_name(date.weekday());
        let month = self.month_name(date.month());
        match self {
            Self::Fr => format!(
                "{} {} {} {}",
                day.to_lowercase(),
                date.day(),
                month,
                date.year()
            ),
            Self::En => format!("{}, {} {}, {}", day, month, date.day(), date.year()),
        }
    }
}
