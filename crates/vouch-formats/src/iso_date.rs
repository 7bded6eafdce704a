//! # ISO 8601 Date Recognizer
//!
//! Accepts calendar (`2013-06-07`), week (`2013-W23-1`) and ordinal
//! (`2013-184`) dates with an optional time, fraction, seconds and zone:
//!
//! ```text
//! [±YY]YYYY[[-]date-body[(T|space)time[fraction][seconds[fraction]][zone]]]
//! ```
//!
//! The grammar needs backreferences (the date separator is reused between
//! month and day, the time separator between minutes and seconds) and
//! lookaheads, so it is recognized by a small backtracking scanner rather
//! than a compiled regex. Every piece returns the set of positions where it
//! can end; the value is valid when some path ends exactly at its length.

use crate::charset::is_word_char;
use crate::whitespace::is_whitespace;

/// Separator captured by the hours/minutes group, reused before seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeSeparator {
    /// The minutes group did not take part; seconds need no separator.
    Unset,
    /// Minutes followed the hour directly.
    Empty,
    /// Minutes followed a colon.
    Colon,
}

struct Scanner {
    chars: Vec<char>,
}

impl Scanner {
    fn at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn is(&self, pos: usize, ch: char) -> bool {
        self.at(pos) == Some(ch)
    }

    fn digit(&self, pos: usize) -> Option<u32> {
        self.at(pos).and_then(|c| c.to_digit(10))
    }

    fn digits(&self, pos: usize, count: usize) -> bool {
        (pos..pos + count).all(|p| self.digit(p).is_some())
    }

    /// Two digits at `pos` forming a value in `range`.
    fn pair_in(&self, pos: usize, range: std::ops::RangeInclusive<u32>) -> bool {
        match (self.digit(pos), self.digit(pos + 1)) {
            (Some(tens), Some(units)) => range.contains(&(tens * 10 + units)),
            _ => false,
        }
    }

    /// End positions of `[.,]\d+` starting at `pos`, one per digit count.
    fn fraction_ends(&self, pos: usize) -> Vec<usize> {
        if !matches!(self.at(pos), Some('.' | ',')) {
            return Vec::new();
        }
        let mut ends = Vec::new();
        let mut end = pos + 1;
        while self.digit(end).is_some() {
            end += 1;
            ends.push(end);
        }
        ends
    }

    fn matches(&self) -> bool {
        let mut starts = vec![0];
        if matches!(self.at(0), Some('-' | '+')) && self.digits(1, 2) {
            starts.push(3);
        }
        starts.into_iter().any(|start| self.after_sign(start))
    }

    fn after_sign(&self, start: usize) -> bool {
        if !self.digits(start, 4) {
            return false;
        }
        let year_end = start + 4;
        // A year must not be the first four digits of a six digit run.
        if self.digits(year_end, 2) && !self.at(year_end + 2).is_some_and(is_word_char) {
            return false;
        }
        year_end == self.len() || self.date(year_end)
    }

    fn date(&self, pos: usize) -> bool {
        let mut separators = vec![(pos, false)];
        if self.is(pos, '-') {
            separators.push((pos + 1, true));
        }
        separators.into_iter().any(|(body, dashed)| {
            self.date_body_ends(body, dashed)
                .into_iter()
                .filter(|end| !self.bare_time_marker(*end))
                .any(|end| end == self.len() || self.time(end))
        })
    }

    fn date_body_ends(&self, pos: usize, dashed: bool) -> Vec<usize> {
        let mut ends = Vec::new();

        if self.pair_in(pos, 1..=12) {
            let month_end = pos + 2;
            ends.push(month_end);
            let day = if dashed {
                self.is(month_end, '-').then_some(month_end + 1)
            } else {
                Some(month_end)
            };
            if let Some(day) = day {
                if self.pair_in(day, 1..=31) {
                    ends.push(day + 2);
                }
            }
        }

        if self.is(pos, 'W') && self.pair_in(pos + 1, 0..=52) {
            let week_end = pos + 3;
            ends.push(week_end);
            if self.is(week_end, '-') && self.weekday(week_end + 1) {
                ends.push(week_end + 2);
            }
            if self.weekday(week_end) {
                ends.push(week_end + 1);
            }
        }

        if self.ordinal(pos) {
            ends.push(pos + 3);
        }
        ends
    }

    fn weekday(&self, pos: usize) -> bool {
        matches!(self.digit(pos), Some(1..=7))
    }

    fn ordinal(&self, pos: usize) -> bool {
        if !self.digits(pos, 3) {
            return false;
        }
        let day = (pos..pos + 3).fold(0, |acc, p| acc * 10 + self.digit(p).unwrap_or(0));
        // Day 360 is not accepted.
        (1..=359).contains(&day) || (361..=366).contains(&day)
    }

    /// `T` alone, or `T` followed only by digits and a final `Z`.
    fn bare_time_marker(&self, pos: usize) -> bool {
        if !self.is(pos, 'T') {
            return false;
        }
        let rest = &self.chars[pos + 1..];
        if rest.is_empty() {
            return true;
        }
        match rest.split_last() {
            Some(('Z', digits)) => !digits.is_empty() && digits.iter().all(char::is_ascii_digit),
            _ => false,
        }
    }

    fn time(&self, pos: usize) -> bool {
        match self.at(pos) {
            Some(c) if c == 'T' || is_whitespace(c) => {}
            _ => return false,
        }
        let start = pos + 1;
        let mut clock = Vec::new();
        if self.pair_in(start, 0..=23) {
            let hour_end = start + 2;
            clock.push((hour_end, TimeSeparator::Unset));
            if self.is(hour_end, ':') && self.pair_in(hour_end + 1, 0..=59) {
                clock.push((hour_end + 3, TimeSeparator::Colon));
            }
            if self.pair_in(hour_end, 0..=59) {
                clock.push((hour_end + 2, TimeSeparator::Empty));
            }
        }
        if self.is(start, '2') && self.is(start + 1, '4') {
            let zeros = if self.is(start + 2, ':') { start + 3 } else { start + 2 };
            if self.is(zeros, '0') && self.is(zeros + 1, '0') {
                clock.push((zeros + 2, TimeSeparator::Unset));
            }
        }

        clock.into_iter().any(|(end, separator)| {
            let mut after_fraction = vec![end];
            after_fraction.extend(
                self.fraction_ends(end)
                    .into_iter()
                    .filter(|f| !self.is(*f, ':')),
            );
            after_fraction
                .into_iter()
                .flat_map(|f| self.seconds_ends(f, separator))
                .any(|s| self.zone_ends(s).contains(&self.len()))
        })
    }

    fn seconds_ends(&self, pos: usize, separator: TimeSeparator) -> Vec<usize> {
        let mut ends = vec![pos];
        let digits_at = match separator {
            TimeSeparator::Colon if self.is(pos, ':') => Some(pos + 1),
            TimeSeparator::Colon => None,
            TimeSeparator::Unset | TimeSeparator::Empty => Some(pos),
        };
        if let Some(digits_at) = digits_at {
            if self.pair_in(digits_at, 0..=59) {
                let end = digits_at + 2;
                ends.push(end);
                ends.extend(self.fraction_ends(end));
            }
        }
        ends
    }

    fn zone_ends(&self, pos: usize) -> Vec<usize> {
        let mut ends = vec![pos];
        match self.at(pos) {
            Some('Z') => ends.push(pos + 1),
            Some('+' | '-') if self.pair_in(pos + 1, 0..=23) => {
                let hour_end = pos + 3;
                ends.push(hour_end);
                if self.is(hour_end, ':') && self.pair_in(hour_end + 1, 0..=59) {
                    ends.push(hour_end + 3);
                }
                if self.pair_in(hour_end, 0..=59) {
                    ends.push(hour_end + 2);
                }
            }
            _ => {}
        }
        ends
    }
}

/// True when `value` is an ISO 8601 date or date-time.
pub fn is_iso_date(value: &str) -> bool {
    Scanner {
        chars: value.chars().collect(),
    }
    .matches()
}
