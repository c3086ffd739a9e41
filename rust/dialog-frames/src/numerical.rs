//! Numerical and temporal expression normalization.
//!
//! A normalizer turns expressions like "12 May 1998" or "3 years" into
//! frame elements (`Time`, `Duration`) with normalized literal values. It
//! runs independently of entity assignment and its output is merged into
//! the labeling afterwards.

use regex::Regex;

use crate::entity::NumericalElement;
use crate::error::LabelError;

/// Tag for points in time.
pub const TIME: &str = "Time";
/// Tag for spans of time.
pub const DURATION: &str = "Duration";

/// Extracts numerical frame elements from raw sentence text.
pub trait NumericalNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> Result<Vec<NumericalElement>, LabelError>;
}

/// A normalizer that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNormalizer;

impl NumericalNormalizer for NoNormalizer {
    fn normalize(&self, _text: &str) -> Result<Vec<NumericalElement>, LabelError> {
        Ok(Vec::new())
    }
}

struct Vocabulary {
    months: [&'static str; 12],
    /// (unit alternatives, ISO-8601 designator)
    units: [(&'static str, &'static str); 6],
}

const ENGLISH: Vocabulary = Vocabulary {
    months: [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ],
    units: [
        ("years?", "Y"),
        ("months?", "M"),
        ("weeks?", "W"),
        ("days?", "D"),
        ("hours?", "TH"),
        ("minutes?", "TM"),
    ],
};

const ITALIAN: Vocabulary = Vocabulary {
    months: [
        "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
        "settembre", "ottobre", "novembre", "dicembre",
    ],
    units: [
        ("anni|anno", "Y"),
        ("mesi|mese", "M"),
        ("settimane|settimana", "W"),
        ("giorni|giorno", "D"),
        ("ore|ora", "TH"),
        ("minuti|minuto", "TM"),
    ],
};

/// Regex-driven normalizer for day-month-year dates, bare years and
/// `<number> <unit>` durations, in English or Italian.
pub struct PatternNormalizer {
    months: Vec<&'static str>,
    units: Vec<(Regex, &'static str)>,
    date: Option<Regex>,
    month_first_date: Option<Regex>,
    year: Regex,
}

impl PatternNormalizer {
    /// Build the normalizer for a language code. Languages without a
    /// vocabulary only recognize bare years.
    pub fn for_language(language: &str) -> Result<Self, regex::Error> {
        let vocabulary = match language.to_lowercase().as_str() {
            "en" => Some(&ENGLISH),
            "it" => Some(&ITALIAN),
            _ => None,
        };
        let year = Regex::new(r"\b(1\d{3}|20\d{2})\b")?;

        let Some(vocabulary) = vocabulary else {
            return Ok(PatternNormalizer {
                months: Vec::new(),
                units: Vec::new(),
                date: None,
                month_first_date: None,
                year,
            });
        };

        let months = vocabulary.months.join("|");
        let date = Regex::new(&format!(r"(?i)\b(\d{{1,2}})\s+({months})\s+(\d{{4}})\b"))?;
        let month_first_date = Regex::new(&format!(r"(?i)\b({months})\s+(\d{{1,2}}),?\s+(\d{{4}})\b"))?;

        let mut units = Vec::new();
        for (alternatives, designator) in vocabulary.units {
            let pattern = Regex::new(&format!(r"(?i)\b(\d+)\s+(?:{alternatives})\b"))?;
            units.push((pattern, designator));
        }

        Ok(PatternNormalizer {
            months: vocabulary.months.to_vec(),
            units,
            date: Some(date),
            month_first_date: Some(month_first_date),
            year,
        })
    }

    fn month_number(&self, name: &str) -> Option<usize> {
        let lower = name.to_lowercase();
        self.months.iter().position(|m| *m == lower).map(|i| i + 1)
    }
}

/// Matched spans, used to keep later patterns off text an earlier one
/// already claimed.
#[derive(Default)]
struct Claims {
    spans: Vec<(usize, usize, NumericalElement)>,
}

impl Claims {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.spans.iter().any(|(s, e, _)| start < *e && *s < end)
    }

    fn claim(&mut self, start: usize, end: usize, element: NumericalElement) {
        if !self.overlaps(start, end) {
            self.spans.push((start, end, element));
        }
    }

    fn into_elements(mut self) -> Vec<NumericalElement> {
        self.spans.sort_by_key(|(start, _, _)| *start);
        self.spans.into_iter().map(|(_, _, element)| element).collect()
    }
}

impl NumericalNormalizer for PatternNormalizer {
    fn normalize(&self, text: &str) -> Result<Vec<NumericalElement>, LabelError> {
        let mut claims = Claims::default();

        if let Some(date) = &self.date {
            for captures in date.captures_iter(text) {
                let whole = &captures[0];
                let (Ok(day), Some(month)) = (captures[1].parse::<u32>(), self.month_number(&captures[2])) else {
                    continue;
                };
                let Some(span) = captures.get(0) else { continue };
                let value = format!("{}-{:02}-{:02}", &captures[3], month, day);
                claims.claim(span.start(), span.end(), NumericalElement::new(TIME, whole, value, 1.0));
            }
        }

        if let Some(date) = &self.month_first_date {
            for captures in date.captures_iter(text) {
                let whole = &captures[0];
                let (Some(month), Ok(day)) = (self.month_number(&captures[1]), captures[2].parse::<u32>()) else {
                    continue;
                };
                let Some(span) = captures.get(0) else { continue };
                let value = format!("{}-{:02}-{:02}", &captures[3], month, day);
                claims.claim(span.start(), span.end(), NumericalElement::new(TIME, whole, value, 1.0));
            }
        }

        for (pattern, designator) in &self.units {
            for captures in pattern.captures_iter(text) {
                let Some(span) = captures.get(0) else { continue };
                let amount = &captures[1];
                let value = match designator.strip_prefix('T') {
                    Some(unit) => format!("PT{amount}{unit}"),
                    None => format!("P{amount}{designator}"),
                };
                claims.claim(span.start(), span.end(), NumericalElement::new(DURATION, span.as_str(), value, 1.0));
            }
        }

        for found in self.year.find_iter(text) {
            claims.claim(
                found.start(),
                found.end(),
                NumericalElement::new(TIME, found.as_str(), found.as_str(), 1.0),
            );
        }

        Ok(claims.into_elements())
    }
}
