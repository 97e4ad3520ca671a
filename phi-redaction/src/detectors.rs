use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;

use crate::error::{DetectorError, Result};
use crate::types::{DetectionMethod, PhiType};

const SSN_PATTERN: &str = r"\b(?:(?i:SSN|social security(?: number| no\.?)?)[\s:#]*\d{3}-?\d{2}-?\d{4}|\d{3}-\d{2}-\d{4})\b";
const MRN_PATTERN: &str = r"\b(?i:MRN|medical record(?: number| no\.?| #)?)[\s:#-]*\d{6,10}\b";
const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
const DATE_OF_BIRTH_PATTERN: &str = r"(?:\b(?i:DOB|date of birth)[\s:]*)?\b(?:(?:0?[1-9]|1[0-2])[/-](?:0?[1-9]|[12]\d|3[01])[/-](?:19|20)\d{2}|(?:19|20)\d{2}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12]\d|3[01]))\b";
const PHONE_PATTERN: &str = r"(?:\+?1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b";
const ADDRESS_PATTERN: &str = r"\b\d{1,6}(?:[ \t]+[A-Z][A-Za-z]*\.?){1,4}[ \t]+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Place|Pl|Way|Terrace)\b\.?";
const HONORIFIC_NAME_PATTERN: &str = r"\b(?:Dr|Mr|Mrs|Ms|Miss|Prof)\.?[ \t]+[A-Z](?:'[A-Z])?[a-z]+(?:-[A-Z][a-z]+)?(?:[ \t]+[A-Z](?:'[A-Z])?[a-z]+(?:-[A-Z][a-z]+)?)*";
const CAPITALIZED_WORD_PATTERN: &str = r"\b[A-Z](?:'[A-Z])?[a-z]+(?:-[A-Z][a-z]+)?\b";

lazy_static! {
    /// Capitalized words that never start or continue a name
    static ref NAME_STOPWORDS: HashSet<&'static str> = [
        // sentence starters and function words
        "the", "a", "an", "this", "that", "these", "those", "he", "she", "they", "we", "it",
        "his", "her", "their", "our", "my", "your", "you", "and", "or", "but", "if", "when",
        "then", "so", "also", "no", "yes", "not", "there", "here", "what", "how", "why",
        "where", "who", "after", "before", "during", "since", "for", "with", "without", "on",
        "in", "at", "of", "to", "from", "by", "is", "was", "has", "had", "will", "can",
        "please", "thanks", "thank", "okay", "ok", "hello", "hi", "good", "well", "today",
        "yesterday", "tomorrow", "tonight", "morning", "afternoon", "evening", "per",
        // subject cues and roles
        "patient", "pt", "doctor", "nurse", "physician", "provider", "caregiver", "dr", "mr",
        "mrs", "ms", "miss", "prof",
        // form labels
        "name", "first", "last", "full", "phone", "number", "address", "email", "home", "work",
        "mobile", "cell", "medical", "record", "social", "security", "date", "birth", "id",
        "street", "city", "state", "zip", "insurance", "policy", "member", "contact",
        // months
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug",
        "sep", "sept", "oct", "nov", "dec",
        // weekdays
        "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
        // clinical vocabulary
        "emergency", "department", "hospital", "clinic", "room", "unit", "center", "centre",
        "blood", "pressure", "heart", "rate", "pain", "fever", "type", "diabetes",
        "hypertension", "lab", "labs", "test", "tests", "results", "vital", "signs", "exam",
        "examination", "review", "systems", "physical", "surgery", "pharmacy", "prescription",
        "plan", "assessment", "history", "chief", "complaint", "diagnosis", "medications",
        "medication", "allergies", "follow", "continue", "start", "stop", "take", "return",
        "reports", "denies", "states", "presents", "complains", "subjective", "objective",
        "symptoms", "treatment", "therapy", "imaging", "care", "primary", "urgent",
    ]
    .into_iter()
    .collect();

    /// Words that, directly before a single capitalized word, mark it as a name
    static ref SUBJECT_CUES: HashSet<&'static str> = [
        "patient", "pt", "nurse", "doctor", "physician", "caregiver", "mother", "father",
        "son", "daughter", "wife", "husband", "sister", "brother", "named",
    ]
    .into_iter()
    .collect();
}

/// A typed PHI detector.
///
/// Implementations return byte ranges into `text`. Every range must be
/// non-empty, in bounds and on char boundaries; the engine fails closed
/// otherwise.
pub trait PhiDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn phi_type(&self) -> PhiType;

    fn method(&self) -> DetectionMethod;

    fn detect(&self, text: &str) -> std::result::Result<Vec<Range<usize>>, DetectorError>;
}

/// Regex-backed detector
pub struct PatternDetector {
    name: &'static str,
    phi_type: PhiType,
    method: DetectionMethod,
    regex: Regex,
}

impl PatternDetector {
    pub fn new(
        name: &'static str,
        phi_type: PhiType,
        method: DetectionMethod,
        pattern: &str,
    ) -> Result<Self> {
        Ok(Self {
            name,
            phi_type,
            method,
            regex: Regex::new(pattern)?,
        })
    }
}

impl PhiDetector for PatternDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn phi_type(&self) -> PhiType {
        self.phi_type
    }

    fn method(&self) -> DetectionMethod {
        self.method
    }

    fn detect(&self, text: &str) -> std::result::Result<Vec<Range<usize>>, DetectorError> {
        Ok(self.regex.find_iter(text).map(|m| m.range()).collect())
    }
}

/// Runs of capitalized words, split at stop-words.
///
/// A sub-run of two or more words is a name. A single word is a name only
/// when the word directly before it is a subject cue ("Patient Smith").
pub struct CapitalizedNameDetector {
    word: Regex,
}

impl CapitalizedNameDetector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            word: Regex::new(CAPITALIZED_WORD_PATTERN)?,
        })
    }

    fn flush(text: &str, run: &mut Vec<Range<usize>>, out: &mut Vec<Range<usize>>) {
        match run.as_slice() {
            [] => {}
            [single] => {
                if preceded_by_cue(text, single.start) {
                    out.push(single.clone());
                }
            }
            [first, .., last] => out.push(first.start..last.end),
        }
        run.clear();
    }
}

impl PhiDetector for CapitalizedNameDetector {
    fn name(&self) -> &'static str {
        "capitalized_name"
    }

    fn phi_type(&self) -> PhiType {
        PhiType::Name
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::Heuristic
    }

    fn detect(&self, text: &str) -> std::result::Result<Vec<Range<usize>>, DetectorError> {
        let mut names = Vec::new();
        let mut run: Vec<Range<usize>> = Vec::new();
        let mut previous_end: Option<usize> = None;

        for word in self.word.find_iter(text) {
            let adjacent = previous_end
                .and_then(|end| text.get(end..word.start()))
                .map(|gap| !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t'))
                .unwrap_or(false);
            if !adjacent {
                Self::flush(text, &mut run, &mut names);
            }

            if NAME_STOPWORDS.contains(word.as_str().to_lowercase().as_str()) {
                Self::flush(text, &mut run, &mut names);
            } else {
                run.push(word.range());
            }
            previous_end = Some(word.end());
        }
        Self::flush(text, &mut run, &mut names);

        Ok(names)
    }
}

fn preceded_by_cue(text: &str, start: usize) -> bool {
    let before = match text.get(..start) {
        Some(before) => before,
        None => return false,
    };
    // Only spaces, tabs or a colon may separate the cue from the word
    let trimmed = before.trim_end_matches([' ', '\t', ':']);
    if trimmed.len() == before.len() {
        return false;
    }
    trimmed
        .rsplit(|c: char| !c.is_alphanumeric())
        .next()
        .map(|cue| SUBJECT_CUES.contains(cue.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Fixed registration order: structured patterns first, then name heuristics.
pub fn default_detectors() -> Result<Vec<Box<dyn PhiDetector>>> {
    let structured = |name: &'static str,
                      phi_type: PhiType,
                      pattern: &'static str|
     -> Result<Box<dyn PhiDetector>> {
        Ok(Box::new(PatternDetector::new(
            name,
            phi_type,
            DetectionMethod::Pattern,
            pattern,
        )?))
    };

    Ok(vec![
        structured("ssn", PhiType::Ssn, SSN_PATTERN)?,
        structured("mrn", PhiType::Mrn, MRN_PATTERN)?,
        structured("email", PhiType::Email, EMAIL_PATTERN)?,
        structured("date_of_birth", PhiType::DateOfBirth, DATE_OF_BIRTH_PATTERN)?,
        structured("phone", PhiType::Phone, PHONE_PATTERN)?,
        structured("address", PhiType::Address, ADDRESS_PATTERN)?,
        Box::new(PatternDetector::new(
            "honorific_name",
            PhiType::Name,
            DetectionMethod::Heuristic,
            HONORIFIC_NAME_PATTERN,
        )?),
        Box::new(CapitalizedNameDetector::new()?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(detector: &dyn PhiDetector, text: &str) -> Vec<String> {
        detector
            .detect(text)
            .unwrap()
            .into_iter()
            .map(|r| text[r].to_string())
            .collect()
    }

    fn detector(name: &str) -> Box<dyn PhiDetector> {
        default_detectors()
            .unwrap()
            .into_iter()
            .find(|d| d.name() == name)
            .unwrap()
    }

    #[test]
    fn test_registration_order() {
        let names: Vec<_> = default_detectors().unwrap().iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec![
                "ssn",
                "mrn",
                "email",
                "date_of_birth",
                "phone",
                "address",
                "honorific_name",
                "capitalized_name"
            ]
        );
    }

    #[test]
    fn test_ssn_consumes_label() {
        let ssn = detector("ssn");
        assert_eq!(find(ssn.as_ref(), "SSN 123-45-6789, ok"), vec!["SSN 123-45-6789"]);
        assert_eq!(find(ssn.as_ref(), "ssn: 123456789"), vec!["ssn: 123456789"]);
        assert_eq!(find(ssn.as_ref(), "id 123-45-6789"), vec!["123-45-6789"]);
        assert!(find(ssn.as_ref(), "order 123456789").is_empty());
    }

    #[test]
    fn test_mrn_requires_label() {
        let mrn = detector("mrn");
        assert_eq!(find(mrn.as_ref(), "MRN: 00123456 on file"), vec!["MRN: 00123456"]);
        assert_eq!(
            find(mrn.as_ref(), "Medical Record Number 1234567"),
            vec!["Medical Record Number 1234567"]
        );
        assert!(find(mrn.as_ref(), "took 1234567 steps").is_empty());
    }

    #[test]
    fn test_dates_and_phones() {
        let dob = detector("date_of_birth");
        assert_eq!(find(dob.as_ref(), "DOB: 03/14/1962."), vec!["DOB: 03/14/1962"]);
        assert_eq!(find(dob.as_ref(), "born 1962-03-14"), vec!["1962-03-14"]);
        assert!(find(dob.as_ref(), "headache 7/10").is_empty());

        let phone = detector("phone");
        assert_eq!(find(phone.as_ref(), "call (555) 123-4567"), vec!["(555) 123-4567"]);
        assert_eq!(find(phone.as_ref(), "cell 555.123.4567"), vec!["555.123.4567"]);
    }

    #[test]
    fn test_address() {
        let address = detector("address");
        assert_eq!(
            find(address.as_ref(), "lives at 1420 North Maple Avenue with"),
            vec!["1420 North Maple Avenue"]
        );
        assert!(find(address.as_ref(), "took 2 tablets").is_empty());
    }

    #[test]
    fn test_honorific_names() {
        let honorific = detector("honorific_name");
        assert_eq!(
            find(honorific.as_ref(), "seen by Dr. Sarah O'Neil today"),
            vec!["Dr. Sarah O'Neil"]
        );
        assert_eq!(find(honorific.as_ref(), "Mrs Patel agreed"), vec!["Mrs Patel"]);
    }

    #[test]
    fn test_honorific_takes_whole_name_run() {
        let honorific = detector("honorific_name");
        assert_eq!(
            find(honorific.as_ref(), "Seen by Dr. Sarah Jane Smith today."),
            vec!["Dr. Sarah Jane Smith"]
        );
        assert_eq!(
            find(honorific.as_ref(), "Mrs Patel Kumar Singh signed"),
            vec!["Mrs Patel Kumar Singh"]
        );
    }

    #[test]
    fn test_capitalized_runs_split_at_stopwords() {
        let names = CapitalizedNameDetector::new().unwrap();
        assert_eq!(
            find(&names, "Patient John Smith reports chest pain."),
            vec!["John Smith"]
        );
        assert_eq!(find(&names, "The Emergency Department was busy."), Vec::<String>::new());
        assert_eq!(find(&names, "Patient Smith is stable."), vec!["Smith"]);
        assert_eq!(find(&names, "Nurse: Alvarez checked vitals."), vec!["Alvarez"]);
        assert!(find(&names, "Smith is stable.").is_empty());
        assert!(find(&names, "Seen in March. Follow up Monday.").is_empty());
    }

    #[test]
    fn test_runs_do_not_cross_punctuation() {
        let names = CapitalizedNameDetector::new().unwrap();
        assert!(find(&names, "Fine. Thanks, Doctor.").is_empty());
        assert_eq!(
            find(&names, "Maria Lopez, Ana Lopez-Garcia."),
            vec!["Maria Lopez", "Ana Lopez-Garcia"]
        );
    }
}
