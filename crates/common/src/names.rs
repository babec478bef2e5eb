//! Identifier normalization
//!
//! Service models name members in whatever case convention the service team
//! picked (`repositoryName`, `QueueUrl`, `KMSMasterKeyId`). Generated code
//! needs stable camel, lower-camel and snake forms with well-known
//! initialisms spelled the way Go and Kubernetes APIs spell them.

use serde::{Deserialize, Serialize};

/// The normalized forms of one raw identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Names {
    /// The identifier exactly as it appears in the service model
    pub original: String,
    /// `KMSMasterKeyID`
    pub camel: String,
    /// `kmsMasterKeyID`
    pub camel_lower: String,
    /// `kms_master_key_id`
    pub snake: String,
}

/// Naming utility consumed by the model builder
pub trait Namer {
    /// Normalized forms of a raw identifier
    fn names(&self, raw: &str) -> Names;

    fn pluralize(&self, word: &str) -> String;

    fn singularize(&self, word: &str) -> String;

    fn is_plural(&self, word: &str) -> bool {
        self.singularize(word) != word
    }
}

/// Initialisms rendered in upper case, in their canonical spelling
const INITIALISMS: &[&str] = &[
    "ARN", "ID", "URL", "URI", "API", "KMS", "SSE", "IAM", "EBS", "CPU", "GPU", "IOPS", "DNS",
    "IP", "JSON", "TLS", "SSL", "VPC",
];

/// Case-boundary namer with a fixed initialism list
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamer;

impl Namer for DefaultNamer {
    fn names(&self, raw: &str) -> Names {
        let words: Vec<String> = split_words(raw).iter().map(|w| normalize_word(w)).collect();

        let camel = words.concat();
        let camel_lower = match words.split_first() {
            Some((first, rest)) => {
                let mut s = first.to_ascii_lowercase();
                s.push_str(&rest.concat());
                s
            }
            None => String::new(),
        };
        let snake = words
            .iter()
            .map(|w| w.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("_");

        Names {
            original: raw.to_string(),
            camel,
            camel_lower,
            snake,
        }
    }

    fn pluralize(&self, word: &str) -> String {
        if self.is_plural(word) {
            return word.to_string();
        }
        let lower = word.to_ascii_lowercase();
        if let Some(stem) = word.strip_suffix('y') {
            if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
                return format!("{}ies", stem);
            }
        }
        if lower.ends_with('s')
            || lower.ends_with('x')
            || lower.ends_with("ch")
            || lower.ends_with("sh")
        {
            return format!("{}es", word);
        }
        format!("{}s", word)
    }

    fn singularize(&self, word: &str) -> String {
        let lower = word.to_ascii_lowercase();
        let len = word.len();
        if lower.ends_with("ies") && len > 3 {
            return format!("{}y", &word[..len - 3]);
        }
        // `-es` after a sibilant stem; `Databases` and `Houses` only drop the `s`
        if ["sses", "xes", "ches", "shes", "zzes", "iases", "tuses", "buses", "ruses"]
            .iter()
            .any(|suffix| lower.ends_with(suffix))
        {
            return word[..len - 2].to_string();
        }
        if ["ss", "us", "is", "ias"].iter().any(|suffix| lower.ends_with(suffix)) {
            return word.to_string();
        }
        if lower.ends_with('s') && len > 1 {
            return word[..len - 1].to_string();
        }
        word.to_string()
    }
}

/// Split a raw identifier into words at case boundaries and separators.
///
/// An upper-case run ends before the last capital when a lower-case letter
/// follows (`KMSMaster` -> `KMS`, `Master`), except for a plural `s`
/// closing the run (`SnapshotARNs` -> `Snapshot`, `ARNs`).
fn split_words(raw: &str) -> Vec<String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | ' ' | '.') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let next_lower = next.is_some_and(|n| n.is_lowercase());
            let plural_tail = next == Some('s')
                && chars.get(i + 2).map_or(true, |after| !after.is_lowercase());

            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower && !plural_tail)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn initialism(lower: &str) -> Option<&'static str> {
    INITIALISMS
        .iter()
        .copied()
        .find(|i| i.eq_ignore_ascii_case(lower))
}

fn normalize_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if let Some(init) = initialism(&lower) {
        return init.to_string();
    }
    if let Some(init) = lower.strip_suffix('s').and_then(initialism) {
        return format!("{}s", init);
    }

    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
