//! Snowball stemming algorithm for Spanish.
//!
//! # Algorithm
//!
//! The word is split into three regions (RV, R1, R2) and then rewritten in
//! four steps:
//! 0. Attached pronouns after gerunds and infinitives ("comprarlo")
//! 1. Standard derivational suffixes (-idad, -mente, -ación, ...)
//! 2. Verb suffixes, tried only when step 1 removed nothing
//! 3. Residual vowels (-os, -a, -o, -e)
//!
//! Finally acute accents are removed.
//!
//! # Examples
//!
//! ```
//! use ods_classifier::analysis::token_filter::stem::Stemmer;
//! use ods_classifier::analysis::token_filter::stem::spanish::SpanishStemmer;
//!
//! let stemmer = SpanishStemmer::new();
//!
//! assert_eq!(stemmer.stem("publica"), "public");
//! assert_eq!(stemmer.stem("corriendo"), "corr");
//! assert_eq!(stemmer.stem("felicidades"), "felic");
//! ```

use crate::analysis::token_filter::stem::Stemmer;

const PRONOUNS: &[&str] = &[
    "me", "se", "sela", "selo", "selas", "selos", "la", "le", "lo", "las", "les", "los", "nos",
];

/// What precedes an attached pronoun.
#[derive(Clone, Copy, Debug)]
enum PronounHost {
    /// Accented form, rewritten without the accent.
    Accented(&'static str),
    Plain,
    /// `yendo`, only when preceded by `u`.
    Yendo,
}

const PRONOUN_HOSTS: &[(&str, PronounHost)] = &[
    ("iéndo", PronounHost::Accented("iendo")),
    ("ándo", PronounHost::Accented("ando")),
    ("ár", PronounHost::Accented("ar")),
    ("ér", PronounHost::Accented("er")),
    ("ír", PronounHost::Accented("ir")),
    ("ando", PronounHost::Plain),
    ("iendo", PronounHost::Plain),
    ("ar", PronounHost::Plain),
    ("er", PronounHost::Plain),
    ("ir", PronounHost::Plain),
    ("yendo", PronounHost::Yendo),
];

#[derive(Clone, Copy, Debug)]
enum Standard {
    Plain,
    PrecededByIc,
    Logia,
    Ucion,
    Encia,
    Amente,
    Mente,
    Idad,
    Iva,
}

const STANDARD_SUFFIXES: &[(&str, Standard)] = &[
    ("anza", Standard::Plain),
    ("anzas", Standard::Plain),
    ("ico", Standard::Plain),
    ("ica", Standard::Plain),
    ("icos", Standard::Plain),
    ("icas", Standard::Plain),
    ("ismo", Standard::Plain),
    ("ismos", Standard::Plain),
    ("able", Standard::Plain),
    ("ables", Standard::Plain),
    ("ible", Standard::Plain),
    ("ibles", Standard::Plain),
    ("ista", Standard::Plain),
    ("istas", Standard::Plain),
    ("oso", Standard::Plain),
    ("osa", Standard::Plain),
    ("osos", Standard::Plain),
    ("osas", Standard::Plain),
    ("amiento", Standard::Plain),
    ("amientos", Standard::Plain),
    ("imiento", Standard::Plain),
    ("imientos", Standard::Plain),
    ("adora", Standard::PrecededByIc),
    ("ador", Standard::PrecededByIc),
    ("ación", Standard::PrecededByIc),
    ("adoras", Standard::PrecededByIc),
    ("adores", Standard::PrecededByIc),
    ("aciones", Standard::PrecededByIc),
    ("ante", Standard::PrecededByIc),
    ("antes", Standard::PrecededByIc),
    ("ancia", Standard::PrecededByIc),
    ("ancias", Standard::PrecededByIc),
    ("logía", Standard::Logia),
    ("logías", Standard::Logia),
    ("ución", Standard::Ucion),
    ("uciones", Standard::Ucion),
    ("encia", Standard::Encia),
    ("encias", Standard::Encia),
    ("amente", Standard::Amente),
    ("mente", Standard::Mente),
    ("idad", Standard::Idad),
    ("idades", Standard::Idad),
    ("iva", Standard::Iva),
    ("ivo", Standard::Iva),
    ("ivas", Standard::Iva),
    ("ivos", Standard::Iva),
];

const Y_VERB_SUFFIXES: &[&str] = &[
    "ya", "ye", "yan", "yen", "yeron", "yendo", "yo", "yó", "yas", "yes", "yais", "yamos",
];

/// Verb endings whose removal also drops a `u` in a preceding `gu`.
const GU_VERB_SUFFIXES: &[&str] = &["en", "es", "éis", "emos"];

const VERB_SUFFIXES: &[&str] = &[
    "arían", "arías", "arán", "arás", "aríais", "aría", "aréis", "aríamos", "aremos", "ará",
    "aré", "erían", "erías", "erán", "erás", "eríais", "ería", "eréis", "eríamos", "eremos",
    "erá", "eré", "irían", "irías", "irán", "irás", "iríais", "iría", "iréis", "iríamos",
    "iremos", "irá", "iré", "aba", "ada", "ida", "ía", "ara", "iera", "ad", "ed", "id", "ase",
    "iese", "aste", "iste", "an", "aban", "ían", "aran", "ieran", "asen", "iesen", "aron",
    "ieron", "ado", "ido", "ando", "iendo", "ió", "ar", "er", "ir", "as", "abas", "adas", "idas",
    "ías", "aras", "ieras", "ases", "ieses", "ís", "áis", "abais", "íais", "arais", "ierais",
    "aseis", "ieseis", "asteis", "isteis", "ados", "idos", "amos", "ábamos", "íamos", "imos",
    "áramos", "iéramos", "iésemos", "ásemos",
];

const RESIDUAL_SUFFIXES: &[&str] = &["os", "a", "o", "á", "í", "ó"];

/// Snowball stemmer for Spanish.
#[derive(Clone, Debug, Default)]
pub struct SpanishStemmer;

impl SpanishStemmer {
    /// Create a new Spanish stemmer.
    pub fn new() -> Self {
        SpanishStemmer
    }
}

impl Stemmer for SpanishStemmer {
    fn stem(&self, word: &str) -> String {
        let mut chars: Vec<char> = word.chars().collect();
        let regions = Regions::mark(&chars);

        attached_pronoun(&mut chars, &regions);

        if !standard_suffix(&mut chars, &regions)
            && !y_verb_suffix(&mut chars, &regions)
        {
            verb_suffix(&mut chars, &regions);
        }

        residual_suffix(&mut chars, &regions);

        chars.into_iter().map(remove_acute).collect()
    }

    fn name(&self) -> &'static str {
        "spanish"
    }
}

/// Start offsets (in chars) of the RV, R1 and R2 regions.
#[derive(Debug, PartialEq, Eq)]
struct Regions {
    rv: usize,
    r1: usize,
    r2: usize,
}

impl Regions {
    fn mark(word: &[char]) -> Self {
        let n = word.len();
        // Index just past the first char at or after `from` whose vowel-ness is `vowel`.
        let go_past = |from: usize, vowel: bool| {
            (from..n)
                .find(|&i| is_vowel(word[i]) == vowel)
                .map(|i| i + 1)
        };

        let rv = if n < 2 {
            None
        } else if is_vowel(word[0]) {
            if is_vowel(word[1]) {
                go_past(2, false)
            } else {
                go_past(2, true)
            }
        } else if is_vowel(word[1]) {
            (n >= 3).then_some(3)
        } else {
            go_past(2, true)
        };

        let r1 = go_past(0, true).and_then(|i| go_past(i, false));
        let r2 = r1.and_then(|start| go_past(start, true).and_then(|i| go_past(i, false)));

        Regions {
            rv: rv.unwrap_or(n),
            r1: r1.unwrap_or(n),
            r2: r2.unwrap_or(n),
        }
    }
}

fn is_vowel(c: char) -> bool {
    matches!(
        c,
        'a' | 'e' | 'i' | 'o' | 'u' | 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ü'
    )
}

fn remove_acute(c: char) -> char {
    match c {
        'á' => 'a',
        'é' => 'e',
        'í' => 'i',
        'ó' => 'o',
        'ú' => 'u',
        other => other,
    }
}

/// Char offset where `suffix` starts if `word` ends with it.
fn suffix_start(word: &[char], suffix: &str) -> Option<usize> {
    let len = suffix.chars().count();
    let start = word.len().checked_sub(len)?;
    word[start..]
        .iter()
        .copied()
        .eq(suffix.chars())
        .then_some(start)
}

/// Longest suffix from `table` that `word` ends with.
fn longest_suffix<T: Copy>(word: &[char], table: &[(&str, T)]) -> Option<(usize, T)> {
    table
        .iter()
        .filter_map(|&(suffix, tag)| suffix_start(word, suffix).map(|start| (start, tag)))
        .min_by_key(|&(start, _)| start)
}

fn longest_plain(word: &[char], table: &[&str]) -> Option<usize> {
    longest_plain_from(word, table, 0)
}

/// Longest suffix from `table` lying entirely at or after `limit`.
fn longest_plain_from(word: &[char], table: &[&str], limit: usize) -> Option<usize> {
    table
        .iter()
        .filter_map(|suffix| suffix_start(word, suffix))
        .filter(|&start| start >= limit)
        .min()
}

/// Remove `suffix` if present and starting at or after `limit`.
fn delete_if_in(word: &mut Vec<char>, suffix: &str, limit: usize) -> bool {
    match suffix_start(word, suffix) {
        Some(start) if start >= limit => {
            word.truncate(start);
            true
        }
        _ => false,
    }
}

fn replace_tail(word: &mut Vec<char>, start: usize, replacement: &str) {
    word.truncate(start);
    word.extend(replacement.chars());
}

fn attached_pronoun(word: &mut Vec<char>, regions: &Regions) {
    let Some(pronoun_start) = longest_plain(word, PRONOUNS) else {
        return;
    };

    let Some((host_start, host)) = longest_suffix(&word[..pronoun_start], PRONOUN_HOSTS) else {
        return;
    };
    if host_start < regions.rv {
        return;
    }

    match host {
        PronounHost::Accented(plain) => replace_tail(word, host_start, plain),
        PronounHost::Plain => word.truncate(pronoun_start),
        PronounHost::Yendo => {
            if host_start > 0 && word[host_start - 1] == 'u' {
                word.truncate(pronoun_start);
            }
        }
    }
}

fn standard_suffix(word: &mut Vec<char>, regions: &Regions) -> bool {
    let Some((start, kind)) = longest_suffix(word, STANDARD_SUFFIXES) else {
        return false;
    };

    let required = match kind {
        Standard::Amente => regions.r1,
        _ => regions.r2,
    };
    if start < required {
        return false;
    }

    match kind {
        Standard::Plain => word.truncate(start),
        Standard::PrecededByIc => {
            word.truncate(start);
            delete_if_in(word, "ic", regions.r2);
        }
        Standard::Logia => replace_tail(word, start, "log"),
        Standard::Ucion => replace_tail(word, start, "u"),
        Standard::Encia => replace_tail(word, start, "ente"),
        Standard::Amente => {
            word.truncate(start);
            if delete_if_in(word, "iv", regions.r2) {
                delete_if_in(word, "at", regions.r2);
            } else {
                for suffix in ["os", "ic", "ad"] {
                    if suffix_start(word, suffix).is_some() {
                        delete_if_in(word, suffix, regions.r2);
                        break;
                    }
                }
            }
        }
        Standard::Mente => {
            word.truncate(start);
            for suffix in ["ante", "able", "ible"] {
                if suffix_start(word, suffix).is_some() {
                    delete_if_in(word, suffix, regions.r2);
                    break;
                }
            }
        }
        Standard::Idad => {
            word.truncate(start);
            for suffix in ["abil", "ic", "iv"] {
                if suffix_start(word, suffix).is_some() {
                    delete_if_in(word, suffix, regions.r2);
                    break;
                }
            }
        }
        Standard::Iva => {
            word.truncate(start);
            delete_if_in(word, "at", regions.r2);
        }
    }

    true
}

fn y_verb_suffix(word: &mut Vec<char>, regions: &Regions) -> bool {
    match longest_plain_from(word, Y_VERB_SUFFIXES, regions.rv) {
        Some(start) if start > 0 && word[start - 1] == 'u' => {
            word.truncate(start);
            true
        }
        _ => false,
    }
}

fn verb_suffix(word: &mut Vec<char>, regions: &Regions) {
    let gu = longest_plain_from(word, GU_VERB_SUFFIXES, regions.rv).map(|start| (start, true));
    let plain = longest_plain_from(word, VERB_SUFFIXES, regions.rv).map(|start| (start, false));
    let candidate = match (gu, plain) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    let Some((start, drops_gu)) = candidate else {
        return;
    };

    word.truncate(start);
    if drops_gu && word.ends_with(&['g', 'u']) {
        word.pop();
    }
}

fn residual_suffix(word: &mut Vec<char>, regions: &Regions) {
    let residual = longest_plain(word, RESIDUAL_SUFFIXES);
    let e_like = longest_plain(word, &["e", "é"]);

    if let Some(start) = residual {
        if start >= regions.rv {
            word.truncate(start);
        }
        return;
    }

    if let Some(start) = e_like {
        if start >= regions.rv {
            word.truncate(start);
            if word.ends_with(&['g', 'u']) && word.len() - 1 >= regions.rv {
                word.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions(word: &str) -> Regions {
        let chars: Vec<char> = word.chars().collect();
        Regions::mark(&chars)
    }

    #[test]
    fn test_regions() {
        // Snowball reference examples.
        assert_eq!(regions("macho").rv, 3);
        assert_eq!(regions("oliva").rv, 3);
        assert_eq!(regions("trabajo").rv, 3);
        assert_eq!(regions("áureo").rv, 3);

        let r = regions("felicidades");
        assert_eq!(r.r1, 3);
        assert_eq!(r.r2, 5);
    }

    #[test]
    fn test_common_words() {
        let stemmer = SpanishStemmer::new();
        let cases = [
            ("publica", "public"),
            ("educacion", "educacion"),
            ("esencial", "esencial"),
            ("ninos", "nin"),
            ("corriendo", "corr"),
            ("cantaban", "cant"),
            ("rapidamente", "rapid"),
            ("felicidades", "felic"),
            ("acaban", "acab"),
            ("acabas", "acab"),
            ("daban", "dab"),
            ("daran", "dar"),
        ];

        for (word, expected) in cases {
            assert_eq!(stemmer.stem(word), expected, "word: {word}");
        }
    }

    #[test]
    fn test_attached_pronoun() {
        let stemmer = SpanishStemmer::new();
        assert_eq!(stemmer.stem("haciendolo"), "hac");
        assert_eq!(stemmer.stem("comprarlo"), "compr");
        assert_eq!(stemmer.stem("levantándose"), "levant");
    }

    #[test]
    fn test_accents_removed() {
        let stemmer = SpanishStemmer::new();
        assert_eq!(stemmer.stem("canción"), "cancion");
    }

    #[test]
    fn test_short_words_unchanged() {
        let stemmer = SpanishStemmer::new();
        assert_eq!(stemmer.stem("a"), "a");
        assert_eq!(stemmer.stem(""), "");
    }
}
