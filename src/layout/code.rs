//! Monospace font detection and code language hints.

use regex::Regex;
use std::sync::LazyLock;

static RE_MONOSPACE_FONT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)courier|consolas|menlo|monaco|inconsolata|source\s*code\s*pro|fira\s*(code|mono)|liberation\s*mono|dejavu\s*sans\s*mono|ubuntu\s*mono|roboto\s*mono|sf\s*mono|mono(space|spaced)?$",
    )
    .expect("valid monospace font regex")
});

/// Whether a font family name denotes a fixed-pitch font.
///
/// Subset prefixes (`ABCDEF+Courier-Bold`) and style suffixes are tolerated.
pub fn is_monospace_font(font_family: &str) -> bool {
    let family = font_family
        .rsplit_once('+')
        .map_or(font_family, |(_, rest)| rest);
    let family = family.split(['-', ',']).next().unwrap_or(family).trim();
    !family.is_empty() && RE_MONOSPACE_FONT.is_match(family)
}

struct LanguageRule {
    name: &'static str,
    patterns: &'static [&'static str],
}

const LANGUAGE_RULES: &[LanguageRule] = &[
    LanguageRule {
        name: "rust",
        patterns: &[
            r"\bfn\s+\w+\s*[(<]",
            r"\blet\s+mut\b",
            r"\bimpl\b[^{]*\{",
            r"\bpub\s+(fn|struct|enum|mod)\b",
            r"\w+::\w+\(",
        ],
    },
    LanguageRule {
        name: "python",
        patterns: &[
            r"\bdef\s+\w+\s*\(.*\)\s*:",
            r"(?m)^\s*class\s+\w+\s*[(:]",
            r"(?m)^\s*from\s+[\w.]+\s+import\b",
            r"(?m)^\s*import\s+\w+\s*$",
            r"\bself\.\w+",
            r#"if\s+__name__\s*==\s*["']__main__["']"#,
        ],
    },
    LanguageRule {
        name: "javascript",
        patterns: &[
            r"\bfunction\s+\w*\s*\(",
            r"\w+\s*=>\s*[{\w(]",
            r"\b(const|let|var)\s+\w+\s*=",
            r"console\.log\s*\(",
            r"\bdocument\.\w+",
        ],
    },
    LanguageRule {
        name: "java",
        patterns: &[
            r"public\s+(static\s+)?void\s+main",
            r"\bpublic\s+class\s+\w+",
            r"System\.out\.print",
            r"String\[\]\s+\w+",
            r"(?m)^\s*@\w+",
        ],
    },
    LanguageRule {
        name: "cpp",
        patterns: &[
            r"#include\s*<[\w.]+>",
            r"\bstd::\w+",
            r"\bcout\s*<<",
            r"\bcin\s*>>",
        ],
    },
    LanguageRule {
        name: "sql",
        patterns: &[
            r"(?i)\bselect\s+[\w\s,*]+\s+from\b",
            r"(?i)\binsert\s+into\s+\w+",
            r"(?i)\bupdate\s+\w+\s+set\b",
            r"(?i)\bdelete\s+from\s+\w+",
            r"(?i)\bcreate\s+table\s+\w+",
        ],
    },
    LanguageRule {
        name: "html",
        patterns: &[
            r"(?i)<!doctype\s+html>",
            r"<\s*/\s*\w+\s*>",
            r"<\s*(div|span|html|body|head|p|a|ul|li|table)\b[^>]*>",
        ],
    },
    LanguageRule {
        name: "json",
        patterns: &[
            r#"^\s*[{\[]"#,
            r#""\w+"\s*:\s*[{\["\d]"#,
            r#""\w+"\s*:\s*(true|false|null)"#,
        ],
    },
];

static LANGUAGE_PATTERNS: LazyLock<Vec<(&'static str, Vec<Regex>)>> = LazyLock::new(|| {
    LANGUAGE_RULES
        .iter()
        .map(|rule| {
            let compiled = rule
                .patterns
                .iter()
                .map(|p| Regex::new(p).expect("valid language pattern"))
                .collect();
            (rule.name, compiled)
        })
        .collect()
});

/// Guess the language of a code block from distinctive syntax.
///
/// Each language scores one point per matching pattern; the best score wins
/// and ties go to the language listed first. Returns `None` when nothing
/// scores or the text is blank.
pub fn guess_language(code: &str) -> Option<&'static str> {
    if code.trim().is_empty() {
        return None;
    }

    let mut best: Option<(&'static str, usize)> = None;
    for (name, patterns) in LANGUAGE_PATTERNS.iter() {
        let score = patterns.iter().filter(|re| re.is_match(code)).count();
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((name, score));
        }
    }

    // A single bracket or a lone JSON-ish match is too weak
    match best {
        Some(("json", score)) if score < 2 => None,
        Some((name, _)) => Some(name),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_font_names() {
        assert!(is_monospace_font("Courier"));
        assert!(is_monospace_font("ABCDEF+Courier-Bold"));
        assert!(is_monospace_font("Consolas"));
        assert!(is_monospace_font("DejaVuSansMono"));
        assert!(is_monospace_font("JetBrains Mono"));
        assert!(!is_monospace_font("Helvetica"));
        assert!(!is_monospace_font("Times-Roman"));
        assert!(!is_monospace_font("MonotypeCorsiva"));
        assert!(!is_monospace_font("Monotype Sorts"));
        assert!(!is_monospace_font("ABCDEF+Monotype-Italic"));
        assert!(is_monospace_font("DejaVuSansMono-Bold"));
        assert!(is_monospace_font("Courier New,Bold"));
        assert!(!is_monospace_font(""));
    }

    #[test]
    fn test_guess_language() {
        assert_eq!(
            guess_language("def main(args):\n    self.run()"),
            Some("python")
        );
        assert_eq!(
            guess_language("fn main() {\n    let mut x = 1;\n}"),
            Some("rust")
        );
        assert_eq!(
            guess_language("SELECT id, name FROM users WHERE id = 1;"),
            Some("sql")
        );
        assert_eq!(
            guess_language("#include <stdio.h>\nstd::cout << x;"),
            Some("cpp")
        );
        assert_eq!(
            guess_language("{\n  \"name\": \"x\",\n  \"ok\": true\n}"),
            Some("json")
        );
    }

    #[test]
    fn test_guess_language_none() {
        assert_eq!(guess_language(""), None);
        assert_eq!(guess_language("just some words"), None);
        assert_eq!(guess_language("[1]"), None);
    }
}
