//! Lyrics text normalization.
//!
//! The rendering gateway only understands the English section vocabulary
//! ([Intro], [Verse], [Pre-Chorus], [Chorus], [Bridge], [Outro]) no matter
//! what language the lyrics body is in. LLM output and user-pasted lyrics
//! often carry Chinese markers or descriptive asides instead, so everything
//! headed for the gateway goes through `clean_for_render`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Chinese section markers, fullwidth or ASCII brackets, optional number.
    static ref CN_MARKER: Regex =
        Regex::new(r"[\[【]\s*(前奏|主歌|导歌|副歌|桥段|间奏|尾奏|尾声)\s*([0-9]*)\s*[\]】]")
            .unwrap();

    /// English markers in any casing or fullwidth brackets.
    static ref EN_MARKER: Regex =
        Regex::new(r"(?i)[\[【]\s*(intro|verse|pre-chorus|chorus|bridge|outro)\s*([0-9]*)\s*[\]】]")
            .unwrap();

    /// Fullwidth parentheticals are always descriptive asides.
    static ref FULLWIDTH_ASIDE: Regex = Regex::new(r"（[^）]*）").unwrap();

    /// ASCII parentheticals; only stripped when the content is non-English.
    static ref ASCII_ASIDE: Regex = Regex::new(r"\(([^)]*)\)").unwrap();

    static ref EXTRA_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

fn canonical_name(marker: &str) -> &'static str {
    match marker {
        "前奏" => "Intro",
        "主歌" => "Verse",
        "导歌" => "Pre-Chorus",
        "副歌" => "Chorus",
        "桥段" | "间奏" => "Bridge",
        "尾奏" | "尾声" => "Outro",
        _ => unreachable!("marker regex only matches known names"),
    }
}

fn canonical_english(marker: &str) -> &'static str {
    match marker.to_ascii_lowercase().as_str() {
        "intro" => "Intro",
        "verse" => "Verse",
        "pre-chorus" => "Pre-Chorus",
        "chorus" => "Chorus",
        "bridge" => "Bridge",
        "outro" => "Outro",
        _ => unreachable!("marker regex only matches known names"),
    }
}

fn format_marker(name: &str, number: &str) -> String {
    if number.is_empty() {
        format!("[{}]", name)
    } else {
        format!("[{} {}]", name, number)
    }
}

/// Rewrite all section markers onto the fixed English vocabulary.
///
/// Idempotent: already-canonical markers come back unchanged.
pub fn canonicalize_section_markers(text: &str) -> String {
    let text = CN_MARKER.replace_all(text, |caps: &regex::Captures| {
        format_marker(canonical_name(&caps[1]), &caps[2])
    });
    EN_MARKER
        .replace_all(&text, |caps: &regex::Captures| {
            format_marker(canonical_english(&caps[1]), &caps[2])
        })
        .into_owned()
}

/// Remove descriptive parenthetical asides.
///
/// Fullwidth parentheses are always decoration. ASCII parentheses are kept
/// when the content is plain English, since those are performance cues the
/// renderer understands ("(whispered)").
pub fn strip_descriptive_asides(text: &str) -> String {
    let text = FULLWIDTH_ASIDE.replace_all(text, "");
    ASCII_ASIDE
        .replace_all(&text, |caps: &regex::Captures| {
            if caps[1].is_ascii() {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// Full cleaning pass applied before any gateway submission.
pub fn clean_for_render(text: &str) -> String {
    let text = canonicalize_section_markers(text);
    let text = strip_descriptive_asides(&text);
    EXTRA_BLANK_LINES
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}
