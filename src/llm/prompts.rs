//! Fixed prompt pairs for the creative operations.
//!
//! Every provider gets the same prompts; the response contract (a single
//! JSON object where one is asked for) is what `json_repair` parses.

pub const LYRICS_SYSTEM: &str = "You are a professional songwriter. You write complete, \
singable song lyrics in the language of the user's idea. Structure the song with section \
markers from this exact English vocabulary regardless of the lyrics language: [Intro], \
[Verse], [Pre-Chorus], [Chorus], [Bridge], [Outro]. Respond with a single JSON object \
{\"title\": string, \"lyrics\": string} and nothing else.";

pub fn lyrics_user(idea: &str, style: Option<&str>, mood: Option<&str>) -> String {
    let mut prompt = format!("Write song lyrics for this idea: {}", idea);
    if let Some(style) = style {
        prompt.push_str(&format!("\nMusical style: {}", style));
    }
    if let Some(mood) = mood {
        prompt.push_str(&format!("\nMood: {}", mood));
    }
    prompt
}

pub const STYLE_SYSTEM: &str = "You are a music producer. Given a song description, recommend \
a production style. Respond with a single JSON object {\"tags\": [string], \"mood\": string, \
\"tempo\": string} and nothing else. Tags are short English genre/instrument keywords.";

pub fn style_user(description: &str) -> String {
    format!("Recommend a style for: {}", description)
}

pub const ENHANCE_SYSTEM: &str = "You rewrite short music-generation prompts to be vivid and \
concrete: add genre, instrumentation, mood and tempo detail while keeping the original \
intent. Answer with the rewritten prompt only, no commentary.";

pub const POLISH_SYSTEM: &str = "You are a lyrics editor. Improve the flow, imagery and rhyme \
of the lyrics you are given without changing their meaning, language or section structure. \
Keep every section marker. Use only these English section markers: [Intro], [Verse], \
[Pre-Chorus], [Chorus], [Bridge], [Outro]. Answer with the polished lyrics only.";

pub fn polish_user(lyrics: &str, style: Option<&str>) -> String {
    match style {
        Some(style) => format!("Polish these lyrics for a {} song:\n\n{}", style, lyrics),
        None => format!("Polish these lyrics:\n\n{}", lyrics),
    }
}
