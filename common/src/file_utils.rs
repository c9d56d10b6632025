use std::path::{Path, PathBuf};

pub const DECK_EXTENSION: &str = "pptx";
pub const PDF_EXTENSION: &str = "pdf";

/// Lowercase the trimmed prompt, drop everything except ASCII letters,
/// digits and whitespace, and collapse each whitespace run into one `_`.
pub fn slugify(prompt: &str) -> String {
    let lowered = prompt.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_space = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('_');
                in_space = true;
            }
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_space = false;
        }
    }

    slug
}

/// Deck file name for a prompt, e.g. `the_future_of_ai.pptx`.
pub fn slugify_filename(prompt: &str) -> String {
    let slug = slugify(prompt);
    let stem = if slug.is_empty() { "presentation" } else { slug.as_str() };
    format!("{stem}.{DECK_EXTENSION}")
}

/// Where the deck goes: the explicit path if given, else the slugified
/// prompt inside `output_dir` (or the working directory).
pub fn deck_output_path(prompt: &str, explicit: Option<&Path>, output_dir: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let name = slugify_filename(prompt);
            match output_dir {
                Some(dir) => dir.join(name),
                None => PathBuf::from(name),
            }
        }
    }
}

/// The fixed-layout twin of a deck file: same base name, `.pdf`.
pub fn pdf_path_for(deck: &Path) -> PathBuf {
    deck.with_extension(PDF_EXTENSION)
}
