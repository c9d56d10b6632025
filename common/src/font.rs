use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Font families offered for slide text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Arial,
    Calibri,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
    Verdana,
    Tahoma,
    Georgia,
    #[serde(rename = "Comic Sans MS")]
    ComicSansMs,
}

#[derive(Debug, Error)]
#[error("unknown font '{0}'; expected one of: Arial, Calibri, Times New Roman, Verdana, Tahoma, Georgia, Comic Sans MS")]
pub struct ParseFontError(String);

impl FontFamily {
    pub const ALL: [FontFamily; 7] = [
        FontFamily::Arial,
        FontFamily::Calibri,
        FontFamily::TimesNewRoman,
        FontFamily::Verdana,
        FontFamily::Tahoma,
        FontFamily::Georgia,
        FontFamily::ComicSansMs,
    ];

    /// Typeface name as written into the document.
    pub fn typeface(self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::Calibri => "Calibri",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Verdana => "Verdana",
            FontFamily::Tahoma => "Tahoma",
            FontFamily::Georgia => "Georgia",
            FontFamily::ComicSansMs => "Comic Sans MS",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.typeface())
    }
}

impl FromStr for FontFamily {
    type Err = ParseFontError;

    /// Case-insensitive; spaces, dashes and underscores are ignored so
    /// `times-new-roman` works on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squash = |v: &str| {
            v.chars()
                .filter(|c| !matches!(c, ' ' | '-' | '_'))
                .collect::<String>()
                .to_lowercase()
        };
        let wanted = squash(s);
        Self::ALL
            .into_iter()
            .find(|f| squash(f.typeface()) == wanted)
            .ok_or_else(|| ParseFontError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_and_cli_spellings() {
        assert_eq!("Arial".parse::<FontFamily>().unwrap(), FontFamily::Arial);
        assert_eq!(
            "times-new-roman".parse::<FontFamily>().unwrap(),
            FontFamily::TimesNewRoman
        );
        assert_eq!(
            "comic sans ms".parse::<FontFamily>().unwrap(),
            FontFamily::ComicSansMs
        );
        assert!("Papyrus".parse::<FontFamily>().is_err());
    }

    #[test]
    fn cycling_wraps_around() {
        assert_eq!(FontFamily::ComicSansMs.next(), FontFamily::Arial);
        assert_eq!(FontFamily::Arial.previous(), FontFamily::ComicSansMs);
    }

    #[test]
    fn serializes_with_typeface_names() {
        assert_eq!(
            serde_json::to_string(&FontFamily::TimesNewRoman).unwrap(),
            r#""Times New Roman""#
        );
    }
}
