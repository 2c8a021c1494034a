use whatlang::{Lang, detect};

const MIN_CONFIDENCE: f64 = 0.25;
const MIN_TEXT_CHARS: usize = 50;

/// Best-effort ISO 639-1 code for extracted text, or the ISO 639-3 code for
/// languages without a two-letter mapping here.
pub fn detect_language(text: &str) -> Option<String> {
    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return None;
    }

    let info = detect(text)?;
    if !info.is_reliable() && info.confidence() < MIN_CONFIDENCE {
        return None;
    }
    Some(two_letter(info.lang()).unwrap_or(info.lang().code()).to_string())
}

fn two_letter(lang: Lang) -> Option<&'static str> {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Tur => "tr",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Cmn => "zh",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_english() {
        let text = "This is a test of the English language detection system. It should work well for news articles.";
        assert_eq!(detect_language(text), Some("en".to_string()));
    }

    #[test]
    fn test_detect_spanish() {
        let text = "Esto es una prueba del sistema de detección de idiomas en español. Debería funcionar bien.";
        assert_eq!(detect_language(text), Some("es".to_string()));
    }

    #[test]
    fn test_short_text_returns_none() {
        assert_eq!(detect_language("Short"), None);
    }
}
