use std::sync::LazyLock;

use regex::Regex;

pub const ARTIFACT_EXTENSION: &str = "mp3";

static ILLEGAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("static regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

static STRAY_BEFORE_EXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" [a-zA-Z\\]\.mp3$").expect("static regex"));

/// Converte texto em nome de arquivo seguro.
/// - Remove só os caracteres inválidos (`\ / * ? : " < > |`), sem substituir
/// - Mantém espaços, mas colapsa sequências em um só
/// - Pode retornar string vazia
pub fn sanitize(text: &str) -> String {
    let s = ILLEGAL.replace_all(text.trim(), "");
    // trim final: remover um caractere da borda pode expor um espaço novo
    WHITESPACE.replace_all(&s, " ").trim().to_string()
}

/// Nome do áudio em cache para um texto, ou `None` se a chave ficar vazia.
pub fn artifact_filename(text: &str) -> Option<String> {
    let key = sanitize(text);
    if key.is_empty() {
        return None;
    }

    let name = format!("{key}.{ARTIFACT_EXTENSION}");
    let name = STRAY_BEFORE_EXT.replace(&name, ".mp3").into_owned();
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ILLEGAL_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

    #[test]
    fn removes_illegal_characters_without_replacement() {
        assert_eq!(sanitize(r#"a/b\c*d?e:f"g<h>i|j"#), "abcdefghij");
        assert_eq!(sanitize("愛よ？ 愛よ?"), "愛よ？ 愛よ");
    }

    #[test]
    fn keeps_single_spaces_and_collapses_runs() {
        assert_eq!(sanitize("  君の   名は  "), "君の 名は");
        assert_eq!(sanitize("a \t\n b"), "a b");
        assert_eq!(sanitize("a : b"), "a b");
    }

    #[test]
    fn all_illegal_input_is_empty() {
        assert_eq!(sanitize(r#"\/*?:"<>|"#), "");
        assert_eq!(artifact_filename("???"), None);
        assert_eq!(artifact_filename("   "), None);
    }

    #[test]
    fn is_idempotent() {
        for input in [
            "? a",
            "飛翔いたら 戻らないと言って",
            r#" "quoted" / path \ "#,
            "a\u{3000}b",
            "",
        ] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "{input:?}");
            assert!(!once.contains(ILLEGAL_CHARS), "{input:?}");
        }
    }

    #[test]
    fn equivalent_texts_share_a_key() {
        assert_eq!(sanitize("おやすみ  なさい"), sanitize(" おやすみ なさい"));
        assert_eq!(sanitize("<おやすみ>"), sanitize("おやすみ"));
        assert_ne!(sanitize("おやすみ"), sanitize("おやすみなさい"));
    }

    #[test]
    fn artifact_filename_strips_stray_letter_before_extension() {
        assert_eq!(artifact_filename("おやすみ").as_deref(), Some("おやすみ.mp3"));
        assert_eq!(artifact_filename("おやすみ n").as_deref(), Some("おやすみ.mp3"));
        assert_eq!(artifact_filename("愛よ 愛よ").as_deref(), Some("愛よ 愛よ.mp3"));
    }
}
