use std::sync::LazyLock;

use regex::Regex;

use crate::model::record::{SegmentedEntry, UNKNOWN_TRANSLATION};

// Uma letra latina ou barra invertida solta no fim (resto de "\t" ou "\n" mal escapado).
static TRAILING_LATIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z\\]\s*$").expect("static regex"));

static TRAILING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[，。！？；：、"'【】《》\s]+$"#).expect("static regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

static IDEOGRAPH_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{4E00}-\x{9FFF}]{2,}").expect("static regex"));

const PARTICLES: [&str; 15] = [
    "は", "が", "を", "に", "で", "と", "から", "まで", "より", "の", "も", "や", "か", "ね", "よ",
];

type Strategy = fn(&str) -> Option<(String, String)>;

// Ordem fixa: mudar a ordem muda as frases geradas para corpora já existentes.
const STRATEGIES: [Strategy; 4] = [
    split_on_tab,
    split_after_last_kana,
    split_after_last_particle,
    whole_line,
];

/// Divide uma linha do corpus em `(japonês, tradução)`.
///
/// Só retorna `None` para linha vazia. A parte japonesa pode sair vazia
/// (linha só com pontuação); quem chama decide o que fazer.
pub fn segment(line: &str) -> Option<SegmentedEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(line))
        .map(|(japanese, translation)| SegmentedEntry::new(japanese, translation))
}

pub fn clean_japanese(text: &str) -> String {
    let text = TRAILING_LATIN.replace(text.trim(), "");
    let text = TRAILING_PUNCT.replace(text.trim(), "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

pub fn is_kana(ch: char) -> bool {
    matches!(ch, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

/// `japonês<TAB>tradução`. Só o primeiro tab conta.
pub fn split_on_tab(line: &str) -> Option<(String, String)> {
    let (head, tail) = line.split_once('\t')?;

    let mut japanese = clean_japanese(head);
    if japanese.is_empty() {
        japanese = head.trim().to_string();
    }

    Some((japanese, tail.trim().to_string()))
}

/// Kana só aparece no lado japonês: o primeiro bloco de ideogramas depois
/// do último kana é o início da tradução.
pub fn split_after_last_kana(line: &str) -> Option<(String, String)> {
    let (pos, ch) = line.char_indices().filter(|&(_, c)| is_kana(c)).last()?;
    let search_start = pos + ch.len_utf8();

    let run = IDEOGRAPH_RUN.find(&line[search_start..])?;
    split_at(line, search_start + run.start())
}

pub fn split_after_last_particle(line: &str) -> Option<(String, String)> {
    let last = PARTICLES
        .iter()
        .filter_map(|p| line.rfind(p))
        .max()?;

    if last == 0 {
        return None;
    }

    // Avança um caractere, não a partícula inteira.
    let first_len = line[last..].chars().next().map(char::len_utf8)?;
    let search_start = last + first_len;

    let run = IDEOGRAPH_RUN.find(&line[search_start..])?;
    split_at(line, search_start + run.start())
}

pub fn whole_line(line: &str) -> Option<(String, String)> {
    Some((clean_japanese(line), UNKNOWN_TRANSLATION.to_string()))
}

fn split_at(line: &str, idx: usize) -> Option<(String, String)> {
    let japanese = clean_japanese(&line[..idx]);
    let translation = line[idx..].trim().to_string();

    if japanese.is_empty() || translation.is_empty() {
        return None;
    }

    Some((japanese, translation))
}
