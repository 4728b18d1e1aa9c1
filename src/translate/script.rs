//! Script transliteration of translated text.

use unicode_normalization::UnicodeNormalization;

/// A script rendering applied after translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptVariant {
    /// Serbian in Latin script (`sr_Latn`)
    SerbianLatin,
}

impl ScriptVariant {
    /// The variant a target code asks for, if any.
    ///
    /// Matching is case-insensitive and accepts `_` or `-` as separator,
    /// so `sr_Latn`, `sr-Latn` and `SR_LATN` all select [`SerbianLatin`].
    ///
    /// [`SerbianLatin`]: ScriptVariant::SerbianLatin
    pub fn from_lang_code(code: &str) -> Option<Self> {
        let normalized = code.trim().replace('-', "_").to_ascii_lowercase();
        let mut subtags = normalized.split('_');
        match (subtags.next(), subtags.next()) {
            (Some("sr"), Some("latn")) => Some(ScriptVariant::SerbianLatin),
            _ => None,
        }
    }

    /// Transliterate `text` into this variant.
    pub fn apply(&self, text: &str) -> String {
        match self {
            ScriptVariant::SerbianLatin => to_latin(text),
        }
    }
}

/// Transliterate Serbian Cyrillic to Serbian Latin.
///
/// Characters outside the Serbian Cyrillic alphabet are kept. The digraph
/// letters Љ, Њ and Џ become `LJ`/`NJ`/`DŽ` inside all-caps words and
/// `Lj`/`Nj`/`Dž` otherwise.
pub fn to_latin(text: &str) -> String {
    let chars: Vec<char> = text.nfc().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            'Љ' | 'Њ' | 'Џ' => {
                let upper = all_caps_context(&chars, i);
                out.push_str(match (ch, upper) {
                    ('Љ', true) => "LJ",
                    ('Љ', false) => "Lj",
                    ('Њ', true) => "NJ",
                    ('Њ', false) => "Nj",
                    (_, true) => "DŽ",
                    (_, false) => "Dž",
                });
            }
            _ => match latin_letter(ch) {
                Some(latin) => out.push_str(latin),
                None => out.push(ch),
            },
        }
    }

    out
}

/// Whether the digraph at `i` sits in an upper-case word.
fn all_caps_context(chars: &[char], i: usize) -> bool {
    match chars.get(i + 1) {
        Some(next) if next.is_alphabetic() => next.is_uppercase(),
        _ => i
            .checked_sub(1)
            .and_then(|p| chars.get(p))
            .map(|prev| prev.is_alphabetic() && prev.is_uppercase())
            .unwrap_or(false),
    }
}

fn latin_letter(ch: char) -> Option<&'static str> {
    let latin = match ch {
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Ђ' => "Đ",
        'Е' => "E",
        'Ж' => "Ž",
        'З' => "Z",
        'И' => "I",
        'Ј' => "J",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'Ћ' => "Ć",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "C",
        'Ч' => "Č",
        'Ш' => "Š",
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'ђ' => "đ",
        'е' => "e",
        'ж' => "ž",
        'з' => "z",
        'и' => "i",
        'ј' => "j",
        'к' => "k",
        'л' => "l",
        'љ' => "lj",
        'м' => "m",
        'н' => "n",
        'њ' => "nj",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'ћ' => "ć",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "č",
        'џ' => "dž",
        'ш' => "š",
        _ => return None,
    };
    Some(latin)
}
