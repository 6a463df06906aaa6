/*!
 * TIPA token map and the block converter.
 *
 * The token map covers the shortcuts used in the thesis (Polish phonetics)
 * plus the common TIPA digit and uppercase shortcuts, length and stress
 * marks, nasal tildes and superscript modifiers. Lowercase ASCII letters
 * stand for themselves, except `g` which maps to the IPA script g.
 */

use once_cell::sync::Lazy;

use super::table::SubstitutionTable;

/// TIPA sequence to IPA pairs
const TIPA_TOKENS: &[(&str, &str)] = &[
    // sequences found in the thesis
    ("\\~O\\~w", "ɔ̃w̃"),
    ("\\~E\\~w", "ɛ̃w̃"),
    ("ON", "ɔŋ"),
    ("EN", "ɛŋ"),
    ("E", "ɛ"),
    ("O", "ɔ"),
    ("1", "ɨ"),
    ("g", "ɡ"),
    // digit shortcuts
    ("0", "ʉ"),
    ("2", "ʌ"),
    ("3", "ɜ"),
    ("4", "ɥ"),
    ("5", "ɐ"),
    ("6", "ɒ"),
    ("7", "ɤ"),
    ("8", "ɵ"),
    ("9", "ɘ"),
    ("@", "ə"),
    // uppercase shortcuts
    ("A", "ɑ"),
    ("B", "β"),
    ("C", "ç"),
    ("D", "ð"),
    ("F", "ɸ"),
    ("G", "ɣ"),
    ("H", "ɦ"),
    ("I", "ɪ"),
    ("J", "ʝ"),
    ("K", "ʁ"),
    ("L", "ʎ"),
    ("M", "ɱ"),
    ("N", "ŋ"),
    ("P", "ʔ"),
    ("Q", "ʕ"),
    ("R", "ɾ"),
    ("S", "ʃ"),
    ("T", "θ"),
    ("U", "ʊ"),
    ("V", "ʋ"),
    ("W", "ɯ"),
    ("X", "χ"),
    ("Y", "ʏ"),
    ("Z", "ʒ"),
    // length and stress
    (":", "ː"),
    (";", "ˑ"),
    ("\"\"", "ˌ"),
    ("\"", "ˈ"),
    // nasal tilde
    ("\\~a", "ã"),
    ("\\~e", "ẽ"),
    ("\\~i", "ĩ"),
    ("\\~o", "õ"),
    ("\\~u", "ũ"),
    ("\\~y", "ỹ"),
    ("\\~w", "w̃"),
    ("\\~E", "ɛ̃"),
    ("\\~O", "ɔ̃"),
    ("\\~{a}", "ã"),
    ("\\~{e}", "ẽ"),
    ("\\~{o}", "õ"),
    ("\\~{E}", "ɛ̃"),
    ("\\~{O}", "ɔ̃"),
    // superscripts
    ("\\super h", "ʰ"),
    ("\\super{h}", "ʰ"),
    ("\\super j", "ʲ"),
    ("\\super{j}", "ʲ"),
    ("\\super w", "ʷ"),
    ("\\super{w}", "ʷ"),
    ("\\textsuperscript{h}", "ʰ"),
    ("\\textsuperscript{j}", "ʲ"),
    // named symbols
    ("\\textschwa", "ə"),
    ("\\textbari", "ɨ"),
    ("\\textbaru", "ʉ"),
    ("\\textesh", "ʃ"),
    ("\\textyogh", "ʒ"),
    ("\\textturnr", "ɹ"),
    ("\\textprimstress", "ˈ"),
    ("\\textsecstress", "ˌ"),
    ("\\textlengthmark", "ː"),
    // empty separator group
    ("{}", ""),
];

/// Characters that turn a preceding `i` into the glide `j`
const GLIDE_TRIGGERS: &[char] = &[
    'a', 'e', 'ɛ', 'o', 'ɔ', 'u', 'ɨ', 'y', 'ã', 'ẽ', 'õ', 'ũ', 'ỹ',
];

static TOKEN_TABLE: Lazy<SubstitutionTable> = Lazy::new(|| {
    SubstitutionTable::new(TIPA_TOKENS.iter().copied()).protecting_control_words()
});

/// Converts the inner content of `\textipa{...}` blocks to IPA
#[derive(Debug, Clone)]
pub struct TipaConverter {
    palatal_glide: bool,
}

impl TipaConverter {
    /// Create a converter; `palatal_glide` enables the `i` before vowel rule
    pub fn new(palatal_glide: bool) -> Self {
        Self { palatal_glide }
    }

    /// Whether the palatal glide rule is applied
    pub fn palatal_glide(&self) -> bool {
        self.palatal_glide
    }

    /// Convert one block's inner content.
    ///
    /// Rewrites until the result is stable: dropping `{}` can join its
    /// neighbours into a new token (`\~{}w` becomes `\~w`), and the glide
    /// can complete one (`\super ia`). Every pass that changes the text
    /// removes ASCII token text or an `i`, so the loop ends.
    pub fn convert_block(&self, inner: &str) -> String {
        let mut current = self.convert_once(inner);
        loop {
            let next = self.convert_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn convert_once(&self, text: &str) -> String {
        let converted = TOKEN_TABLE.apply(text);
        if self.palatal_glide {
            apply_palatal_glide(&converted)
        } else {
            converted
        }
    }
}

impl Default for TipaConverter {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Rewrite `i` as `j` when the next character is a vowel
pub fn apply_palatal_glide(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        let before_vowel = chars.peek().is_some_and(|next| GLIDE_TRIGGERS.contains(next));
        if ch == 'i' && before_vowel {
            out.push('j');
        } else {
            out.push(ch);
        }
    }
    out
}
