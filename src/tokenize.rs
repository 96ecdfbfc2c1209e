use lazy_regex::regex;

/// Tokens of this many characters or fewer are dropped.
const MAX_SHORT_TOKEN: usize = 2;

/// Removes everything between `<` and `>`, brackets included.
///
/// This is a plain character scan: nesting, entities and comments are not
/// understood, and a `>` without an opening `<` is dropped as well.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if in_tag => (),
            _ => out.push(c),
        }
    }
    out
}

/// Lowercases, strips markup and splits `text` into word tokens.
///
/// Alternatives are tried in order: amounts such as `$100,000` or `3.14`,
/// hyphenated pairs such as `e-mail`, plain word runs.
pub fn tokenize(text: &str) -> Vec<String> {
    let stripped = strip_markup(&text.to_lowercase());
    regex!(r"\$?\d*(?:[.,]\d+)+|\w+-\w+|\w+")
        .find_iter(&stripped)
        .map(|m| m.as_str())
        .filter(|token| token.chars().count() > MAX_SHORT_TOKEN)
        .map(str::to_owned)
        .collect()
}

#[test]
fn test_strip_markup() {
    assert_eq!(strip_markup("<b>free</b> money"), "free money");
    assert_eq!(strip_markup("a <x<y>z> b"), "a z b");
    assert_eq!(strip_markup("1 > 0"), "1  0");
    assert_eq!(strip_markup("unclosed <tag and rest"), "unclosed ");
}

#[test]
fn test_tokenize_markup() {
    assert_eq!(tokenize("<b>free</b> money"), ["free", "money"]);
}

#[test]
fn test_tokenize_amounts() {
    let tokens = tokenize("win $1,000,000 now");
    assert_eq!(tokens, ["win", "$1,000,000", "now"]);
    assert_eq!(tokenize("pi is 3.14"), ["3.14"]);
    assert_eq!(tokenize("only .50 left"), ["only", ".50", "left"]);
}

#[test]
fn test_tokenize_hyphen_and_case() {
    assert_eq!(
        tokenize("Send E-Mail to Real-Time LISTS"),
        ["send", "e-mail", "real-time", "lists"]
    );
}

#[test]
fn test_tokenize_drops_short() {
    assert_eq!(tokenize("a an the of it is to"), ["the"]);
    assert!(tokenize("").is_empty());
    assert!(tokenize("<html><body></body></html>").is_empty());
}

#[test]
fn test_tokenize_keeps_repetition() {
    assert_eq!(tokenize("spam spam ham spam"), ["spam", "spam", "ham", "spam"]);
}

#[test]
fn test_tokenize_latin1_letters() {
    assert_eq!(tokenize("Café Crème"), ["café", "crème"]);
}
