//! Text helpers shared by the message parser and the command handlers.

/// Splits text into fields, keeping quoted substrings together.
///
/// Fields are separated by runs of spaces, tabs, commas or semicolons. A field
/// opened by `"`, `'`, `` ` `` or `«` runs until the matching closing quote
/// (`»` for `«`) and may contain separators. The quotes themselves are not part
/// of the field. Empty fields are dropped, and an unterminated quote keeps the
/// rest of the text as a single field.
///
/// # Examples
///
/// ```
/// # use roller_bot::utils::split_fields;
/// let fields = split_fields(r#"Вася "Нина Ивановна", Петя"#);
/// assert_eq!(fields, vec!["Вася", "Нина Ивановна", "Петя"]);
/// ```
pub fn split_fields(text: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut closing_quote: Option<char> = None;

    for c in text.chars() {
        match closing_quote {
            Some(quote) if c == quote => {
                push_field(&mut fields, &mut field);
                closing_quote = None;
            }
            Some(_) => field.push(c),
            None => match c {
                ' ' | '\t' | '\n' | ',' | ';' => push_field(&mut fields, &mut field),
                c if is_opening_quote(c) => {
                    push_field(&mut fields, &mut field);
                    closing_quote = Some(matching_quote(c));
                }
                _ => field.push(c),
            },
        }
    }

    push_field(&mut fields, &mut field);

    fields
}

/// Splits a command line into words on whitespace, keeping quoted substrings
/// together.
///
/// Unlike [`split_fields`], the quotes stay in the word so a later
/// [`split_fields`] on the rejoined words sees them again. Words starting with
/// `-` are ordinary words.
///
/// # Examples
///
/// ```
/// # use roller_bot::utils::split_words;
/// let words = split_words("sample Вася \"Нина Ивановна\" -1");
/// assert_eq!(words, vec!["sample", "Вася", "\"Нина Ивановна\"", "-1"]);
/// ```
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut closing_quote: Option<char> = None;

    for c in text.chars() {
        match closing_quote {
            Some(quote) => {
                word.push(c);
                if c == quote {
                    closing_quote = None;
                }
            }
            None if c.is_whitespace() => push_field(&mut words, &mut word),
            None => {
                if is_opening_quote(c) {
                    closing_quote = Some(matching_quote(c));
                }
                word.push(c);
            }
        }
    }

    push_field(&mut words, &mut word);

    words
}

fn is_opening_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`' | '«')
}

fn matching_quote(opening: char) -> char {
    match opening {
        '«' => '»',
        other => other,
    }
}

fn push_field(fields: &mut Vec<String>, field: &mut String) {
    if !field.is_empty() {
        fields.push(std::mem::take(field));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields_plain_words() {
        assert_eq!(split_fields("Вася Петя Нина"), vec!["Вася", "Петя", "Нина"]);
    }

    #[test]
    fn test_split_fields_collapses_separators() {
        assert_eq!(split_fields("  a,,b ;  c\t"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_fields_double_quotes() {
        assert_eq!(
            split_fields(r#"чай "кофе с молоком" сок"#),
            vec!["чай", "кофе с молоком", "сок"]
        );
    }

    #[test]
    fn test_split_fields_single_quotes_and_backticks() {
        assert_eq!(
            split_fields("'one two' `three, four`"),
            vec!["one two", "three, four"]
        );
    }

    #[test]
    fn test_split_fields_guillemets() {
        assert_eq!(
            split_fields("«Война и мир» «Анна Каренина»"),
            vec!["Война и мир", "Анна Каренина"]
        );
    }

    #[test]
    fn test_split_fields_other_quote_inside_quoted_field() {
        assert_eq!(split_fields(r#""it's fine" ok"#), vec!["it's fine", "ok"]);
    }

    #[test]
    fn test_split_fields_drops_empty_quotes() {
        assert_eq!(split_fields(r#""" a '' b"#), vec!["a", "b"]);
    }

    #[test]
    fn test_split_fields_unterminated_quote() {
        assert_eq!(split_fields(r#"a "b c"#), vec!["a", "b c"]);
    }

    #[test]
    fn test_split_fields_quote_glued_to_word() {
        assert_eq!(split_fields(r#"ab"c d"e"#), vec!["ab", "c d", "e"]);
    }

    #[test]
    fn test_split_words_plain() {
        assert_eq!(split_words("roll 20 3"), vec!["roll", "20", "3"]);
    }

    #[test]
    fn test_split_words_keeps_dash_words() {
        assert_eq!(split_words("roll -40 -2"), vec!["roll", "-40", "-2"]);
    }

    #[test]
    fn test_split_words_keeps_quoted_words_with_quotes() {
        assert_eq!(
            split_words(r#"Вася "Нина Ивановна" «Анна Каренина» 'a b'"#),
            vec!["Вася", r#""Нина Ивановна""#, "«Анна Каренина»", "'a b'"]
        );
    }

    #[test]
    fn test_split_words_any_whitespace() {
        assert_eq!(split_words("a\nb\t c  \r\n"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_words_keeps_commas() {
        assert_eq!(split_words("чай,кофе сок"), vec!["чай,кофе", "сок"]);
    }

    #[test]
    fn test_split_words_unterminated_quote() {
        assert_eq!(split_words(r#"a "b c"#), vec!["a", r#""b c"#]);
    }

    #[test]
    fn test_split_words_then_fields_restores_options() {
        let words = split_words(r#"Вася Петя "Нина Ивановна""#);
        assert_eq!(
            split_fields(&words.join(" ")),
            vec!["Вася", "Петя", "Нина Ивановна"]
        );
    }

    #[test]
    fn test_split_fields_empty() {
        assert!(split_fields("").is_empty());
        assert!(split_fields(" , ; ").is_empty());
    }
}
