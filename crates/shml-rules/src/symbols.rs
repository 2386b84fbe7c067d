//! Accent and symbol tables.
//!
//! Accents are written `/<mark><letter>/`, for example `/:o/` for `ö` or
//! `/'e/` for `é`. Marks are stored in their HTML-escaped form because rules
//! match against escaped input.

/// Accented letters, keyed by escaped mark.
///
/// Each value lists plain letters, each followed by its accented form.
const ACCENTS: &[(&str, &str)] = &[
    ("~", "AÃIĨNÑOÕUŨaãiĩnñoõuũ"),
    (":", "AÄEËIÏOÖUÜYŸaäeëiïoöuüyÿ"),
    ("&#x27;", "AÁCĆEÉIÍLĹNŃOÓRŔSŚUÚYÝZŹaácćeégǵiílĺnńoórŕsśuúyýzź"),
    ("&quot;", "OŐUŰoőuű"),
    ("`", "AÀEÈIÌOÒUÙaàeèiìoòuù"),
    ("^", "AÂCĈEÊGĜHĤIÎJĴOÔSŜUÛWŴYŶaâcĉeêgĝhĥiîjĵoôsŝuûwŵx◯yŷ"),
    ("o", "AÅUŮaåuů"),
    ("/", "OØhℏoø"),
    (",", "CÇGĢKĶLĻNŅRŖSŞTŢcçkķlļnņrŗsştţ"),
    ("-", "AĀEĒIĪOŌUŪaāeēiīoōuū"),
    ("u", "AĂGĞUŬaăgğuŭ"),
    (".", "CĊEĖGĠIİZŻcċeėgġo⊙s⋅t\u{20DB}zż"),
    ("?", "AĄEĘIĮUŲaąeęiįuų"),
    ("v", "CČDĎEĚLĽNŇRŘSŠTŤZŽcčdďeělľnňrřsštťzž"),
    ("_", "DĐHĦLŁTŦdđhħlłtŧ"),
];

/// Accented form of `letter` under `mark` (escaped form).
pub fn accent(mark: &str, letter: char) -> Option<char> {
    let (_, letters) = ACCENTS.iter().find(|(m, _)| *m == mark)?;
    let mut chars = letters.chars();
    while let (Some(plain), Some(accented)) = (chars.next(), chars.next()) {
        if plain == letter {
            return Some(accented);
        }
    }
    None
}

/// Output for the body of a `/…/` symbol, if it names one.
///
/// `!` and `?` give the inverted punctuation entities; anything else is an
/// escaped mark followed by a single letter.
pub fn symbol(what: &str) -> Option<String> {
    match what {
        "!" => Some("&iexcl;".to_owned()),
        "?" => Some("&iquest;".to_owned()),
        _ => {
            let letter = what.chars().next_back()?;
            let mark = &what[..what.len() - letter.len_utf8()];
            accent(mark, letter).map(String::from)
        }
    }
}

/// Entity for a typographic shortcut such as `(c)` or `->` (escaped form).
pub fn shortcut(text: &str) -> Option<&'static str> {
    Some(match text {
        "TM" => "&trade;",
        "SS" => "&sect;",
        "(c)" | "(C)" => "&copy;",
        "(r)" | "(R)" => "&reg;",
        "-&gt;" => "&rarr;",
        "&lt;-" => "&larr;",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_accent() {
        assert_eq!(accent(":", 'o'), Some('ö'));
        assert_eq!(accent("&#x27;", 'E'), Some('É'));
        assert_eq!(accent("v", 'z'), Some('ž'));
        assert_eq!(accent(":", 'x'), None);
        assert_eq!(accent("#", 'a'), None);
    }

    #[test]
    fn test_symbol() {
        assert_eq!(symbol("!").as_deref(), Some("&iexcl;"));
        assert_eq!(symbol("?").as_deref(), Some("&iquest;"));
        assert_eq!(symbol("~n").as_deref(), Some("ñ"));
        assert_eq!(symbol("&quot;o").as_deref(), Some("ő"));
        assert_eq!(symbol("ab"), None);
        assert_eq!(symbol(""), None);
    }

    #[test]
    fn test_shortcut() {
        assert_eq!(shortcut("(C)"), Some("&copy;"));
        assert_eq!(shortcut("-&gt;"), Some("&rarr;"));
        assert_eq!(shortcut("PG"), None);
    }
}
