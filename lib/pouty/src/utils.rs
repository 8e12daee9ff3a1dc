use std::borrow::Cow;
use std::path::{Path, MAIN_SEPARATOR};

/// Remove SGR escape sequences.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    regex!("\x1b\\[[0-9;]*m").replace_all(text, "")
}

/// Replace the user's home directory with `~` in messages that mention a
/// path.
pub fn contract_home(text: &str) -> Cow<'_, str> {
    match dirs::home_dir() {
        Some(home) => contract_home_in(text, &home),
        None => Cow::Borrowed(text),
    }
}

pub fn contract_home_in<'a>(text: &'a str, home: &Path) -> Cow<'a, str> {
    let home = home.to_string_lossy();
    let home = home.trim_end_matches(MAIN_SEPARATOR);
    if home.is_empty() || !text.contains(MAIN_SEPARATOR) || !text.contains(home) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace(home, "~"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strips_color_codes() {
        assert_eq!("app: done", strip_ansi("\x1b[0;36mapp: \x1b[0mdone"));
        assert_eq!("bold", strip_ansi("\x1b[1mbold\x1b[0m"));
        assert!(matches!(strip_ansi("plain"), Cow::Borrowed("plain")));
    }

    #[cfg(unix)]
    #[test]
    fn contracts_home() {
        let home = Path::new("/home/someone/");
        assert_eq!(
            "saved ~/data/out.csv",
            contract_home_in("saved /home/someone/data/out.csv", home)
        );
        assert_eq!("no path here", contract_home_in("no path here", home));
        assert_eq!("/tmp/other", contract_home_in("/tmp/other", home));
    }
}
