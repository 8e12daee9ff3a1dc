use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnyBarError;

macro_rules! colors {
    ($(
        $token:ident $( , $alias:ident )* = $color:ident
    ),* $(,)?) => {
        /// A swatch understood by AnyBar.
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub enum Color {
            $( $color ),*
        }

        pub const ALL_COLORS: &[Color] = &[
            $( Color::$color ),*
        ];

        impl Color {
            /// The token AnyBar expects on the wire.
            pub fn token(self) -> &'static str {
                match self {
                    $( Color::$color => stringify!($token) ),*
                }
            }

            /// Every name this color can be parsed from, token first.
            pub fn names(self) -> &'static [&'static str] {
                match self {
                    $( Color::$color => &[ stringify!($token) $( , stringify!($alias) )* ] ),*
                }
            }
        }
    };
}

colors! {
    white = White,
    red, busy = Red,
    orange = Orange,
    yellow = Yellow,
    green, ok, available = Green,
    cyan = Cyan,
    blue = Blue,
    purple = Purple,
    black, none, blank = Black,
    question = Question,
    exclamation = Exclamation,
}

impl Default for Color {
    fn default() -> Color {
        Color::White
    }
}

impl Display for Color {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str(self.token())
    }
}

impl FromStr for Color {
    type Err = AnyBarError;

    fn from_str(name: &str) -> Result<Color, AnyBarError> {
        let lower = name.trim().to_lowercase();
        ALL_COLORS
            .iter()
            .copied()
            .find(|color| color.names().iter().any(|n| *n == lower))
            .ok_or_else(|| AnyBarError::UnknownColor(name.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = AnyBarError;

    fn try_from(name: String) -> Result<Color, AnyBarError> {
        name.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.token().to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_tokens_and_aliases() {
        assert_eq!(Color::Red, "red".parse().unwrap());
        assert_eq!(Color::Red, "Busy".parse().unwrap());
        assert_eq!(Color::Green, "available".parse().unwrap());
        assert_eq!(Color::Black, " none ".parse().unwrap());
        assert_eq!(Color::Exclamation, "exclamation".parse().unwrap());
    }

    #[test]
    fn rejects_unknown_names() {
        match "magenta".parse::<Color>() {
            Err(AnyBarError::UnknownColor(name)) => assert_eq!("magenta", name),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn token_is_first_name() {
        for color in ALL_COLORS {
            assert_eq!(color.token(), color.names()[0]);
            assert_eq!(*color, color.token().parse().unwrap());
        }
    }

    #[test]
    fn serializes_as_token() {
        assert_eq!("\"orange\"", serde_json::to_string(&Color::Orange).unwrap());
        let color: Color = serde_json::from_str("\"ok\"").unwrap();
        assert_eq!(Color::Green, color);
        assert!(serde_json::from_str::<Color>("\"mauve\"").is_err());
    }
}
