use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

macro_rules! colors {
    ($(
        $name:ident $( , $alias:ident )* = $color:ident ( $code:literal )
    ),* $(,)?) => {
        /// Named terminal colors.
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub enum Color {
            $( $color ),*
        }

        pub const ALL_COLORS: &[Color] = &[
            $( Color::$color ),*
        ];

        impl Color {
            pub fn name(self) -> &'static str {
                match self {
                    $( Color::$color => stringify!($name) ),*
                }
            }

            pub fn names(self) -> &'static [&'static str] {
                match self {
                    $( Color::$color => &[ stringify!($name) $( , stringify!($alias) )* ] ),*
                }
            }

            /// SGR parameters for this color; empty for the terminal default.
            pub fn code(self) -> &'static str {
                match self {
                    $( Color::$color => $code ),*
                }
            }
        }
    };
}

colors! {
    snow = Snow("1;37"),
    white = White("0;37"),
    lightgray, lightcyan = LightGray("1;36"),
    smoke = Smoke("1;36"),
    dimgray = DimGray("1;33"),
    gray = Gray("1;30"),
    cadetblue, lightblue = CadetBlue("1;34"),
    seafoam, lightgreen = Seafoam("1;32"),
    cyan = Cyan("0;36"),
    blue = Blue("0;34"),
    purple = Purple("1;35"),
    pink = Pink("0;35"),
    red = Red("0;31"),
    orange, lightred = Orange("1;31"),
    yellow, brown = Yellow("0;33"),
    ochre = Ochre("0;33"),
    green = Green("0;32"),
    default = Default(""),
}

impl Color {
    pub const PREFIX: Color = Color::Cyan;
    pub const MESSAGE: Color = Color::Default;

    pub fn is_default(self) -> bool {
        self == Color::Default
    }
}

impl Default for Color {
    fn default() -> Color {
        Color::Default
    }
}

impl Display for Color {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Color, ConfigurationError> {
        let lower = name.trim().to_lowercase();
        ALL_COLORS
            .iter()
            .copied()
            .find(|color| color.names().iter().any(|n| *n == lower))
            .ok_or_else(|| ConfigurationError::UnknownColor(name.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigurationError;

    fn try_from(name: String) -> Result<Color, ConfigurationError> {
        name.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.name().to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn aliases_resolve_to_same_color() {
        assert_eq!(Color::Orange, "lightred".parse().unwrap());
        assert_eq!(Color::Seafoam, "LightGreen".parse().unwrap());
        assert_eq!(Color::Yellow, "brown".parse().unwrap());
        assert_eq!(Color::CadetBlue, "lightblue".parse().unwrap());
        assert_eq!(Color::LightGray, "lightcyan".parse().unwrap());
    }

    #[test]
    fn unknown_color() {
        assert!("chartreuse".parse::<Color>().is_err());
    }

    #[test]
    fn codes() {
        assert_eq!("0;31", Color::Red.code());
        assert_eq!("1;31", Color::Orange.code());
        assert_eq!("", Color::Default.code());
        assert!(ALL_COLORS
            .iter()
            .filter(|color| !color.is_default())
            .all(|color| !color.code().is_empty()));
    }
}
