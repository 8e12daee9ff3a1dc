use std::io::{self, IsTerminal, Write};

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Whether escape codes are written.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when stdout is a terminal (never on Windows).
    Auto,
    Always,
    Never,
}

impl Default for ColorMode {
    fn default() -> ColorMode {
        ColorMode::Auto
    }
}

impl ColorMode {
    pub fn style(self) -> AnyStyle {
        let colored = match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => !cfg!(windows) && io::stdout().is_terminal(),
        };

        if colored {
            ColoredStyle.into()
        } else {
            PlainStyle.into()
        }
    }
}

pub trait Style: Into<AnyStyle> {
    fn color<W: Write + ?Sized>(&self, writer: &mut W, color: Color) -> io::Result<()>;
    fn reset<W: Write + ?Sized>(&self, writer: &mut W, color: Color) -> io::Result<()>;

    fn paint<W: Write + ?Sized>(&self, writer: &mut W, color: Color, text: &str) -> io::Result<()> {
        self.color(writer, color)?;
        writer.write_all(text.as_bytes())?;
        self.reset(writer, color)
    }
}

#[derive(Copy, Clone, Debug)]
pub enum AnyStyle {
    Plain(PlainStyle),
    Colored(ColoredStyle),
}

impl AnyStyle {
    pub fn is_colored(&self) -> bool {
        matches!(self, AnyStyle::Colored(_))
    }
}

impl Style for AnyStyle {
    fn color<W: Write + ?Sized>(&self, writer: &mut W, color: Color) -> io::Result<()> {
        match self {
            AnyStyle::Plain(style) => style.color(writer, color),
            AnyStyle::Colored(style) => style.color(writer, color),
        }
    }

    fn reset<W: Write + ?Sized>(&self, writer: &mut W, color: Color) -> io::Result<()> {
        match self {
            AnyStyle::Plain(style) => style.reset(writer, color),
            AnyStyle::Colored(style) => style.reset(writer, color),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct PlainStyle;

impl From<PlainStyle> for AnyStyle {
    fn from(style: PlainStyle) -> AnyStyle {
        AnyStyle::Plain(style)
    }
}

impl Style for PlainStyle {
    fn color<W: Write + ?Sized>(&self, _writer: &mut W, _color: Color) -> io::Result<()> {
        Ok(())
    }

    fn reset<W: Write + ?Sized>(&self, _writer: &mut W, _color: Color) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ColoredStyle;

impl From<ColoredStyle> for AnyStyle {
    fn from(style: ColoredStyle) -> AnyStyle {
        AnyStyle::Colored(style)
    }
}

impl Style for ColoredStyle {
    fn color<W: Write + ?Sized>(&self, writer: &mut W, color: Color) -> io::Result<()> {
        if color.is_default() {
            Ok(())
        } else {
            write!(writer, "\x1b[{}m", color.code())
        }
    }

    fn reset<W: Write + ?Sized>(&self, writer: &mut W, color: Color) -> io::Result<()> {
        if color.is_default() {
            Ok(())
        } else {
            write!(writer, "\x1b[0m")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn painted(style: impl Style, color: Color, text: &str) -> String {
        let mut buf = Vec::new();
        style.paint(&mut buf, color, text).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn colored_wraps_text() {
        assert_eq!("\x1b[0;36mapp\x1b[0m", painted(ColoredStyle, Color::Cyan, "app"));
        assert_eq!("plain", painted(ColoredStyle, Color::Default, "plain"));
    }

    #[test]
    fn plain_writes_text_only() {
        assert_eq!("app", painted(PlainStyle, Color::Cyan, "app"));
    }

    #[test]
    fn forced_modes() {
        assert!(ColorMode::Always.style().is_colored());
        assert!(!ColorMode::Never.style().is_colored());
    }
}
