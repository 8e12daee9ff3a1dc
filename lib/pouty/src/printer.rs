use std::fmt::Display;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anybar::AnyBar;

use crate::color::{Color, ALL_COLORS};
use crate::config::PrinterConfig;
use crate::console::Console;
use crate::error::{ConfigurationError, FormatError, IndentError};
use crate::logfile::LogFile;
use crate::notifier::{Notification, Notifier};
use crate::severity::{Severity, Stream};
use crate::style::{AnyStyle, Style};
use crate::template::{render, Args};
use crate::utils::{contract_home, strip_ansi};

/// Spaces per indent level.
pub const INDENT_WIDTH: usize = 2;

const POPUP_TITLE: &str = "Console";

/// Per-call switches for [`Printer::print_with`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrintOptions {
    /// Also show a desktop notification.
    pub popup: bool,
    /// Blank out the prefix but keep the message aligned.
    pub hide_prefix: bool,
    /// Use this prefix instead of the printer name.
    pub prefix: Option<String>,
}

impl PrintOptions {
    pub fn popup() -> PrintOptions {
        PrintOptions {
            popup: true,
            ..PrintOptions::default()
        }
    }

    pub fn hide_prefix(mut self) -> PrintOptions {
        self.hide_prefix = true;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> PrintOptions {
        self.prefix = Some(prefix.into());
        self
    }
}

/// Colored console output, mirrored to a log file, desktop notifications
/// and an AnyBar widget.
///
/// Only template errors are returned to the caller. Every other sink is
/// best-effort: failures are traced and noted on stderr, and the console
/// output goes ahead regardless.
pub struct Printer {
    config: PrinterConfig,
    indent: usize,
    style: AnyStyle,
    console: Mutex<Console>,
    log: Option<LogFile>,
    notifier: Notifier,
    anybar: Option<AnyBar>,
}

impl Printer {
    /// Build a printer on the standard streams. Notification backends are
    /// looked up on `PATH` here, once.
    pub fn configure(config: PrinterConfig) -> Result<Printer, ConfigurationError> {
        let notifier = if config.notifications {
            Notifier::resolve(config.timeout())
        } else {
            Notifier::disabled()
        };
        Printer::configure_with(config, Console::stdio(), notifier)
    }

    pub fn configure_with(
        config: PrinterConfig,
        console: Console,
        notifier: Notifier,
    ) -> Result<Printer, ConfigurationError> {
        let log = config
            .log_path
            .as_ref()
            .map(|path| LogFile::open(path, config.log_mode))
            .transpose()?;

        let anybar = config
            .anybar_port
            .and_then(|port| match AnyBar::connect(port) {
                Ok(anybar) => Some(anybar),
                Err(err) => {
                    tracing::warn!(port, error = %err, "AnyBar signalling disabled");
                    None
                }
            });

        tracing::debug!(
            name = %config.name,
            log_path = ?config.log_path,
            notifier = ?notifier.backends(),
            "configured printer"
        );

        Ok(Printer {
            indent: config.indent,
            style: config.color.style(),
            console: Mutex::new(console),
            log,
            notifier,
            anybar,
            config,
        })
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log.as_ref().map(LogFile::path)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn anybar(&self) -> Option<&AnyBar> {
        self.anybar.as_ref()
    }

    pub fn indent_level(&self) -> usize {
        self.indent
    }

    /// Nest subsequent output one level deeper. Returns the new level.
    pub fn indent(&mut self) -> usize {
        self.indent += 1;
        self.indent
    }

    /// Undo one [`indent`](Printer::indent). The level never goes below
    /// zero; trying to is an error and leaves it at zero.
    pub fn dedent(&mut self) -> Result<usize, IndentError> {
        if self.indent == 0 {
            return Err(IndentError::Underflow);
        }
        self.indent -= 1;
        Ok(self.indent)
    }

    /// Indent until the returned guard is dropped.
    pub fn section(&mut self) -> Section<'_> {
        self.indent();
        Section { printer: self }
    }

    /// Whether messages of `severity` are shown at all.
    pub fn is_enabled(&self, severity: Severity) -> bool {
        if severity.is_urgent() {
            true
        } else if self.config.quiet {
            false
        } else {
            severity != Severity::Debug || self.config.debug
        }
    }

    pub fn info(&self, template: &str, args: &Args) -> Result<(), FormatError> {
        self.print(Severity::Info, template, args)
    }

    pub fn warning(&self, template: &str, args: &Args) -> Result<(), FormatError> {
        self.print(Severity::Warning, template, args)
    }

    pub fn error(&self, template: &str, args: &Args) -> Result<(), FormatError> {
        self.print(Severity::Error, template, args)
    }

    pub fn debug(&self, template: &str, args: &Args) -> Result<(), FormatError> {
        self.print(Severity::Debug, template, args)
    }

    pub fn print(&self, severity: Severity, template: &str, args: &Args) -> Result<(), FormatError> {
        self.print_with(severity, template, args, &PrintOptions::default())
    }

    pub fn print_with(
        &self,
        severity: Severity,
        template: &str,
        args: &Args,
        options: &PrintOptions,
    ) -> Result<(), FormatError> {
        let message = render(template, args)?;
        if !self.is_enabled(severity) {
            return Ok(());
        }

        let message = contract_home(&message);
        let prefix = self.prefix(options);

        let decorated = self.decorate(severity, prefix, &message, options.hide_prefix);
        self.write_console(severity.stream(), &decorated);

        if let Some(log) = &self.log {
            if let Err(err) = log.append(severity, prefix, &message) {
                self.sink_failure("log file", &err);
            }
        }

        if options.popup {
            self.popup(severity, prefix, &message);
        }

        self.signal_anybar(severity);

        Ok(())
    }

    /// The decorated console text for a message, without writing it
    /// anywhere.
    pub fn format(&self, severity: Severity, template: &str, args: &Args) -> Result<String, FormatError> {
        let message = render(template, args)?;
        let message = contract_home(&message);
        Ok(self.decorate(severity, self.name().trim(), &message, false))
    }

    /// Raw colored output with no prefix or newline. Uses the prefix color
    /// when `color` is `None`.
    pub fn printf(&self, text: &str, color: Option<Color>) {
        if self.config.quiet {
            return;
        }

        // keep the line break outside the color codes so the console can
        // tell whether the line is still open
        let (body, newline) = match text.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (text, ""),
        };
        let mut painted = Vec::new();
        if !body.is_empty() {
            self.paint(&mut painted, color.unwrap_or(self.config.prefix_color), body);
        }
        painted.extend_from_slice(newline.as_bytes());

        let written = self
            .lock_console()
            .write_raw(&String::from_utf8_lossy(&painted));
        if let Err(err) = written {
            tracing::warn!(error = %err, "console write failed");
        }

        if let Some(log) = &self.log {
            if let Err(err) = log.append_raw(text) {
                self.sink_failure("log file", &err);
            }
        }
    }

    pub fn newline(&self) {
        self.printf("\n", None);
    }

    /// A horizontal rule on its own line.
    pub fn hline(&self, ch: char, length: usize, color: Color) {
        if self.lock_console().is_hanging() {
            self.newline();
        }
        let mut line: String = std::iter::repeat(ch).take(length).collect();
        line.push('\n');
        self.printf(&line, Some(color));
    }

    pub fn rule(&self) {
        self.hline('─', 80, Color::Snow);
    }

    /// A single square glyph, filled or hollow.
    pub fn glyph_box(&self, filled: bool, color: Option<Color>) {
        self.printf(if filled { "■" } else { "□" }, color);
    }

    /// One swatch line per named color.
    pub fn show_colors(&self) {
        for color in ALL_COLORS {
            let swatch = format!(" {:<11}{}\n", color.name(), "■".repeat(68));
            self.printf(&swatch, Some(*color));
        }
    }

    fn prefix<'a>(&'a self, options: &'a PrintOptions) -> &'a str {
        options
            .prefix
            .as_deref()
            .unwrap_or(&self.config.name)
            .trim()
    }

    fn decorate(&self, severity: Severity, prefix: &str, message: &str, hide_prefix: bool) -> String {
        let (prefix_color, message_color) = severity
            .colors()
            .unwrap_or((self.config.prefix_color, self.config.message_color));

        let header = match (prefix.is_empty(), severity.label()) {
            (true, None) => String::new(),
            (true, Some(label)) => label.to_string(),
            (false, None) => prefix.to_string(),
            (false, Some(label)) => format!("{} {}", prefix, label),
        };

        let mut lead = format!("{} ", severity.glyph());
        if !header.is_empty() {
            lead.push_str(&header);
            lead.push_str(": ");
        }
        let lead_width = lead.chars().count();
        if hide_prefix {
            lead = " ".repeat(lead_width);
        }

        let indent = " ".repeat(self.indent * INDENT_WIDTH);
        let hang = " ".repeat(lead_width);

        let mut buf = Vec::new();
        for (lineno, line) in message.split('\n').enumerate() {
            buf.extend_from_slice(indent.as_bytes());
            if lineno == 0 {
                self.paint(&mut buf, prefix_color, &lead);
            } else {
                buf.extend_from_slice(hang.as_bytes());
            }
            self.paint(&mut buf, message_color, line);
            buf.push(b'\n');
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    fn paint(&self, buf: &mut Vec<u8>, color: Color, text: &str) {
        // writes into a Vec cannot fail
        let _ = self.style.paint(buf, color, text);
    }

    fn lock_console(&self) -> MutexGuard<'_, Console> {
        self.console.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_console(&self, stream: Stream, text: &str) {
        let mut console = self.lock_console();
        let written = console
            .resolve_hanging()
            .and_then(|_| console.write(stream, text.as_bytes()));
        if let Err(err) = written {
            tracing::warn!(error = %err, "console write failed");
        }
    }

    /// Note a failed side channel on stderr without touching any other
    /// sink.
    fn sink_failure(&self, sink: &str, err: &dyn Display) {
        tracing::warn!(sink, error = %err, "output sink failed");
        let note = format!("{} failed: {}", sink, err);
        let decorated = self.decorate(Severity::Warning, self.name().trim(), &note, false);
        self.write_console(Stream::Stderr, &decorated);
    }

    fn popup(&self, severity: Severity, prefix: &str, message: &str) {
        if !self.config.notifications {
            tracing::debug!("notifications disabled, skipping popup");
            return;
        }

        let title = if prefix.is_empty() { POPUP_TITLE } else { prefix };
        let mut notification = Notification::new(title, strip_ansi(message));
        if severity.is_urgent() {
            if let Some(label) = severity.label() {
                notification = notification.subtitle(label);
            }
        }
        if let Some(sound) = &self.config.sound {
            notification = notification.sound(sound.as_str());
        }

        if let Err(err) = self.notifier.notify(&notification) {
            self.sink_failure("notification", &err);
        }
    }

    fn signal_anybar(&self, severity: Severity) {
        let color = match severity {
            Severity::Error => anybar::Color::Red,
            Severity::Warning => anybar::Color::Orange,
            Severity::Info | Severity::Debug => return,
        };

        if let Some(anybar) = &self.anybar {
            if let Err(err) = anybar.set_color(color) {
                tracing::debug!(error = %err, "AnyBar update failed");
            }
        }
    }
}

/// Indentation scope from [`Printer::section`].
pub struct Section<'a> {
    printer: &'a mut Printer,
}

impl Deref for Section<'_> {
    type Target = Printer;

    fn deref(&self) -> &Printer {
        self.printer
    }
}

impl DerefMut for Section<'_> {
    fn deref_mut(&mut self) -> &mut Printer {
        self.printer
    }
}

impl Drop for Section<'_> {
    fn drop(&mut self) {
        // a manual dedent inside the section may already have reached zero
        let _ = self.printer.dedent();
    }
}
