//! Purpose: Format geocoding results and diagnostics for the terminal.
//! Exports: `emit_json`, `emit_results`, `colorize_json`, `result_line`, `colorize_label`, `AnsiColor`.
//! Role: Pure formatters plus the stdout emission paths used by command dispatch.
//! Invariants: Piped stdout gets compact single-line JSON; a TTY gets indented JSON.
//! Invariants: ANSI escapes appear only when the color mode enables them.
use std::io::{self, IsTerminal};

use serde_json::{Map, Value, json};

use super::{ColorMode, OutputFormat};

#[derive(Copy, Clone, Debug)]
pub(crate) enum AnsiColor {
    Red,
    Yellow,
    Cyan,
    Green,
    Magenta,
    Default,
}

impl AnsiColor {
    fn code(self) -> &'static str {
        match self {
            AnsiColor::Red => "31",
            AnsiColor::Yellow => "33",
            AnsiColor::Cyan => "36",
            AnsiColor::Green => "32",
            AnsiColor::Magenta => "35",
            AnsiColor::Default => "39",
        }
    }
}

pub(crate) fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    format!("\u{1b}[{}m{label}\u{1b}[0m", color.code())
}

pub(crate) fn emit_json(value: Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let rendered = if is_tty || use_color {
        colorize_json(&value, use_color)
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{rendered}");
}

pub(crate) fn emit_results(results: &[Value], format: OutputFormat, color_mode: ColorMode) {
    match format {
        OutputFormat::Json => emit_json(json!({ "results": results }), color_mode),
        OutputFormat::Text => {
            for (idx, result) in results.iter().enumerate() {
                println!("{}. {}", idx + 1, result_line(result));
            }
        }
    }
}

/// One-line summary: formatted address, location, and location type when present.
pub(crate) fn result_line(result: &Value) -> String {
    let address = result
        .get("formatted_address")
        .and_then(Value::as_str)
        .unwrap_or("(no formatted address)");
    let mut line = address.to_string();
    let geometry = result.get("geometry");
    let location = geometry.and_then(|geometry| geometry.get("location"));
    let lat = location.and_then(|loc| loc.get("lat")).and_then(Value::as_f64);
    let lng = location.and_then(|loc| loc.get("lng")).and_then(Value::as_f64);
    if let (Some(lat), Some(lng)) = (lat, lng) {
        line.push_str(&format!(" (lat: {lat}, lng: {lng})"));
    }
    if let Some(location_type) = geometry
        .and_then(|geometry| geometry.get("location_type"))
        .and_then(Value::as_str)
    {
        line.push_str(&format!(" [{location_type}]"));
    }
    line
}

/// Indented JSON with two-space steps; identical to `to_string_pretty` when color is off.
pub(crate) fn colorize_json(value: &Value, use_color: bool) -> String {
    let mut painter = Painter {
        use_color,
        out: String::new(),
    };
    painter.value(value, 0);
    painter.out
}

struct Painter {
    use_color: bool,
    out: String,
}

impl Painter {
    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.paint("null", AnsiColor::Default),
            Value::Bool(flag) => self.paint(if *flag { "true" } else { "false" }, AnsiColor::Magenta),
            Value::Number(num) => self.paint(&num.to_string(), AnsiColor::Yellow),
            Value::String(text) => self.paint(&quote(text), AnsiColor::Green),
            Value::Array(items) => self.array(items, depth),
            Value::Object(map) => self.object(map, depth),
        }
    }

    fn array(&mut self, items: &[Value], depth: usize) {
        if items.is_empty() {
            self.paint("[]", AnsiColor::Default);
            return;
        }
        self.paint("[", AnsiColor::Default);
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                self.paint(",", AnsiColor::Default);
            }
            self.newline(depth + 1);
            self.value(item, depth + 1);
        }
        self.newline(depth);
        self.paint("]", AnsiColor::Default);
    }

    fn object(&mut self, map: &Map<String, Value>, depth: usize) {
        if map.is_empty() {
            self.paint("{}", AnsiColor::Default);
            return;
        }
        self.paint("{", AnsiColor::Default);
        for (idx, (key, value)) in map.iter().enumerate() {
            if idx > 0 {
                self.paint(",", AnsiColor::Default);
            }
            self.newline(depth + 1);
            self.paint(&quote(key), AnsiColor::Cyan);
            self.paint(":", AnsiColor::Default);
            self.out.push(' ');
            self.value(value, depth + 1);
        }
        self.newline(depth);
        self.paint("}", AnsiColor::Default);
    }

    fn newline(&mut self, depth: usize) {
        self.out.push('\n');
        self.out.push_str(&"  ".repeat(depth));
    }

    fn paint(&mut self, text: &str, color: AnsiColor) {
        if self.use_color {
            self.out.push_str(&colorize_label(text, true, color));
        } else {
            self.out.push_str(text);
        }
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}
