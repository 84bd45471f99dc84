//! Output formatting, split from command handling so every command renders
//! through the same two shapes: human text or JSON.

use serde_json::json;

use tnlens_common::Colors;
use tnlens_core::ScreenModel;

pub trait Presenter {
    /// Render a full screen model.
    fn present_model(&self, model: &ScreenModel);

    /// Render one label/value pair.
    fn present_kv(&self, key: &str, value: &str);

    /// Render a section heading (text mode only).
    fn present_header(&self, text: &str);

    /// Render preformatted text verbatim, no trailing newline added.
    fn present_raw(&self, text: &str);
}

pub struct TextPresenter;

impl Presenter for TextPresenter {
    fn present_model(&self, model: &ScreenModel) {
        for title in &model.title_lines {
            println!("{}", Colors::bold(title));
        }

        if !model.display_fields.is_empty() {
            self.present_header("Display fields");
            for (key, value) in sorted(model.display_fields.iter()) {
                println!("  {}: {}", Colors::label(key), value);
            }
        }

        if !model.input_fields.is_empty() {
            self.present_header("Input fields");
            for (key, field) in sorted(model.input_fields.iter()) {
                let note = if field.read_only {
                    format!(" {}", Colors::dim("(read-only)"))
                } else {
                    String::new()
                };
                println!("  {}: {}{}", Colors::label(key), field.value, note);
            }
        }

        if let Some(table) = &model.table {
            self.present_header("Table");
            self.present_raw(&table.to_csv(',', "\n"));
        }

        if !model.text.is_empty() {
            self.present_header("Text");
            for line in model.text.lines() {
                println!("  {}", Colors::dim(line));
            }
        }
    }

    fn present_kv(&self, key: &str, value: &str) {
        println!("{}: {}", Colors::label(key), value);
    }

    fn present_header(&self, text: &str) {
        println!("{}", Colors::info(text));
    }

    fn present_raw(&self, text: &str) {
        print!("{text}");
    }
}

pub struct JsonPresenter;

impl Presenter for JsonPresenter {
    fn present_model(&self, model: &ScreenModel) {
        match serde_json::to_string_pretty(model) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("{} {}", Colors::error("Error:"), e),
        }
    }

    fn present_kv(&self, key: &str, value: &str) {
        println!("{}", json!({ "label": key, "value": value }));
    }

    fn present_header(&self, _text: &str) {}

    fn present_raw(&self, text: &str) {
        print!("{text}");
    }
}

fn sorted<'a, V>(entries: impl Iterator<Item = (&'a String, V)>) -> Vec<(&'a String, V)> {
    let mut out: Vec<_> = entries.collect();
    out.sort_by(|a, b| a.0.cmp(b.0));
    out
}
