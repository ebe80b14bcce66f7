use std::path::Path;
use std::time::Duration;

use console::Style;
use ocrlens_core::config::AppConfig;
use ocrlens_core::io::crop::CropRect;
use ocrlens_core::text_box::TextBox;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    method: Style,
    path: Style,
    low: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            path: Style::new().underlined(),
            low: Style::new().yellow(),
        }
    }
}

/// Boxes under this confidence are highlighted in the table.
const LOW_CONFIDENCE: f32 = 0.6;

pub fn print_run_header(
    file: &Path,
    width: u32,
    height: u32,
    crop: Option<&CropRect>,
    config: &AppConfig,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("ocrlens"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(7)));
    println!();
    println!("  {:<14}{}", s.label.apply_to("Input"), s.path.apply_to(file.display()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Size"),
        s.value.apply_to(format!("{width}x{height}"))
    );
    if let Some(c) = crop {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Region"),
            s.value
                .apply_to(format!("{}x{} at ({}, {})", c.width, c.height, c.x, c.y))
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Engine"),
        s.method.apply_to(&config.engine.program)
    );
    println!(
        "  {:<14}{} / {} ({})",
        s.label.apply_to("Models"),
        s.value.apply_to(&config.engine.detection_model),
        s.value.apply_to(&config.engine.recognition_model),
        config.engine.language
    );
    println!();
}

pub fn print_boxes(boxes: &[TextBox], elapsed: Duration) {
    let s = Styles::new();

    println!();
    println!(
        "  {} {}",
        s.title.apply_to(format!("{} text regions", boxes.len())),
        s.label.apply_to(format!("in {:.2}s", elapsed.as_secs_f64()))
    );
    println!();
    println!(
        "  {:>4}  {:>5}  {:<28}  {}",
        s.label.apply_to("#"),
        s.label.apply_to("conf"),
        s.label.apply_to("polygon"),
        s.label.apply_to("text")
    );
    for (i, b) in boxes.iter().enumerate() {
        let conf = format!("{:.2}", b.confidence);
        let conf = if b.confidence < LOW_CONFIDENCE {
            s.low.apply_to(conf)
        } else {
            s.method.apply_to(conf)
        };
        let polygon = b
            .polygon
            .points()
            .iter()
            .map(|p| format!("{:.0},{:.0}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        println!("  {:>4}  {:>5}  {:<28}  {}", i, conf, polygon, b.text);
    }
}
