use super::Waterfall;

const WIDTH: f64 = 760.0;
const LABEL_WIDTH: f64 = 280.0;
const RIGHT_MARGIN: f64 = 60.0;
const TOP_MARGIN: f64 = 36.0;
const ROW_HEIGHT: f64 = 28.0;
const BAR_HEIGHT: f64 = 18.0;
const AXIS_HEIGHT: f64 = 44.0;
const POSITIVE_COLOR: &str = "#ff0051";
const NEGATIVE_COLOR: &str = "#008bfb";
const TEXT_BAR_WIDTH: usize = 30;

/// Renders the waterfall as a standalone SVG document.
pub fn render_svg(waterfall: &Waterfall) -> String {
    let rows = waterfall.steps.len() as f64;
    let height = TOP_MARGIN + rows * ROW_HEIGHT + AXIS_HEIGHT;
    let (low, high) = value_range(waterfall);
    let plot_width = WIDTH - LABEL_WIDTH - RIGHT_MARGIN;
    let x = |value: f64| LABEL_WIDTH + (value - low) / (high - low) * plot_width;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {height}" width="{WIDTH}" height="{height}" font-family="sans-serif" font-size="12">"#
    ));
    svg.push_str(&format!(
        r##"<text x="{}" y="20" text-anchor="middle" fill="#333">f(x) = {:.3}</text>"##,
        x(waterfall.output_value),
        waterfall.output_value
    ));

    for (index, step) in waterfall.steps.iter().enumerate() {
        let top = TOP_MARGIN + index as f64 * ROW_HEIGHT;
        let left = x(step.start.min(step.end));
        let width = (x(step.start.max(step.end)) - left).max(1.0);
        let color = if step.contribution >= 0.0 {
            POSITIVE_COLOR
        } else {
            NEGATIVE_COLOR
        };
        let label = match step.value {
            Some(value) => format!("{} = {}", step.label, trim_number(value)),
            None => step.label.clone(),
        };

        svg.push_str(&format!(
            r##"<text x="{}" y="{}" text-anchor="end" fill="#333">{}</text>"##,
            LABEL_WIDTH - 8.0,
            top + BAR_HEIGHT - 4.0,
            escape(&label)
        ));
        svg.push_str(&format!(
            r#"<rect x="{left:.2}" y="{top:.2}" width="{width:.2}" height="{BAR_HEIGHT}" fill="{color}"/>"#
        ));
        svg.push_str(&format!(
            r##"<text x="{:.2}" y="{}" fill="#333">{:+.3}</text>"##,
            left + width + 4.0,
            top + BAR_HEIGHT - 4.0,
            step.contribution
        ));
    }

    let axis_y = TOP_MARGIN + rows * ROW_HEIGHT + 6.0;
    svg.push_str(&format!(
        r##"<line x1="{LABEL_WIDTH}" y1="{axis_y}" x2="{}" y2="{axis_y}" stroke="#999"/>"##,
        LABEL_WIDTH + plot_width
    ));
    let base_x = x(waterfall.base_value);
    svg.push_str(&format!(
        r##"<line x1="{base_x:.2}" y1="{TOP_MARGIN}" x2="{base_x:.2}" y2="{axis_y}" stroke="#bbb" stroke-dasharray="3,3"/>"##
    ));
    svg.push_str(&format!(
        r##"<text x="{base_x:.2}" y="{}" text-anchor="middle" fill="#333">E[f(x)] = {:.3}</text>"##,
        axis_y + 18.0,
        waterfall.base_value
    ));
    svg.push_str("</svg>");
    svg
}

/// Renders the waterfall as fixed-width text bars for terminals.
pub fn render_text(waterfall: &Waterfall) -> String {
    let widest = waterfall
        .steps
        .iter()
        .map(|step| step.contribution.abs())
        .fold(0.0_f64, f64::max);
    let label_width = waterfall
        .steps
        .iter()
        .map(|step| step.label.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("f(x) = {:.4}\n", waterfall.output_value));
    for step in &waterfall.steps {
        let length = if widest > 0.0 {
            ((step.contribution.abs() / widest) * TEXT_BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let glyph = if step.contribution >= 0.0 { "+" } else { "-" };
        out.push_str(&format!(
            "  {:<label_width$}  {:>+9.4}  {}\n",
            step.label,
            step.contribution,
            glyph.repeat(length.max(1))
        ));
    }
    out.push_str(&format!("E[f(x)] = {:.4}", waterfall.base_value));
    out
}

fn value_range(waterfall: &Waterfall) -> (f64, f64) {
    let values = waterfall
        .steps
        .iter()
        .flat_map(|step| [step.start, step.end])
        .chain([waterfall.base_value, waterfall.output_value]);
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), value| {
        (low.min(value), high.max(value))
    });

    if !low.is_finite() || !high.is_finite() {
        return (-1.0, 1.0);
    }
    let span = high - low;
    if span <= f64::EPSILON {
        return (low - 1.0, high + 1.0);
    }
    let pad = span * 0.05;
    (low - pad, high + pad)
}

fn trim_number(value: f64) -> String {
    let formatted = format!("{value:.3}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
