//! SVG sink.

use std::fmt::Write as _;

use super::{path_data, Element};
use crate::color::ColorRamp;

/// Number of swatches in the color bar.
const COLORBAR_STEPS: usize = 100;
const FONT_SIZE: u32 = 15;

/// Legend for a continuous coloring.
#[derive(Clone, Debug, PartialEq)]
pub struct Colorbar {
    pub label: String,
    pub vmin: f64,
    pub vmax: f64,
    pub ramp: ColorRamp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SvgOptions {
    /// Canvas the layout was computed for.
    pub width: f64,
    pub height: f64,
    /// Fill hull interiors (at low opacity) instead of outlining only.
    pub fill_hulls: bool,
    /// Hulls and centroids link to `{base_url}/{label}` when set.
    pub base_url: Option<String>,
    /// Drawn in an extra margin on the right.
    pub colorbar: Option<Colorbar>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 1080.0,
            fill_hulls: false,
            base_url: None,
            colorbar: None,
        }
    }
}

/// Escape text for element content and attribute values.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn open_link(out: &mut String, base_url: Option<&str>, label: &str) {
    match base_url {
        Some(base) => {
            let _ = writeln!(out, "  <a href=\"{}/{}\">", escape(base), escape(label));
        }
        None => out.push_str("  <a>\n"),
    }
}

fn title(out: &mut String, text: &str) {
    let _ = writeln!(out, "    <title>{}</title>", escape(text));
}

/// Serialize elements into a standalone SVG document.
pub fn render_svg(elements: &[Element], opts: &SvgOptions) -> String {
    let margin = if opts.colorbar.is_some() {
        (opts.width * 0.1).round()
    } else {
        0.0
    };
    let width = opts.width + 2.0 * margin;
    let base_url = opts.base_url.as_deref();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg height=\"{}px\" width=\"{}px\" xmlns=\"http://www.w3.org/2000/svg\">",
        opts.height, width
    );
    for el in elements {
        match el {
            Element::Hull {
                label,
                name,
                n_cells,
                color,
                paths,
            } => {
                let fill = if opts.fill_hulls {
                    escape(color)
                } else {
                    "transparent".to_owned()
                };
                open_link(&mut out, base_url, label);
                for p in paths {
                    let _ = writeln!(
                        out,
                        "    <path d=\"{}\" stroke=\"{}\" fill=\"{}\" fill-opacity=\"0.1\"/>",
                        path_data(p),
                        escape(color),
                        fill
                    );
                }
                title(&mut out, &format!("{name} -- {:.2e} cells", *n_cells as f64));
                out.push_str("  </a>\n");
            }
            Element::Ribbon {
                src_name,
                dst_name,
                src_fraction,
                dst_fraction,
                commands,
            } => {
                out.push_str("  <a>\n");
                let _ = writeln!(
                    out,
                    "    <path d=\"{}\" stroke=\"transparent\" fill=\"#bbbbbb\"/>",
                    path_data(commands)
                );
                title(
                    &mut out,
                    &format!(
                        "{src_name} ({src_fraction:.2e} of neighbors) -> \
                         {dst_name} ({dst_fraction:.2e} of neighbors)"
                    ),
                );
                out.push_str("  </a>\n");
            }
            Element::Circle {
                label,
                name,
                n_cells,
                color,
                center,
                radius,
                stat,
            } => {
                open_link(&mut out, base_url, label);
                let _ = writeln!(
                    out,
                    "    <circle r=\"{}px\" cx=\"{}px\" cy=\"{}px\" fill=\"{}\" stroke=\"transparent\"/>",
                    radius,
                    center.x,
                    center.y,
                    escape(color)
                );
                let mut hover = format!("{name} -- {:.2e} cells", *n_cells as f64);
                if let Some((stat_name, s)) = stat {
                    let _ = write!(
                        hover,
                        "\n{stat_name}: {:.2e} +/- {:.2e}",
                        s.mean,
                        s.variance.max(0.0).sqrt()
                    );
                }
                title(&mut out, &hover);
                out.push_str("  </a>\n");
            }
        }
    }
    if let Some(bar) = &opts.colorbar {
        write_colorbar(&mut out, bar, width, opts.height, margin);
    }
    out.push_str("</svg>\n");
    out
}

/// Vertical swatch column in the right margin, high values on top, with five
/// tick labels.
fn write_colorbar(out: &mut String, bar: &Colorbar, width: f64, height: f64, margin: f64) {
    let dy = (height * 0.2).round();
    let x0 = width - (1.5 * margin).floor();
    let bar_width = (0.5 * margin).floor();
    let step_height = (height - 2.0 * dy) / COLORBAR_STEPS as f64;
    let steps = bar.ramp.steps(bar.vmin, bar.vmax, COLORBAR_STEPS);

    let _ = writeln!(
        out,
        "  <text x=\"{}px\" y=\"{}px\" font-size=\"{}\">{}</text>",
        x0 - bar_width,
        dy - 3.0 * step_height,
        FONT_SIZE,
        escape(&bar.label)
    );
    for (i, (value, color)) in steps.iter().rev().enumerate() {
        let _ = writeln!(
            out,
            "  <a><rect x=\"{}px\" y=\"{}px\" height=\"{}px\" width=\"{}px\" fill=\"{}\"/><title>{:.2}</title></a>",
            x0,
            dy + i as f64 * step_height,
            step_height,
            bar_width,
            color,
            value
        );
    }
    let n = steps.len();
    if n == 0 {
        return;
    }
    let ticks = [0, n / 4, n / 2, 3 * n / 4, n - 1];
    for (row, value_idx) in ticks.iter().rev().zip(ticks.iter()) {
        let _ = writeln!(
            out,
            "  <text x=\"{}px\" y=\"{}px\" font-size=\"{}\">{:.2e}</text>",
            x0 + 1.1 * bar_width,
            dy + *row as f64 * step_height + 0.5 * step_height,
            FONT_SIZE,
            steps[*value_idx].0
        );
    }
}
