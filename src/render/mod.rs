//! Image rendering boundary.
//!
//! The dispatch loop renders each delivery as an image: the composition
//! lines, a title, and an optional attribution. The default renderer emits an
//! SVG document as bytes; image encoding proper is outside this crate's
//! scope, and the trait seam allows substituting a raster renderer.

use std::fmt::Write;

use thiserror::Error;

/// A rendering failure.
///
/// Renderer failures are not masked: the dispatch loop aborts the enclosing
/// per-message fan-out (and only it) when rendering fails.
#[derive(Debug, Error)]
#[error("render failed: {0}")]
pub struct RenderError(pub String);

/// Renders a composition into image bytes.
pub trait Renderer {
    fn render(
        &self,
        post: &[String],
        attribution: Option<&str>,
        title: &str,
    ) -> Result<Vec<u8>, RenderError>;
}

/// The default renderer: a plain SVG card.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    /// Canvas width in pixels.
    pub width: u32,

    /// Vertical distance between composition lines.
    pub line_height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        SvgRenderer {
            width: 600,
            line_height: 34,
        }
    }
}

impl Renderer for SvgRenderer {
    fn render(
        &self,
        post: &[String],
        attribution: Option<&str>,
        title: &str,
    ) -> Result<Vec<u8>, RenderError> {
        let extra_rows = 2 + usize::from(attribution.is_some());
        let height = self.line_height * (post.len() + extra_rows) as u32 + 40;

        let mut svg = String::new();
        let mut y = 40;
        write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            self.width, height
        )
        .map_err(|e| RenderError(e.to_string()))?;
        write!(
            svg,
            r##"<rect width="100%" height="100%" fill="#fdf6e3"/><text x="30" y="{y}" font-size="20" font-weight="bold">{}</text>"##,
            escape(title)
        )
        .map_err(|e| RenderError(e.to_string()))?;

        for line in post {
            y += self.line_height;
            write!(
                svg,
                r#"<text x="30" y="{y}" font-size="16">{}</text>"#,
                escape(line)
            )
            .map_err(|e| RenderError(e.to_string()))?;
        }

        if let Some(name) = attribution {
            y += self.line_height * 2;
            write!(
                svg,
                r#"<text x="{}" y="{y}" font-size="14" font-style="italic" text-anchor="end">— {}</text>"#,
                self.width - 30,
                escape(name)
            )
            .map_err(|e| RenderError(e.to_string()))?;
        }

        svg.push_str("</svg>");
        Ok(svg.into_bytes())
    }
}

/// Escapes text for SVG content.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
