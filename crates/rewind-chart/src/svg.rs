use crate::interaction::DIMMED_OPACITY;
use crate::interaction::RenderedChart;
use crate::interaction::num;

const HOVER_TARGET_RADIUS: u8 = 5;
const LABEL_FONT_SIZE: u8 = 20;

/// SVG element for the chart. Series elements carry `data-series` for event wiring.
pub fn to_svg(chart: &RenderedChart) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
        num(chart.width),
        num(chart.height)
    ));

    for line in &chart.grid {
        out.push_str(&format!(
            r##"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="#eee" stroke-dasharray="5,5" opacity="{}"/>"##,
            num(line.x1),
            num(line.x2),
            DIMMED_OPACITY,
            y = num(line.y),
        ));
    }

    for line in &chart.lines {
        out.push_str(&format!(r#"<g data-series="{}">"#, line.id));
        out.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" opacity="{}" stroke-linecap="round" stroke-linejoin="round"/>"#,
            line.path, line.color, line.stroke_width, DIMMED_OPACITY,
        ));
        for point in &line.points {
            out.push_str(&format!(
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}" opacity="0"/>"#,
                num(point.x),
                num(point.y),
                HOVER_TARGET_RADIUS,
                line.color,
            ));
        }
        for label in &line.labels {
            out.push_str(&format!(
                r#"<text x="{}" y="{}" text-anchor="middle" fill="{}" font-weight="bold" font-size="{}">{}</text>"#,
                num(label.x),
                num(label.y),
                line.color,
                LABEL_FONT_SIZE,
                label.value,
            ));
        }
        out.push_str("</g>");
    }

    out.push_str("</svg>");
    out
}

/// Clickable legend. Each entry carries `data-series`.
pub fn legend_html(chart: &RenderedChart) -> String {
    let mut out = String::from(r#"<div class="graph-legend">"#);
    for entry in &chart.legend {
        out.push_str(&format!(
            r#"<div class="legend-item{}" data-series="{}"><span class="legend-color" style="background-color:{};opacity:{}"></span><span>{}</span></div>"#,
            if entry.selected { " selected" } else { "" },
            entry.id,
            entry.color,
            entry.opacity,
            entry.label,
        ));
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ChartState;
    use crate::series::SeriesId;

    #[test]
    fn draws_grid_lines_and_every_series() {
        let svg = to_svg(&ChartState::default().render());

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<line ").count(), 5);
        assert_eq!(svg.matches("<path ").count(), 5);
        assert_eq!(svg.matches("<circle ").count(), 35);
        assert_eq!(svg.matches("<text ").count(), 0);
    }

    #[test]
    fn selection_draws_one_series_with_values() {
        let mut state = ChartState::default();
        state.toggle_selection(SeriesId(1)).unwrap();
        let svg = to_svg(&state.render());

        assert_eq!(svg.matches("<path ").count(), 1);
        assert_eq!(svg.matches("<text ").count(), 7);
        assert!(svg.contains(r#"stroke-width="5""#));
        assert!(svg.contains(">81</text>"));
    }

    #[test]
    fn legend_marks_the_selection() {
        let mut state = ChartState::default();
        state.toggle_selection(SeriesId(2)).unwrap();
        let legend = legend_html(&state.render());

        assert_eq!(legend.matches("legend-item").count(), 5);
        assert_eq!(legend.matches("legend-item selected").count(), 1);
        assert!(legend.contains(r#"class="legend-item selected" data-series="2""#));
        assert!(legend.contains("Conscientiousness"));
    }
}
