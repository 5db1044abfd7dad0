use rewind_chart::ChartState;
use rewind_chart::svg::legend_html;
use rewind_chart::svg::to_svg;
use rewind_spotify_api::track::Track;

use crate::session::Session;

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 860px; margin: 0 auto; padding: 2em 1em; }
.graph-container { padding: 0 20px; }
.graph-legend { display: flex; flex-wrap: wrap; gap: 12px; margin-bottom: 1em; }
.legend-item { display: flex; align-items: center; gap: 6px; cursor: pointer; }
.legend-item.selected { font-weight: bold; }
.legend-color { display: inline-block; width: 14px; height: 14px; border-radius: 3px; }
.track-item { display: flex; gap: 12px; align-items: center; margin-bottom: 8px; }
.track-name { font-weight: bold; }
.artist-name, .album-name { color: #666; font-size: 0.9em; }
pre { background: #f6f6f6; padding: 1em; overflow-x: auto; max-height: 400px; }
.error-message { color: #b00020; }
"#;

const CHART_SCRIPT: &str = r#"
const chart = document.getElementById('chart');
let hovered = null;
async function send(path) {
  const res = await fetch(path, { method: 'POST' });
  if (res.ok) chart.innerHTML = await res.text();
}
chart.addEventListener('click', (e) => {
  const item = e.target.closest('.legend-item');
  if (item) send('/chart/select/' + item.dataset.series);
});
chart.addEventListener('mouseover', (e) => {
  const el = e.target.closest('[data-series]');
  if (el && el.dataset.series !== hovered) {
    hovered = el.dataset.series;
    send('/chart/hover/' + hovered);
  }
});
chart.addEventListener('mouseout', (e) => {
  const el = e.target.closest('[data-series]');
  if (el && !el.contains(e.relatedTarget) && hovered !== null) {
    hovered = null;
    send('/chart/leave');
  }
});
const resize = () => send('/chart/resize?width=' + chart.clientWidth);
window.addEventListener('resize', resize);
resize();
"#;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
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

fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

/// Legend plus SVG; the body of `#chart` and of every chart interaction response.
pub fn render_chart(chart: &ChartState) -> String {
    let rendered = chart.render();
    format!(
        r#"{}<div class="svg-container">{}</div>"#,
        legend_html(&rendered),
        to_svg(&rendered)
    )
}

fn render_track(out: &mut String, track: &Track) {
    out.push_str(r#"<div class="track-item">"#);
    if let Some(cover) = track.album.cover() {
        out.push_str(&format!(
            r#"<img src="{}" alt="{}" width="60" height="60">"#,
            escape(&cover.url),
            escape(&track.album.name)
        ));
    }
    out.push_str(&format!(
        r#"<div class="track-info"><div class="track-name">{}</div><div class="artist-name">{}</div><div class="album-name">{}</div></div></div>"#,
        escape(&track.name),
        escape(&track.artist_names()),
        escape(&track.album.name)
    ));
}

pub fn render_page(session: &Session) -> String {
    let mut out = String::from("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">");
    if session.in_flight > 0 {
        out.push_str(r#"<meta http-equiv="refresh" content="1">"#);
    }
    out.push_str(&format!("<title>Rewind</title><style>{STYLE}</style></head><body>"));
    out.push_str("<h1>Rewind</h1>");

    let logged_in = session.auth.is_logged_in();
    if logged_in {
        out.push_str(&format!(
            r#"<div class="graph-container"><h2>Listening traits</h2><p class="graph-instruction">Hover or click a legend entry to inspect a trait.</p><div id="chart">{}</div></div>"#,
            render_chart(&session.chart)
        ));
    }

    if let Some(played) = &session.recently_played {
        out.push_str(r#"<div class="recently-played"><h2>Recently played</h2><div class="tracks-container">"#);
        for track in played.tracks() {
            render_track(&mut out, track);
        }
        out.push_str(&format!(
            r#"</div><h3>API response</h3><pre class="api-response">{}</pre></div>"#,
            escape(&pretty(&played.raw))
        ));
    }

    if let Some(token) = &session.token {
        out.push_str(&format!(
            r#"<div class="token-response"><h2>Authenticated</h2><pre>{}</pre></div>"#,
            escape(&pretty(token))
        ));
    }

    if let Some(error) = &session.error {
        out.push_str(&format!(
            r#"<div class="error-message"><h2>Something went wrong</h2><p>{}</p></div>"#,
            escape(error)
        ));
    }

    out.push_str(r#"<div class="login-card">"#);
    if logged_in {
        out.push_str("<p>Logged in to Spotify.</p>");
    } else {
        out.push_str(r#"<a class="button" href="/login">Log in with Spotify</a>"#);
    }
    out.push_str("</div>");

    if logged_in {
        out.push_str(&format!("<script>{CHART_SCRIPT}</script>"));
    }
    out.push_str("</body></html>");
    out
}

/// Served at the redirect URI. The fragment never reaches a server, so the page posts it
/// back and then replaces the URL with the home page, dropping the fragment.
pub fn render_callback_relay() -> String {
    r#"<!DOCTYPE html><html lang="en"><head><meta charset="UTF-8"><title>Rewind</title></head><body>
<p>Finishing sign-in&hellip;</p>
<script>
fetch(location.pathname, { method: 'POST', body: location.hash.substring(1) })
  .finally(() => location.replace('/'));
</script>
</body></html>"#
        .to_string()
}
