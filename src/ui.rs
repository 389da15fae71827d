use crate::models::{StatsResponse, Urge};
use crate::store::{badge_name, BADGE_MILESTONES};

pub fn render_track(urges: &[Urge], main: Option<&Urge>) -> String {
    let body = match main {
        Some(urge) => track_panel(urge),
        None => EMPTY_HTML.to_string(),
    };

    page(
        "Track",
        &chips(urges, main, "/"),
        &format!("{body}{ADD_FORM_HTML}"),
    )
}

pub fn render_stats(urges: &[Urge], main: Option<&Urge>, stats: Option<&StatsResponse>) -> String {
    let body = match (main, stats) {
        (Some(urge), Some(stats)) => STATS_HTML
            .replace("{{ID}}", &urge.id.to_string())
            .replace("{{DAYS}}", &stats.summary.total_days.to_string())
            .replace("{{RESISTED}}", &stats.summary.total_resisted.to_string())
            .replace("{{RELAPSED}}", &stats.summary.total_relapsed.to_string())
            .replace(
                "{{MAX_STREAK}}",
                &stats.summary.longest_no_relapse_streak.to_string(),
            ),
        _ => EMPTY_HTML.to_string(),
    };

    page("Stats", &chips(urges, main, "/stats"), &body)
}

fn track_panel(urge: &Urge) -> String {
    let last_tap = urge
        .last_tap_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "never".to_string());

    TRACK_HTML
        .replace("{{ID}}", &urge.id.to_string())
        .replace("{{NAME}}", &escape_html(&urge.name))
        .replace("{{TOTAL}}", &urge.total_count.to_string())
        .replace("{{STREAK}}", &urge.current_streak.to_string())
        .replace("{{BEST}}", &urge.best_streak.to_string())
        .replace("{{LAST_TAP}}", &last_tap)
        .replace("{{BADGES}}", &badges(urge))
}

fn badges(urge: &Urge) -> String {
    BADGE_MILESTONES
        .into_iter()
        .map(|milestone| {
            let badge = badge_name(milestone);
            let class = if urge.has_badge(&badge) { "badge earned" } else { "badge" };
            format!(r#"<li class="{class}">{badge}</li>"#)
        })
        .collect()
}

fn chips(urges: &[Urge], main: Option<&Urge>, base: &str) -> String {
    urges
        .iter()
        .map(|urge| {
            let active = main.is_some_and(|selected| selected.id == urge.id);
            format!(
                r#"<a class="chip{}" href="{base}?urge={}">{}</a>"#,
                if active { " active" } else { "" },
                urge.id,
                escape_html(&urge.name)
            )
        })
        .collect()
}

fn page(active_tab: &str, chips: &str, body: &str) -> String {
    let (track_class, stats_class) = if active_tab == "Stats" {
        ("tab", "tab active")
    } else {
        ("tab active", "tab")
    };

    PAGE_HTML
        .replace("{{TITLE}}", active_tab)
        .replace("{{TRACK_CLASS}}", track_class)
        .replace("{{STATS_CLASS}}", stats_class)
        .replace("{{CHIPS}}", chips)
        .replace("{{BODY}}", body)
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const EMPTY_HTML: &str = r#"<p class="hint">No urges yet. Add one below to start tracking.</p>"#;

const ADD_FORM_HTML: &str = r#"
    <form class="inline-form" method="post" action="/urges">
      <input name="name" type="text" placeholder="New urge, e.g. Smoking" required />
      <button class="btn-secondary" type="submit">Add urge</button>
    </form>"#;

const TRACK_HTML: &str = r#"
    <section class="panel">
      <div class="stat">
        <span class="label">Resisted</span>
        <span class="value accent">{{TOTAL}}</span>
      </div>
      <div class="stat">
        <span class="label">Streak</span>
        <span class="value">{{STREAK}}</span>
      </div>
      <div class="stat">
        <span class="label">Best</span>
        <span class="value">{{BEST}}</span>
      </div>
      <div class="stat">
        <span class="label">Last tap</span>
        <span class="value small">{{LAST_TAP}}</span>
      </div>
    </section>
    <section class="actions">
      <form method="post" action="/urges/{{ID}}/tap">
        <button class="btn-resist" type="submit">I resisted {{NAME}}</button>
      </form>
      <form method="post" action="/urges/{{ID}}/reset" onsubmit="return confirm('Log a relapse and reset the streak?');">
        <button class="btn-secondary" type="submit">I relapsed</button>
      </form>
    </section>
    <ul class="badges">{{BADGES}}</ul>
    <section class="manage">
      <form class="inline-form" method="post" action="/urges/{{ID}}/rename">
        <input name="name" type="text" value="{{NAME}}" required />
        <button class="btn-secondary" type="submit">Rename</button>
      </form>
      <form method="post" action="/urges/{{ID}}/delete" onsubmit="return confirm('Delete this urge and its history?');">
        <button class="btn-danger" type="submit">Delete</button>
      </form>
    </section>"#;

const STATS_HTML: &str = r#"
    <section class="panel">
      <div class="stat">
        <span class="label">Days</span>
        <span class="value">{{DAYS}}</span>
      </div>
      <div class="stat">
        <span class="label">Resisted</span>
        <span class="value accent">{{RESISTED}}</span>
      </div>
      <div class="stat">
        <span class="label">Relapsed</span>
        <span class="value">{{RELAPSED}}</span>
      </div>
      <div class="stat">
        <span class="label">Max streak</span>
        <span class="value">{{MAX_STREAK}}</span>
      </div>
    </section>
    <div class="chart-card">
      <svg id="chart" viewBox="0 0 600 260" aria-label="Daily resisted and relapsed" role="img"></svg>
    </div>
    <p class="hint"><span class="key resisted">resisted</span> <span class="key relapsed">relapsed</span></p>
    <script>
      const chartEl = document.getElementById('chart');

      const renderChart = (days) => {
        if (!days.length) {
          chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text>';
          return;
        }

        const width = 600;
        const height = 260;
        const paddingX = 44;
        const paddingY = 34;
        const top = 24;
        const max = Math.max(1, ...days.map((day) => Math.max(day.resisted, day.relapsed)));
        const xStep = days.length > 1 ? (width - paddingX * 2) / (days.length - 1) : 0;
        const scaleY = (height - top - paddingY) / max;
        const x = (index) => paddingX + index * xStep;
        const y = (value) => height - paddingY - value * scaleY;

        const line = (field) => days
          .map((day, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(day[field]).toFixed(2)}`)
          .join(' ');

        const ticks = 4;
        let grid = '';
        for (let i = 0; i <= ticks; i += 1) {
          const value = (max * i) / ticks;
          const yPos = y(value);
          grid += `<line class="chart-grid" x1="${paddingX}" y1="${yPos}" x2="${width - paddingX}" y2="${yPos}" />`;
          grid += `<text class="chart-label" x="${paddingX - 10}" y="${yPos + 4}" text-anchor="end">${Math.round(value * 10) / 10}</text>`;
        }

        const labelEvery = days.length > 8 ? Math.ceil(days.length / 8) : 1;
        const xLabels = days
          .map((day, index) => index % labelEvery === 0
            ? `<text class="chart-label" x="${x(index)}" y="${height - paddingY + 18}" text-anchor="middle">${day.date.slice(5)}</text>`
            : '')
          .join('');

        chartEl.innerHTML = `
          ${grid}
          <path class="chart-line resisted" d="${line('resisted')}" />
          <path class="chart-line relapsed" d="${line('relapsed')}" />
          ${xLabels}
        `;
      };

      fetch('/api/urges/{{ID}}/stats')
        .then((response) => response.json())
        .then((stats) => renderChart(stats.days))
        .catch(() => renderChart([]));
    </script>"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Urge Button · {{TITLE}}</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #2d9c5b;
      --accent-2: #2f4858;
      --danger: #c63b2b;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .tabs,
    .chips {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
    }

    .tabs {
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tab,
    .chip {
      border-radius: 999px;
      padding: 8px 14px;
      font-size: 0.9rem;
      font-weight: 600;
      color: #6b645d;
      text-decoration: none;
    }

    .chip {
      border: 1px solid rgba(47, 72, 88, 0.15);
      background: white;
    }

    .tab.active,
    .chip.active {
      background: var(--accent-2);
      color: white;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .value.accent {
      color: var(--accent);
    }

    .stat .value.small {
      font-size: 1.1rem;
    }

    .actions,
    .manage {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .inline-form {
      display: flex;
      gap: 10px;
    }

    input {
      flex: 1;
      border-radius: 999px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 12px 16px;
      font-size: 1rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      color: white;
      width: 100%;
    }

    .inline-form button {
      width: auto;
    }

    button:active {
      transform: scale(0.98);
    }

    .btn-resist {
      background: var(--accent);
      padding: 28px 20px;
      font-size: 1.3rem;
      box-shadow: 0 10px 24px rgba(45, 156, 91, 0.3);
    }

    .btn-secondary {
      background: var(--accent-2);
    }

    .btn-danger {
      background: var(--danger);
    }

    .badges {
      list-style: none;
      display: flex;
      gap: 10px;
      padding: 0;
      margin: 0;
    }

    .badge {
      padding: 6px 12px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.08);
      color: #9a948c;
      font-size: 0.85rem;
    }

    .badge.earned {
      background: #ffd36b;
      color: var(--ink);
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    #chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke-width: 3;
    }

    .chart-line.resisted {
      stroke: var(--accent);
    }

    .chart-line.relapsed {
      stroke: var(--danger);
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .key.resisted {
      color: var(--accent);
    }

    .key.relapsed {
      color: var(--danger);
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Urge Button</h1>
      <nav class="tabs">
        <a class="{{TRACK_CLASS}}" href="/">Track</a>
        <a class="{{STATS_CLASS}}" href="/stats">Stats</a>
      </nav>
    </header>
    <nav class="chips">{{CHIPS}}</nav>
    {{BODY}}
    <p class="hint">Days follow the server's local calendar. A streak continues when you resist on consecutive days.</p>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_page_escapes_names_and_marks_badges() {
        let mut urge = Urge::new("<Sugar & Co>");
        urge.badges_earned.push(badge_name(7));

        let html = render_track(std::slice::from_ref(&urge), Some(&urge));
        assert!(html.contains("&lt;Sugar &amp; Co&gt;"));
        assert!(!html.contains("<Sugar"));
        assert!(html.contains(r#"<li class="badge earned">7-Day Streak</li>"#));
        assert!(html.contains(r#"<li class="badge">30-Day Streak</li>"#));
        assert!(html.contains(&format!("/urges/{}/tap", urge.id)));
    }

    #[test]
    fn empty_collection_renders_add_form() {
        let html = render_track(&[], None);
        assert!(html.contains("No urges yet"));
        assert!(html.contains(r#"action="/urges""#));
    }

    #[test]
    fn stats_page_shows_summary() {
        let mut urge = Urge::new("Smoking");
        urge.daily_resisted.insert("2026-01-01".into(), 3);
        urge.daily_relapsed.insert("2026-01-02".into(), 1);
        let stats = crate::stats::build_stats(&urge);

        let html = render_stats(std::slice::from_ref(&urge), Some(&urge), Some(&stats));
        assert!(html.contains(&format!("/api/urges/{}/stats", urge.id)));
        assert!(html.contains(r#"<a class="tab active" href="/stats">"#));
        assert!(!html.contains("{{"));
    }
}
