use crate::window::day_label;
use chrono::{Datelike, NaiveDate};

pub fn render_index(today: NaiveDate) -> String {
    INDEX_HTML.replace("{{TODAY}}", &format!("{} {}", day_label(today), today.year()))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Practice Analytics</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f1;
      --bg-2: #bfe0d6;
      --ink: #233032;
      --accent: #2f8f83;
      --accent-2: #2f4858;
      --accent-3: #f0a04b;
      --accent-4: #c65d7b;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3f0ec 60%, #f4f8f7 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(980px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
      animation: rise 600ms ease;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: flex-end;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f5c57;
      font-size: 1rem;
    }

    button,
    select {
      appearance: none;
      border: none;
      border-radius: 999px;
      font-family: inherit;
      font-size: 0.9rem;
      font-weight: 600;
      cursor: pointer;
    }

    button:active {
      transform: scale(0.98);
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tab {
      background: transparent;
      padding: 8px 16px;
      color: #6b645d;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .toolbar {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .sections {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .section-btn {
      background: white;
      border: 1px solid rgba(47, 72, 88, 0.12);
      padding: 8px 14px;
      color: var(--accent-2);
    }

    .section-btn.active {
      background: var(--accent);
      border-color: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(47, 143, 131, 0.3);
    }

    .range {
      background: white;
      border: 1px solid rgba(47, 72, 88, 0.12);
      padding: 8px 14px;
      color: var(--accent-2);
    }

    .range[hidden] {
      display: none;
    }

    .charts {
      display: grid;
      gap: 16px;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 10px;
    }

    .chart-card h2 {
      margin: 0;
      font-size: 1.1rem;
    }

    .chart-card svg {
      width: 100%;
      height: 280px;
      display: block;
    }

    .chart-card svg text {
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 14px;
      font-size: 0.85rem;
      color: #6b645d;
    }

    .legend i {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 3px;
      margin-right: 6px;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .metric {
      font-size: 1.5rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .state {
      padding: 36px 12px;
      text-align: center;
      color: #6b645d;
      border-radius: 20px;
      border: 1px dashed rgba(47, 72, 88, 0.2);
    }

    .state[data-type="error"] {
      color: #c63b2b;
      border-color: rgba(198, 59, 43, 0.4);
      background: rgba(198, 59, 43, 0.05);
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Practice Analytics</h1>
        <p class="subtitle">Consultations, prescriptions, billing and admissions as of <span id="today">{{TODAY}}</span>.</p>
      </div>
      <div class="tabs" role="tablist">
        <button class="tab active" type="button" data-dashboard="analytics" role="tab" aria-selected="true">Analytics</button>
        <button class="tab" type="button" data-dashboard="clinics" role="tab" aria-selected="false">Clinics</button>
      </div>
    </header>

    <section class="toolbar">
      <div class="sections" id="sections"></div>
      <select class="range" id="range" aria-label="Date range" hidden>
        <option value="7days">Last 7 days</option>
        <option value="30days">Last 30 days</option>
        <option value="90days">Last 90 days</option>
        <option value="year">This year</option>
      </select>
    </section>

    <section class="charts" id="charts"></section>

    <p class="hint" id="range-hint"></p>
  </main>

  <script>
    const DASHBOARDS = {
      analytics: [
        { id: 'consultations', label: 'Consultations' },
        { id: 'demographic', label: 'Demographics' },
        { id: 'rx-analytics', label: 'Symptoms & diagnoses' }
      ],
      clinics: [
        { id: 'appointment', label: 'Appointments' },
        { id: 'rx', label: 'Prescriptions' },
        { id: 'opd-billing', label: 'OPD billing' },
        { id: 'ipd-billing', label: 'IPD billing' },
        { id: 'pharmacy-billing', label: 'Pharmacy billing' },
        { id: 'ipd-registration', label: 'IPD registration' }
      ]
    };
    const COLORS = ['var(--accent)', 'var(--accent-2)', 'var(--accent-3)', 'var(--accent-4)'];

    const sectionsEl = document.getElementById('sections');
    const rangeEl = document.getElementById('range');
    const chartsEl = document.getElementById('charts');
    const hintEl = document.getElementById('range-hint');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    let activeDashboard = 'analytics';
    let activeSection = 'consultations';
    let requestSeq = 0;

    const escapeHtml = (value) =>
      String(value).replace(/[&<>"']/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' })[c]);

    const formatAxisValue = (value) => {
      if (value >= 1000) {
        return `${Math.round(value / 100) / 10}k`;
      }
      const rounded = Math.round(value * 10) / 10;
      return Number.isInteger(rounded) ? rounded.toString() : rounded.toFixed(1);
    };

    const formatAmount = (value) =>
      value.toLocaleString(undefined, { minimumFractionDigits: 2, maximumFractionDigits: 2 });

    const showState = (message, type) => {
      chartsEl.innerHTML = `<div class="state" data-type="${type}">${escapeHtml(message)}</div>`;
    };

    // categories: x-axis labels; series: [{ name, values }] aligned with categories.
    const barChart = (title, categories, series, extra = '') => {
      const legend = series
        .map((s, i) => `<span><i style="background:${COLORS[i % COLORS.length]}"></i>${escapeHtml(s.name)}</span>`)
        .join('');
      if (!categories.length) {
        return `<div class="chart-card"><h2>${escapeHtml(title)}</h2>${extra}
          <div class="state">No data for this period</div></div>`;
      }

      const width = 640;
      const height = 280;
      const paddingX = 48;
      const paddingY = 42;
      const top = 16;

      const max = Math.max(1, ...series.flatMap((s) => s.values));
      const plotWidth = width - paddingX * 2;
      const groupWidth = plotWidth / categories.length;
      const barWidth = Math.max(2, (groupWidth * 0.76) / series.length);
      const scaleY = (height - top - paddingY) / max;
      const y = (value) => height - paddingY - value * scaleY;

      const ticks = 4;
      let grid = '';
      for (let i = 0; i <= ticks; i += 1) {
        const value = (max * i) / ticks;
        const yPos = y(value);
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${yPos}" x2="${width - paddingX}" y2="${yPos}" />`;
        grid += `<text class="chart-label" x="${paddingX - 10}" y="${yPos + 4}" text-anchor="end">${formatAxisValue(value)}</text>`;
      }

      let bars = '';
      categories.forEach((category, index) => {
        const groupStart = paddingX + index * groupWidth + groupWidth * 0.12;
        series.forEach((s, i) => {
          const value = s.values[index] || 0;
          const x = groupStart + i * barWidth;
          bars += `<rect x="${x.toFixed(2)}" y="${y(value).toFixed(2)}" width="${(barWidth - 1).toFixed(2)}"
            height="${(value * scaleY).toFixed(2)}" rx="3" fill="${COLORS[i % COLORS.length]}">
            <title>${escapeHtml(s.name)}: ${value}</title></rect>`;
        });
      });

      const labelEvery = categories.length > 12 ? Math.ceil(categories.length / 12) : 1;
      const xLabels = categories
        .map((category, index) => {
          if (index % labelEvery !== 0) {
            return '';
          }
          const x = paddingX + index * groupWidth + groupWidth / 2;
          return `<text class="chart-label" x="${x}" y="${height - paddingY + 18}" text-anchor="middle">${escapeHtml(category)}</text>`;
        })
        .join('');

      return `<div class="chart-card">
        <h2>${escapeHtml(title)}</h2>${extra}
        <svg viewBox="0 0 ${width} ${height}" role="img" aria-label="${escapeHtml(title)}">${grid}${bars}${xLabels}</svg>
        <div class="legend">${legend}</div>
      </div>`;
    };

    const monthly = (series) =>
      series.months.map((month, column) => ({
        name: month,
        values: series.entries.map((entry) => entry.counts[column])
      }));

    const RENDERERS = {
      consultations: (data) =>
        barChart('Consultations per week', data.consultations.entries.map((e) => e.week), monthly(data.consultations)) +
        barChart('Follow-ups per week', data.followUps.entries.map((e) => e.week), monthly(data.followUps)),
      demographic: (data) =>
        barChart('Gender by month', data.gender.map((e) => e.month), [
          { name: 'Male', values: data.gender.map((e) => e.males) },
          { name: 'Female', values: data.gender.map((e) => e.females) },
          { name: 'Other', values: data.gender.map((e) => e.others) }
        ]) +
        barChart('Age groups', data.age.entries.map((e) => e.ageGroup), monthly(data.age)),
      rxAnalytics: (data) =>
        barChart('Top symptoms', data.symptoms.map((e) => e.name), [
          { name: 'Prescriptions', values: data.symptoms.map((e) => e.count) }
        ]) +
        barChart('Top diagnoses', data.diagnoses.map((e) => e.name), [
          { name: 'Prescriptions', values: data.diagnoses.map((e) => e.count) }
        ]),
      appointments: (data) =>
        barChart('Appointments', data.days.map((d) => d.date), [
          { name: 'Approved', values: data.days.map((d) => d.approved) },
          { name: 'Cancelled', values: data.days.map((d) => d.cancelled) },
          { name: 'Completed', values: data.days.map((d) => d.completed) },
          { name: 'Total', values: data.days.map((d) => d.total) }
        ]),
      prescriptions: (data) =>
        barChart('Prescriptions per day', data.days.map((d) => d.date), [
          { name: 'Prescriptions', values: data.days.map((d) => d.count) }
        ]),
      billing: (data) =>
        barChart('Billing per day', data.days.map((d) => d.date), [
          { name: 'Amount', values: data.days.map((d) => d.amount) }
        ], `<span class="metric">Total ${formatAmount(data.total)}</span>`),
      registrations: (data) =>
        barChart('Admissions per day', data.days.map((d) => d.date), [
          { name: 'Approved', values: data.days.map((d) => d.approved) },
          { name: 'Cancelled', values: data.days.map((d) => d.cancelled) },
          { name: 'Discharged', values: data.days.map((d) => d.discharged) },
          { name: 'Total', values: data.days.map((d) => d.total) }
        ])
    };

    const loadSection = async () => {
      const seq = ++requestSeq;
      showState('Loading...', 'loading');

      const params = new URLSearchParams();
      if (activeDashboard === 'clinics') {
        params.set('range', rangeEl.value);
      }

      try {
        const res = await fetch(`/api/sections/${activeSection}?${params}`);
        const body = await res.json().catch(() => ({}));
        if (seq !== requestSeq) {
          return;
        }
        if (!res.ok) {
          const upstream = body.upstreamStatus ? ` (backend HTTP ${body.upstreamStatus})` : '';
          throw new Error(`${body.error || 'Request failed'}${upstream}`);
        }
        const render = RENDERERS[body.data.kind];
        chartsEl.innerHTML = render ? render(body.data) : '';
        hintEl.textContent = `Showing ${body.range.start} to ${body.range.end}.`;
      } catch (err) {
        if (seq === requestSeq) {
          hintEl.textContent = '';
          showState(`Could not load data: ${err.message}`, 'error');
        }
      }
    };

    const renderSectionButtons = () => {
      sectionsEl.innerHTML = DASHBOARDS[activeDashboard]
        .map((s) => `<button class="section-btn${s.id === activeSection ? ' active' : ''}" type="button" data-section="${s.id}">${s.label}</button>`)
        .join('');
      rangeEl.hidden = activeDashboard !== 'clinics';
    };

    const setDashboard = (dashboard) => {
      activeDashboard = dashboard;
      activeSection = DASHBOARDS[dashboard][0].id;
      tabs.forEach((button) => {
        const isActive = button.dataset.dashboard === dashboard;
        button.classList.toggle('active', isActive);
        button.setAttribute('aria-selected', String(isActive));
      });
      renderSectionButtons();
      loadSection();
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => setDashboard(button.dataset.dashboard));
    });

    sectionsEl.addEventListener('click', (event) => {
      const button = event.target.closest('[data-section]');
      if (!button) {
        return;
      }
      activeSection = button.dataset.section;
      renderSectionButtons();
      loadSection();
    });

    rangeEl.addEventListener('change', loadSection);

    setDashboard('analytics');
  </script>
</body>
</html>
"#;
