pub const STYLE: &str = r#"
:root { --green:#10B981; --red:#EF4444; --amber:#F59E0B; --blue:#3B82F6;
  --grey:#64748B; --dark:#0F172A; --card:#FFFFFF; --bg:#F1F5F9;
  --border:#E2E8F0; --sidebar-w:220px; }
* { margin:0; padding:0; box-sizing:border-box; }
html, body { height:100%; }
body { font-family:'Segoe UI',-apple-system,sans-serif; background:var(--bg); color:#1E293B; }
a { color:var(--blue); text-decoration:none; }
.sidebar { position:fixed; inset:0 auto 0 0; width:var(--sidebar-w); background:var(--dark);
  display:flex; flex-direction:column; overflow-y:auto; z-index:100; }
.sidebar-header { padding:18px 16px 12px; border-bottom:1px solid rgba(255,255,255,.1); }
.sidebar-header h3 { color:#fff; font-size:14px; }
.sidebar-header .subtitle { color:var(--grey); font-size:10px; margin-top:2px; }
.tab-list { flex:1; padding:8px; }
.tab-btn { display:flex; align-items:center; gap:4px; width:100%; background:none; border:none;
  border-left:3px solid transparent; border-radius:8px; color:#94A3B8; cursor:pointer;
  font:600 13px inherit; padding:10px 12px; margin-bottom:2px; text-align:left; text-decoration:none; }
.tab-btn:hover { color:#E2E8F0; background:rgba(255,255,255,.05); }
.tab-btn.active { color:#fff; background:rgba(59,130,246,.15); border-left-color:var(--blue); }
.tab-btn .ticker-name { flex:1; }
.tab-btn .price-sm { font-size:10px; }
.tab-btn.loading .ticker-name::after { content:' …'; }
.grade-badge { font-size:9px; font-weight:700; color:#fff; padding:1px 5px; border-radius:4px; }
.del-btn { display:none; width:16px; height:16px; border-radius:50%; background:rgba(255,255,255,.1);
  font-size:10px; line-height:16px; text-align:center; }
.tab-btn:hover .del-btn { display:inline-block; }
.del-btn:hover { background:var(--red); color:#fff; }
.group-header { display:flex; align-items:center; gap:6px; padding:8px 12px; color:#94A3B8;
  font-size:10px; font-weight:700; letter-spacing:1.2px; text-transform:uppercase; cursor:pointer; }
.group-header .count { margin-left:auto; color:#475569; font-weight:400; }
.group-header.collapsed .chevron { transform:rotate(-90deg); }
.group-body.collapsed { display:none; }
.add-symbol { position:relative; padding:8px; border-top:1px solid rgba(255,255,255,.1); }
.add-symbol input { width:100%; padding:7px 10px; border:1px solid rgba(255,255,255,.15);
  border-radius:6px; background:rgba(255,255,255,.07); color:#fff; font:12px inherit; }
.add-symbol .hint { font-size:9px; color:#475569; margin-top:4px; }
.ac-dropdown { position:absolute; left:8px; right:8px; bottom:100%; display:none; max-height:240px;
  overflow-y:auto; background:#1E293B; border:1px solid rgba(255,255,255,.15); border-radius:6px; }
.ac-item { display:flex; gap:8px; padding:7px 10px; font-size:12px; color:#CBD5E1; cursor:pointer; }
.ac-item.highlighted, .ac-item:hover { background:rgba(59,130,246,.2); color:#fff; }
.ac-item .ac-ticker { font-weight:700; color:#fff; }
.main-container { margin-left:var(--sidebar-w); padding:20px 24px; min-height:100vh; }
.site-frame { margin-left:var(--sidebar-w); width:calc(100% - var(--sidebar-w)); height:100vh; border:0; display:block; }
.stock-header { display:flex; justify-content:space-between; align-items:center; color:#fff;
  background:linear-gradient(135deg,#0F172A,#1E3A5F); padding:20px 28px; border-radius:14px; margin-bottom:16px; }
.stock-header h1 { font-size:22px; }
.stock-header .sub, .price-block .meta { font-size:12px; opacity:.7; }
.price-block { text-align:right; }
.price-block .price { font-size:28px; font-weight:800; }
.scorecard { display:flex; flex-wrap:wrap; gap:10px; margin-bottom:16px; }
.score-card { flex:1; min-width:120px; background:var(--card); border-radius:10px; padding:14px 10px;
  text-align:center; box-shadow:0 1px 3px rgba(0,0,0,.08); }
.score-card .label { font-size:9px; color:var(--grey); letter-spacing:1px; text-transform:uppercase; }
.score-card .value { font-size:22px; font-weight:800; margin:3px 0; }
.score-card .desc { font-size:10px; color:var(--grey); }
.dims { display:grid; grid-template-columns:repeat(auto-fit,minmax(170px,1fr)); gap:8px 16px; }
.dim .name { font-size:11px; color:var(--grey); display:flex; justify-content:space-between; }
.dim .track, .bar-52w { height:6px; background:var(--border); border-radius:3px; margin:4px 0; }
.dim .fill, .bar-52w .fill { height:100%; border-radius:3px; }
.section { background:var(--card); border-radius:12px; padding:16px; margin-bottom:16px;
  box-shadow:0 1px 3px rgba(0,0,0,.08); }
.section h2 { font-size:14px; color:var(--dark); margin-bottom:10px; padding-bottom:6px;
  border-bottom:2px solid var(--border); }
.charts-grid { display:grid; grid-template-columns:repeat(auto-fit,minmax(380px,1fr)); gap:14px; margin-bottom:16px; }
.chart-card { background:var(--card); border-radius:12px; padding:10px; box-shadow:0 1px 3px rgba(0,0,0,.08); }
.grid { display:grid; grid-template-columns:1fr 1fr; gap:14px; margin-bottom:16px; }
.grid-4 { display:grid; grid-template-columns:repeat(auto-fit,minmax(250px,1fr)); gap:14px; margin-bottom:16px; }
.metric { display:flex; justify-content:space-between; padding:4px 0; font-size:13px; border-bottom:1px solid #F1F5F9; }
.metric .key { color:var(--grey); }
.metric .val { font-weight:600; }
.positive { color:var(--green); }
.negative { color:var(--red); }
.signal { margin:3px 0; font-size:13px; }
.signal.bullish { color:var(--green); } .signal.bearish { color:var(--red); }
.signal.caution, .signal.neutral { color:var(--amber); } .signal.info { color:var(--grey); }
.flag { padding:4px 10px; margin:3px 0; border-radius:6px; font-size:12px; }
.flag.green { background:#F0FDF4; color:#166534; border-left:3px solid var(--green); }
.flag.amber { background:#FFFBEB; color:#92400E; border-left:3px solid var(--amber); }
.flag.red { background:#FEF2F2; color:#991B1B; border-left:3px solid var(--red); }
.data-table { width:100%; border-collapse:collapse; font-size:12px; }
.data-table th { background:#F8FAFC; color:var(--grey); font-size:11px; padding:4px 6px;
  text-align:right; border-bottom:2px solid var(--border); }
.data-table td { padding:4px 6px; text-align:right; border-bottom:1px solid #F1F5F9; }
.data-table td:first-child, .data-table th:first-child { text-align:left; }
.data-table tr.self { background:#EBF5FF; font-weight:600; }
.segment-tag { display:inline-block; background:#EBF5FF; color:var(--blue); padding:3px 10px;
  border-radius:16px; margin:3px; font-size:12px; }
.sh-bar { display:flex; height:20px; border-radius:6px; overflow:hidden; margin:8px 0; }
.sh-bar > div { display:flex; align-items:center; justify-content:center; font-size:10px; color:#fff; font-weight:600; }
.doc-item { padding:3px 0; font-size:12px; }
.period-bar { display:flex; gap:4px; margin-bottom:8px; }
.period-btn { padding:5px 14px; border:1px solid var(--border); border-radius:6px; background:var(--card);
  color:var(--grey); cursor:pointer; font:600 12px inherit; }
.period-btn.active { background:var(--blue); border-color:var(--blue); color:#fff; }
.waterfall-row { display:flex; align-items:center; padding:5px 0; font-size:13px; border-bottom:1px solid #F1F5F9; }
.waterfall-row.total { font-weight:700; }
.waterfall-head { font-size:12px; color:var(--grey); margin-bottom:6px; }
.wf-label { flex:1; } .wf-value { width:120px; text-align:right; }
.wf-pct { width:70px; text-align:right; color:var(--grey); font-size:12px; }
.wf-bar { width:140px; padding-left:12px; } .wf-bar > div { height:8px; border-radius:4px; }
.notice { text-align:center; padding:40px; }
.notice code { display:inline-block; background:#1E293B; color:#E2E8F0; padding:10px 20px; border-radius:8px; margin:12px 0; }
.footer { text-align:center; color:var(--grey); font-size:11px; padding:12px; }
@media (max-width:768px) { .grid, .grid-4 { grid-template-columns:1fr; } :root { --sidebar-w:64px; }
  .sidebar-header h3, .tab-btn .price-sm, .add-symbol .hint { display:none; } }
"#;

/// Period switching inside a pane. Needed by both the dashboard and the
/// standalone pane files.
pub const PANE_SCRIPT: &str = r#"
document.addEventListener('click', function (e) {
  var btn = e.target.closest('.period-btn');
  if (!btn) return;
  var block = btn.closest('.price-block-charts');
  block.querySelectorAll('.period-btn').forEach(function (b) {
    b.classList.toggle('active', b === btn);
  });
  block.querySelectorAll('.price-period').forEach(function (d) {
    d.style.display = d.dataset.period === btn.dataset.period ? 'block' : 'none';
  });
});
"#;

/// Sidebar behaviour for the monolithic dashboard. `SERVER_MODE` is
/// declared by the page before this script runs.
pub const DASHBOARD_SCRIPT: &str = r#"
var acTimer = null, acIdx = -1, acItems = [];

function paneFor(ticker) {
  return Array.prototype.find.call(document.querySelectorAll('.tab-pane'),
    function (p) { return p.dataset.ticker === ticker; });
}
function tabFor(ticker) {
  return Array.prototype.find.call(document.querySelectorAll('.tab-btn'),
    function (b) { return b.dataset.ticker === ticker; });
}
function switchTab(ticker) {
  document.querySelectorAll('.tab-pane').forEach(function (p) {
    p.style.display = p.dataset.ticker === ticker ? 'block' : 'none';
  });
  document.querySelectorAll('.tab-btn').forEach(function (b) {
    b.classList.toggle('active', b.dataset.ticker === ticker);
  });
}
function updateCount() {
  var n = document.querySelectorAll('.tab-pane').length;
  document.querySelector('.sidebar-header .subtitle').textContent = n + ' stock' + (n === 1 ? '' : 's');
}
function fromHtml(html) {
  var t = document.createElement('template');
  t.innerHTML = html.trim();
  return t.content.firstElementChild;
}
function loadingPane(ticker, message) {
  var pane = document.createElement('div');
  pane.className = 'tab-pane';
  pane.dataset.ticker = ticker;
  pane.style.display = 'none';
  var header = document.createElement('div');
  header.className = 'stock-header';
  var h1 = document.createElement('h1');
  h1.textContent = ticker;
  var sub = document.createElement('div');
  sub.className = 'sub';
  sub.textContent = message;
  header.appendChild(h1);
  header.appendChild(sub);
  pane.appendChild(header);
  return pane;
}
function staticNotice(pane, ticker) {
  var box = document.createElement('div');
  box.className = 'section notice';
  var p = document.createElement('p');
  p.textContent = 'This is a static report. To add ' + ticker + ', start the live server:';
  var code = document.createElement('code');
  code.textContent = 'screener -w watchlist.txt --serve';
  var link = document.createElement('a');
  link.href = 'https://www.screener.in/company/' + encodeURIComponent(ticker) + '/';
  link.target = '_blank';
  link.textContent = 'View on screener.in';
  box.appendChild(p);
  box.appendChild(code);
  box.appendChild(document.createElement('br'));
  box.appendChild(link);
  pane.appendChild(box);
}
function addSymbol(single) {
  var input = document.getElementById('add-symbol-input');
  var raw = (single || input.value).trim().toUpperCase();
  input.value = '';
  hideAC();
  if (!raw) return;
  var tickers = raw.split(/[\s,;]+/).map(function (t) {
    return t.replace(/[^A-Z0-9&-]/g, '');
  }).filter(Boolean);
  tickers.forEach(function (ticker) {
    if (paneFor(ticker)) { switchTab(ticker); return; }
    var btn = document.createElement('button');
    btn.className = 'tab-btn loading';
    btn.dataset.ticker = ticker;
    var name = document.createElement('span');
    name.className = 'ticker-name';
    name.textContent = ticker;
    btn.appendChild(name);
    document.querySelector('.tab-list').appendChild(btn);
    var pane = loadingPane(ticker, SERVER_MODE ? 'Analysing…' : 'Not yet analysed');
    document.querySelector('.main-container').appendChild(pane);
    updateCount();
    if (!SERVER_MODE) {
      btn.classList.remove('loading');
      staticNotice(pane, ticker);
      return;
    }
    fetch('/api/tickers/' + encodeURIComponent(ticker), { method: 'POST' })
      .then(function (r) { return r.json(); })
      .then(function (data) {
        if (data.error) {
          btn.classList.remove('loading');
          pane.querySelector('.sub').textContent = 'Error: ' + data.error;
          return;
        }
        btn.replaceWith(fromHtml(data.tab_html));
        pane.replaceWith(fromHtml(data.pane_html));
        switchTab(ticker);
      })
      .catch(function (err) {
        btn.classList.remove('loading');
        pane.querySelector('.sub').textContent = 'Fetch failed: ' + err.message;
      });
  });
  if (tickers.length === 1) switchTab(tickers[0]);
}
function deleteStock(ticker) {
  var btn = tabFor(ticker);
  var current = document.querySelector('.tab-btn.active');
  var keep = current && current.dataset.ticker !== ticker ? current.dataset.ticker : null;
  var pane = paneFor(ticker);
  if (pane) pane.remove();
  var done = function () {
    updateCount();
    if (keep !== null) {
      switchTab(keep);
      return;
    }
    var first = document.querySelector('.tab-btn');
    if (first) switchTab(first.dataset.ticker);
  };
  if (!SERVER_MODE) {
    if (btn) btn.remove();
    done();
    return;
  }
  fetch('/api/tickers/' + encodeURIComponent(ticker), { method: 'DELETE' })
    .then(function (r) { return r.ok ? r.text() : null; })
    .then(function (html) {
      if (html !== null) document.querySelector('.tab-list').innerHTML = html;
      else if (btn) btn.remove();
      done();
    });
}
function showAC(items) {
  var dd = document.getElementById('ac-dropdown');
  acItems = items || [];
  acIdx = -1;
  dd.innerHTML = '';
  if (!acItems.length) { dd.style.display = 'none'; return; }
  acItems.forEach(function (item, i) {
    var row = document.createElement('div');
    row.className = 'ac-item';
    var t = document.createElement('span');
    t.className = 'ac-ticker';
    t.textContent = item.ticker;
    var n = document.createElement('span');
    n.className = 'ac-name';
    n.textContent = item.name || '';
    row.appendChild(t);
    row.appendChild(n);
    row.onmousedown = function (e) { e.preventDefault(); addSymbol(item.ticker); };
    row.onmouseover = function () { highlightAC(i); };
    dd.appendChild(row);
  });
  dd.style.display = 'block';
}
function hideAC() {
  var dd = document.getElementById('ac-dropdown');
  if (dd) dd.style.display = 'none';
  acItems = [];
  acIdx = -1;
}
function highlightAC(i) {
  document.querySelectorAll('#ac-dropdown .ac-item').forEach(function (el, j) {
    el.classList.toggle('highlighted', i === j);
  });
  acIdx = i;
}
function onSymbolKey(e) {
  if (e.key === 'ArrowDown' || e.key === 'ArrowUp') {
    e.preventDefault();
    if (!acItems.length) return;
    var step = e.key === 'ArrowDown' ? 1 : -1;
    highlightAC(Math.max(0, Math.min(acItems.length - 1, acIdx + step)));
    return;
  }
  if (e.key === 'Enter') {
    e.preventDefault();
    addSymbol(acIdx >= 0 ? acItems[acIdx].ticker : null);
    return;
  }
  if (e.key === 'Escape') { hideAC(); return; }
  clearTimeout(acTimer);
  var q = e.target.value.trim();
  if (!SERVER_MODE || q.length < 2) { hideAC(); return; }
  acTimer = setTimeout(function () {
    fetch('/api/search?q=' + encodeURIComponent(q))
      .then(function (r) { return r.json(); })
      .then(function (data) { showAC(data.results); })
      .catch(hideAC);
  }, 250);
}
document.addEventListener('click', function (e) {
  var del = e.target.closest('.del-btn');
  if (del) { e.stopPropagation(); deleteStock(del.closest('.tab-btn').dataset.ticker); return; }
  var tab = e.target.closest('.tab-btn');
  if (tab) { switchTab(tab.dataset.ticker); return; }
  var group = e.target.closest('.group-header');
  if (group) {
    group.classList.toggle('collapsed');
    group.nextElementSibling.classList.toggle('collapsed');
    return;
  }
  if (!e.target.closest('.add-symbol')) hideAC();
});
document.addEventListener('keyup', function (e) {
  if (e.target.id === 'add-symbol-input' && ['ArrowDown', 'ArrowUp', 'Enter', 'Escape'].indexOf(e.key) < 0) onSymbolKey(e);
});
document.addEventListener('keydown', function (e) {
  if (e.target.id === 'add-symbol-input') {
    if (['ArrowDown', 'ArrowUp', 'Enter', 'Escape'].indexOf(e.key) >= 0) onSymbolKey(e);
    return;
  }
  if (e.target.tagName === 'INPUT' || (e.key !== 'ArrowUp' && e.key !== 'ArrowDown')) return;
  var tabs = Array.prototype.slice.call(document.querySelectorAll('.tab-btn'));
  if (!tabs.length) return;
  e.preventDefault();
  var i = tabs.findIndex(function (b) { return b.classList.contains('active'); });
  i = (i + (e.key === 'ArrowDown' ? 1 : tabs.length - 1)) % tabs.length;
  switchTab(tabs[i].dataset.ticker);
});
"#;

pub const SITE_SCRIPT: &str = r#"
document.addEventListener('click', function (e) {
  var tab = e.target.closest('.tab-btn');
  if (tab) {
    document.querySelectorAll('.tab-btn').forEach(function (b) { b.classList.toggle('active', b === tab); });
    return;
  }
  var group = e.target.closest('.group-header');
  if (group) {
    group.classList.toggle('collapsed');
    group.nextElementSibling.classList.toggle('collapsed');
  }
});
"#;
