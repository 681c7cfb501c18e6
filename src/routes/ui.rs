use axum::{response::Html, routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Patent Scout - Paper Search</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 2rem; color: #1d1d1f; }
    h1 { margin-bottom: 0.5rem; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    label { display: block; margin-top: 0.75rem; font-weight: 600; }
    input { width: 100%; padding: 0.5rem; }
    button { margin-top: 1rem; padding: 0.6rem 1rem; }
    table { border-collapse: collapse; width: 100%; }
    th, td { border: 1px solid #ddd; padding: 0.4rem; vertical-align: top; text-align: left; }
    .status { margin: 1rem 0; font-weight: 600; }
    .status.error { color: #b00020; }
    .status.success { color: #1b7f3b; }
    pre { background: #f6f8fa; padding: 1rem; white-space: pre-wrap; }
  </style>
</head>
<body>
  <h1>Paper Search</h1>
  <p>Search academic papers, summarize their abstracts and draft patent proposals from the top results.</p>

  <div class="card">
    <label for="query">Search keywords</label>
    <input id="query" placeholder="quantum computing" />
    <label for="numResults">Number of results</label>
    <input id="numResults" type="number" min="1" max="100" value="10" />
    <button id="searchBtn">Search</button>
  </div>

  <div id="status" class="status"></div>
  <div id="results"></div>
  <div id="proposals"></div>

  <script>
    const statusEl = document.getElementById('status');
    const resultsEl = document.getElementById('results');
    const proposalsEl = document.getElementById('proposals');

    function setStatus(text, kind) {
      statusEl.textContent = text;
      statusEl.className = 'status ' + (kind || '');
    }

    function el(tag, text) {
      const node = document.createElement(tag);
      if (text !== undefined) node.textContent = text;
      return node;
    }

    function field(label, value) {
      const p = el('p');
      p.appendChild(el('strong', label + ': '));
      p.appendChild(document.createTextNode(value));
      return p;
    }

    function renderTable(results) {
      const table = el('table');
      const head = el('tr');
      ['Title', 'Author', 'Year', 'Journal', 'Summary'].forEach(h => head.appendChild(el('th', h)));
      table.appendChild(head);
      results.forEach(r => {
        const row = el('tr');
        [r.paper.title, r.paper.author, r.paper.year, r.paper.journal, r.summary]
          .forEach(v => row.appendChild(el('td', v)));
        table.appendChild(row);
      });
      resultsEl.appendChild(table);
    }

    function renderProposals(proposals) {
      proposals.forEach(p => {
        const card = el('div');
        card.className = 'card';
        card.appendChild(el('h2', p.name));
        card.appendChild(field('Novelty', p.novelty));
        card.appendChild(field('Inventive step', p.inventive_step));
        card.appendChild(field('Competitors', p.competitors));
        card.appendChild(el('strong', 'Claims:'));
        p.claims.forEach(c => card.appendChild(el('p', c)));
        card.appendChild(field('Summary', p.summary));
        card.appendChild(el('strong', 'Proposal:'));
        card.appendChild(el('pre', p.body));
        proposalsEl.appendChild(card);
      });
    }

    document.getElementById('searchBtn').addEventListener('click', async () => {
      resultsEl.innerHTML = '';
      proposalsEl.innerHTML = '';
      const numResults = Math.min(100, Math.max(1, parseInt(document.getElementById('numResults').value, 10) || 10));
      const payload = {
        query: document.getElementById('query').value.trim(),
        num_results: numResults
      };
      setStatus('Searching...');
      const res = await fetch('/api/search', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(payload)
      });
      const json = await res.json();
      if (!res.ok) {
        setStatus(json.details || 'Search failed', 'error');
        return;
      }
      if (json.status === 'not_found') {
        setStatus(json.message, 'error');
        return;
      }
      setStatus(json.message, 'success');
      renderTable(json.results);
      renderProposals(json.proposals);
    });
  </script>
</body>
</html>"#)
}
