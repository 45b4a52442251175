use std::error::Error;

use qpanel::panel::{Options, Panel};
use qpanel::render::page::{render_page, PageParts};
use qpanel::state::QueryState;
use qpanel::stats;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut panel = Panel::new(Options {
        endpoint: "http://localhost:7001/".to_string(),
        page_url: Some("http://localhost:7001/index.html".to_string()),
        timeout_seconds: 30,
        ..Options::default()
    })?;
    let state = QueryState::new("SELECT ?x WHERE { ?x ?p ?o }").with_max_rows(Some(25));
    let (rendered, stats_result) = panel.submit_with_stats(state).await?;

    let stats_html = match &stats_result {
        Ok(s) => stats::render_stats(s),
        Err(e) => stats::render_stats_unavailable(e),
    };
    let page = render_page(&PageParts {
        endpoint: panel.endpoint().base().to_string(),
        page_url: rendered.link.to_string(),
        state: rendered.state.clone(),
        answer_html: Some(rendered.html.clone()),
        stats_html: Some(stats_html),
    });
    std::fs::write("qpanel.html", page)?;
    println!("Wrote qpanel.html for {}", rendered.link);

    Ok(())
}
