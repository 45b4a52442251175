use qpanel::panel::{Options, Panel};
use qpanel::state::QueryState;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut panel = Panel::new(Options {
        endpoint: "http://localhost:7001/".to_string(),
        timeout_seconds: 30,
        ..Options::default()
    })?;
    let rendered = panel
        .submit(QueryState::new("SELECT ?s ?p ?o WHERE { ?s ?p ?o }").with_max_rows(Some(10)))
        .await?;

    println!("Link: {}", rendered.link);
    match &rendered.outcome {
        Ok(result) if result.is_error() => println!("Query error: {}", result.exception),
        Ok(result) => println!("Rows: {} of {}", result.rows_sent(), result.resultsize),
        Err(e) => println!("Request failed: {e}"),
    }
    println!("{}", rendered.html);

    Ok(())
}
