use realty_core::StatsSummary;

// ── Prompt template ──

const PREAMBLE: &str = "You are a real estate market analysis assistant.";

const INSTRUCTIONS: &str = "\
Using this data:
- Describe the overall trend for the locality/localities.
- Comment on price movement over the years.
- Comment on demand (based on total units).
- Give a short conclusion (investment/market perspective).

Constraints:
- Write 4 to 6 sentences.
- Be clear and simple (for non-technical users).
- Do NOT include JSON, bullet points, or code. Only plain text.";

/// Build the generation prompt: the user's query, the stats as JSON, then
/// the fixed instructions.
pub fn build_prompt(query: &str, stats: &StatsSummary) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string_pretty(stats)?;

    Ok(format!(
        "{PREAMBLE}\n\
         \n\
         User query:\n\
         {query}\n\
         \n\
         Structured data (JSON):\n\
         {data}\n\
         \n\
         {INSTRUCTIONS}\n"
    ))
}

// ── Template fallback ──

/// Deterministic narrative used when no model is configured or the model fails.
pub fn mock_summary(query: &str, stats: &StatsSummary) -> String {
    let areas = if stats.areas.is_empty() {
        "the selected area".to_string()
    } else {
        stats.areas.join(", ")
    };
    format!(
        "This is a mock analysis for {areas} based on data from {from} to {to}. \
         The average price in this period is approximately {price}, \
         and the average demand index is around {demand}. \
         Your query was: '{query}'. \
         Richer insights will be generated once a language model is configured.",
        from = year_text(stats.min_year),
        to = year_text(stats.max_year),
        price = amount_text(stats.avg_price),
        demand = amount_text(stats.avg_demand),
    )
}

fn year_text(year: Option<i64>) -> String {
    year.map_or_else(|| "N/A".to_string(), |y| y.to_string())
}

fn amount_text(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}
