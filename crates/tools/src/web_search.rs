//! Web search tool — summary lookup against public knowledge APIs.
//!
//! Lookup order:
//! 1. Wikipedia REST summary for the query as given
//! 2. Wikipedia again for a few spelling variations of the query
//! 3. DuckDuckGo Instant Answer API
//!
//! The tool never fails outward: transport problems are described inside
//! the returned text block.

use async_trait::async_trait;
use miniagent_config::SearchConfig;
use miniagent_core::error::ToolError;
use miniagent_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Related topics included from a DuckDuckGo answer.
const MAX_RELATED_TOPICS: usize = 3;

pub struct WebSearchTool {
    client: reqwest::Client,
    wikipedia_base_url: String,
    duckduckgo_url: String,
}

impl WebSearchTool {
    pub fn new(config: &SearchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("miniagent/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client for search");
                reqwest::Client::new()
            });

        Self {
            client,
            wikipedia_base_url: config.wikipedia_base_url.trim_end_matches('/').to_string(),
            duckduckgo_url: config.duckduckgo_url.clone(),
        }
    }

    /// Search for `query` and return a formatted multi-line text block.
    pub async fn search(&self, query: &str) -> String {
        match self.lookup(query).await {
            Ok(text) => text,
            Err(e) => {
                warn!(query, error = %e, "Search failed");
                unavailable_block(query, &e)
            }
        }
    }

    async fn lookup(&self, query: &str) -> Result<String, String> {
        if let Some(extract) = self.wikipedia_summary(query).await? {
            info!(query, "Search answered by Wikipedia");
            return Ok(wikipedia_block(query, &extract));
        }

        for variation in query_variations(query) {
            debug!(query, %variation, "Retrying Wikipedia with query variation");
            if let Some(extract) = self.wikipedia_summary(&variation).await? {
                info!(query, %variation, "Search answered by Wikipedia variation");
                return Ok(wikipedia_block(query, &extract));
            }
        }

        if let Some(block) = self.duckduckgo(query).await? {
            info!(query, "Search answered by DuckDuckGo");
            return Ok(block);
        }

        Ok(not_found_block(query))
    }

    async fn wikipedia_summary(&self, title: &str) -> Result<Option<String>, String> {
        let mut url = reqwest::Url::parse(&self.wikipedia_base_url).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|_| format!("invalid Wikipedia base URL: {}", self.wikipedia_base_url))?
            .pop_if_empty()
            .extend(["page", "summary", title]);

        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            debug!(title, status = response.status().as_u16(), "No Wikipedia summary");
            return Ok(None);
        }

        let summary: WikipediaSummary = response.json().await.map_err(|e| e.to_string())?;
        Ok(summary.extract.filter(|e| !e.trim().is_empty()))
    }

    async fn duckduckgo(&self, query: &str) -> Result<Option<String>, String> {
        let response = self
            .client
            .get(&self.duckduckgo_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let body: serde_json::Value = response.json().await.map_err(|e| e.to_string())?;
        Ok(format_duckduckgo(query, &body))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Searches the web for a given query and returns a short factual summary."
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        Ok(match self.lookup(query).await {
            Ok(output) => ToolResult::text(output),
            Err(e) => {
                warn!(query, error = %e, "Search failed");
                ToolResult {
                    call_id: String::new(),
                    success: false,
                    output: unavailable_block(query, &e),
                    data: None,
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct WikipediaSummary {
    extract: Option<String>,
}

/// Alternative titles worth trying when the literal query has no article.
fn query_variations(query: &str) -> Vec<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    let candidates = [
        words.join("_"),
        words.iter().take(2).copied().collect::<Vec<_>>().join("_"),
        query
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
            .collect::<String>()
            .trim()
            .to_string(),
    ];

    let mut variations: Vec<String> = Vec::new();
    for candidate in candidates {
        if !candidate.is_empty() && candidate != query && !variations.contains(&candidate) {
            variations.push(candidate);
        }
    }
    variations
}

/// Render a DuckDuckGo Instant Answer.
///
/// Returns `None` unless the answer has an abstract, a direct answer or a
/// definition; related topics alone are not enough.
fn format_duckduckgo(query: &str, body: &serde_json::Value) -> Option<String> {
    let field = |name: &str| {
        body[name]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };
    let abstract_text = field("Abstract");
    let answer = field("Answer");
    let definition = field("Definition");

    if abstract_text.is_none() && answer.is_none() && definition.is_none() {
        return None;
    }

    let mut result = format!("Search results for \"{query}\":\n\n");
    if let Some(text) = &abstract_text {
        result.push_str(&format!("Summary: {text}\n\n"));
    }
    if let Some(text) = &answer {
        result.push_str(&format!("Direct Answer: {text}\n\n"));
    }
    if let Some(text) = &definition {
        result.push_str(&format!("Definition: {text}\n\n"));
    }

    if let Some(topics) = body["RelatedTopics"].as_array().filter(|t| !t.is_empty()) {
        result.push_str("Related Topics:\n");
        for (index, topic) in topics.iter().take(MAX_RELATED_TOPICS).enumerate() {
            if let Some(text) = topic["Text"].as_str() {
                result.push_str(&format!("{}. {text}\n", index + 1));
            }
        }
        result.push('\n');
    }

    Some(result)
}

fn wikipedia_block(query: &str, extract: &str) -> String {
    format!("Search results for \"{query}\":\n\nSummary: {extract}\n\nSource: Wikipedia")
}

fn not_found_block(query: &str) -> String {
    format!(
        "Search results for \"{query}\":\n\nNo specific information found. Try:\n\
         - Rephrasing your search\n- Being more specific\n- Using different keywords\n\n\
         Tip: For current events, try searching for specific news sources."
    )
}

fn unavailable_block(query: &str, error: &str) -> String {
    format!(
        "Search results for \"{query}\":\n\nSorry, I couldn't search for \"{query}\" at the moment. \
         Please try again later.\n\nError: {error}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> SearchConfig {
        SearchConfig {
            wikipedia_base_url: "http://127.0.0.1:9/api/rest_v1".into(),
            duckduckgo_url: "http://127.0.0.1:9/".into(),
            timeout_secs: 2,
        }
    }

    #[test]
    fn variations_skip_original_and_duplicates() {
        assert_eq!(
            query_variations("Albert Einstein"),
            vec!["Albert_Einstein".to_string()]
        );
        assert_eq!(
            query_variations("quantum physics basics"),
            vec![
                "quantum_physics_basics".to_string(),
                "quantum_physics".to_string()
            ]
        );
        assert_eq!(
            query_variations("Paris!"),
            vec!["Paris".to_string()]
        );
        assert!(query_variations("Einstein").is_empty());
    }

    #[test]
    fn duckduckgo_with_answer_is_formatted() {
        let body = serde_json::json!({
            "Abstract": "Paris is the capital of France.",
            "Answer": "",
            "Definition": "",
            "RelatedTopics": [
                {"Text": "Eiffel Tower"},
                {"Name": "grouped"},
                {"Text": "Louvre"},
                {"Text": "Seine"}
            ]
        });
        let block = format_duckduckgo("capital of France", &body).unwrap();
        assert!(block.starts_with("Search results for \"capital of France\":"));
        assert!(block.contains("Summary: Paris is the capital of France."));
        assert!(!block.contains("Direct Answer"));
        assert!(block.contains("1. Eiffel Tower"));
        assert!(block.contains("3. Louvre"));
        assert!(!block.contains("Seine"));
    }

    #[test]
    fn duckduckgo_topics_alone_are_not_an_answer() {
        let body = serde_json::json!({
            "Abstract": "",
            "RelatedTopics": [{"Text": "Something"}]
        });
        assert!(format_duckduckgo("q", &body).is_none());
    }

    #[test]
    fn wikipedia_block_names_source() {
        let block = wikipedia_block("Einstein", "Physicist.");
        assert!(block.contains("Summary: Physicist."));
        assert!(block.ends_with("Source: Wikipedia"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_reported_in_text() {
        let tool = WebSearchTool::new(&unreachable_config());
        let result = tool
            .execute(serde_json::json!({"query": "Albert Einstein"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("couldn't search for \"Albert Einstein\""));
        assert!(result.output.contains("Error:"));
    }

    #[tokio::test]
    async fn search_never_fails_outward() {
        let tool = WebSearchTool::new(&unreachable_config());
        let text = tool.search("anything").await;
        assert!(text.starts_with("Search results for \"anything\""));
    }

    #[tokio::test]
    async fn missing_query_returns_error() {
        let tool = WebSearchTool::new(&SearchConfig::default());
        let result = tool.execute(serde_json::json!({})).await;
        assert!(result.is_err());
    }
}
