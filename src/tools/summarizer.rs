use crate::chunker::MessageChunker;
use crate::llm::LLMClient;
use crate::tools::search::SearchClient;
use crate::types::{Result, SearchHit};
use std::sync::Arc;
use tracing::{debug, warn};

/// Search results paired with their condensed summaries.
#[derive(Debug, Clone, Default)]
pub struct SearchSummary {
    pub query: String,
    pub entries: Vec<SummaryEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub hit: SearchHit,
    pub summary: String,
}

impl SearchSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compact form injected into the generation prompt.
    pub fn prompt_context(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("[{}] {}: {} ({})", i + 1, e.hit.title, e.summary, e.hit.url))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// User-facing source list, one block per result.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(SummaryEntry::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl SummaryEntry {
    /// Title, summary and link as one block.
    pub fn render(&self) -> String {
        format!("**{}**\n{}\n<{}>", self.hit.title, self.summary, self.hit.url)
    }
}

/// Runs a web search and has the backend condense each result.
pub struct SearchSummarizer {
    search: Arc<dyn SearchClient>,
    llm: Arc<dyn LLMClient>,
    max_results: usize,
    summary_length: usize,
    chunker: MessageChunker,
}

impl SearchSummarizer {
    pub fn new(
        search: Arc<dyn SearchClient>,
        llm: Arc<dyn LLMClient>,
        max_results: usize,
        summary_length: usize,
        max_chunk_length: usize,
    ) -> Self {
        Self {
            search,
            llm,
            max_results: max_results.max(1),
            summary_length: summary_length.max(1),
            chunker: MessageChunker::new(max_chunk_length),
        }
    }

    /// Searches for `query` and summarizes the top results.
    ///
    /// # Errors
    ///
    /// Only search failures are returned. If the backend cannot summarize,
    /// the raw snippets are used instead.
    pub async fn summarize(&self, query: &str) -> Result<SearchSummary> {
        let hits = self.search.search(query, self.max_results).await?;
        let hits: Vec<SearchHit> = hits.into_iter().take(self.max_results).collect();

        if hits.is_empty() {
            debug!(query, "Search returned no results");
            return Ok(SearchSummary {
                query: query.to_string(),
                entries: vec![],
            });
        }

        let summaries = match self.llm.generate(&self.summary_prompt(query, &hits)).await {
            Ok(text) => parse_numbered_lines(&text, hits.len()),
            Err(e) => {
                warn!(error = %e, "Summarization failed, falling back to snippets");
                vec![None; hits.len()]
            }
        };

        // Keep each rendered block within one outbound message.
        let block_budget = self.chunker.max_length();
        let entries = hits
            .into_iter()
            .zip(summaries)
            .map(|(hit, summary)| {
                let summary = summary.unwrap_or_else(|| hit.snippet.clone());
                let overhead = hit.title.chars().count() + hit.url.chars().count() + 8;
                let limit = self
                    .summary_length
                    .min(block_budget.saturating_sub(overhead).max(1));
                SummaryEntry {
                    summary: truncate_chars(&summary, limit),
                    hit,
                }
            })
            .collect();

        Ok(SearchSummary {
            query: query.to_string(),
            entries,
        })
    }

    /// Packs rendered blocks into transport-safe replies.
    ///
    /// Blocks are only combined when the whole block fits, so a title stays
    /// with its summary and link. A block longer than the limit on its own
    /// (an oversized title or URL) is chunked separately.
    pub fn render_fragments(&self, summary: &SearchSummary) -> Vec<String> {
        let max = self.chunker.max_length();
        let mut fragments = Vec::new();
        let mut current: Option<(String, usize)> = None;

        for block in summary.entries.iter().map(SummaryEntry::render) {
            let block_len = block.chars().count();

            if let Some((buf, len)) = current.as_mut() {
                if *len + 2 + block_len <= max {
                    buf.push_str("\n\n");
                    buf.push_str(&block);
                    *len += 2 + block_len;
                    continue;
                }
            }

            if let Some((buf, _)) = current.take() {
                fragments.push(buf);
            }

            if block_len <= max {
                current = Some((block, block_len));
            } else {
                fragments.extend(self.chunker.chunk(&block));
            }
        }

        if let Some((buf, _)) = current {
            fragments.push(buf);
        }
        fragments
    }

    fn summary_prompt(&self, query: &str, hits: &[SearchHit]) -> String {
        let listing = hits
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{}. {}\n{}", i + 1, h.title, h.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "検索クエリ「{}」の検索結果を、それぞれ{}文字以内の日本語で要約してください。\n\
             各要約は「番号. 要約」の形式で1行ずつ出力してください。\n\n{}",
            query, self.summary_length, listing
        )
    }
}

/// Extracts `"N. text"` lines into slot `N-1`; unnumbered output is taken
/// line by line in order.
fn parse_numbered_lines(text: &str, count: usize) -> Vec<Option<String>> {
    let mut slots: Vec<Option<String>> = vec![None; count];
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut numbered = false;
    for line in &lines {
        if let Some((num, rest)) = line.split_once('.') {
            if let Ok(n) = num.trim().parse::<usize>() {
                numbered = true;
                if (1..=count).contains(&n) && !rest.trim().is_empty() {
                    slots[n - 1] = Some(rest.trim().to_string());
                }
            }
        }
    }

    if !numbered {
        for (slot, line) in slots.iter_mut().zip(lines) {
            *slot = Some(line.to_string());
        }
    }

    slots
}

/// Truncates to at most `max` chars, marking the cut with an ellipsis.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BotError;
    use async_trait::async_trait;

    struct FixedSearch(Vec<SearchHit>);

    #[async_trait]
    impl SearchClient for FixedSearch {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>> {
            // Ignores the limit so trimming in the summarizer is observable.
            Ok(self.0.clone())
        }
    }

    struct FixedLlm(Option<String>);

    #[async_trait]
    impl LLMClient for FixedLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.0
                .clone()
                .ok_or_else(|| BotError::Backend("unavailable".to_string()))
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn hits(count: usize, snippet: &str) -> Vec<SearchHit> {
        (1..=count)
            .map(|i| SearchHit {
                title: format!("Title {}", i),
                snippet: format!("{} {}", snippet, i),
                url: format!("https://ex.com/{}", i),
            })
            .collect()
    }

    fn summarizer(
        hits: Vec<SearchHit>,
        reply: Option<&str>,
        max_results: usize,
        summary_length: usize,
        max_chunk_length: usize,
    ) -> SearchSummarizer {
        SearchSummarizer::new(
            Arc::new(FixedSearch(hits)),
            Arc::new(FixedLlm(reply.map(str::to_string))),
            max_results,
            summary_length,
            max_chunk_length,
        )
    }

    #[tokio::test]
    async fn test_summarize_uses_backend_summaries() {
        let s = summarizer(hits(2, "snippet"), Some("1. one\n2. two"), 3, 200, 2000);
        let summary = s.summarize("q").await.unwrap();

        let texts: Vec<&str> = summary.entries.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(summary.query, "q");
    }

    #[tokio::test]
    async fn test_summarize_falls_back_to_snippets() {
        let s = summarizer(hits(2, "snippet"), None, 3, 200, 2000);
        let summary = s.summarize("q").await.unwrap();

        let texts: Vec<&str> = summary.entries.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(texts, vec!["snippet 1", "snippet 2"]);
    }

    #[tokio::test]
    async fn test_summarize_trims_to_max_results() {
        let s = summarizer(hits(6, "snippet"), None, 2, 200, 2000);
        let summary = s.summarize("q").await.unwrap();

        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.entries[1].hit.title, "Title 2");
    }

    #[tokio::test]
    async fn test_summarize_truncates_to_summary_length() {
        let long = "x".repeat(50);
        let s = summarizer(hits(1, "s"), Some(&format!("1. {}", long)), 3, 10, 2000);
        let summary = s.summarize("q").await.unwrap();

        assert_eq!(summary.entries[0].summary, format!("{}…", "x".repeat(9)));
    }

    #[tokio::test]
    async fn test_summarize_truncates_to_block_budget() {
        let long = "y".repeat(200);
        let s = summarizer(hits(1, "s"), Some(&format!("1. {}", long)), 3, 500, 60);
        let summary = s.summarize("q").await.unwrap();

        let block = summary.entries[0].render();
        assert!(block.chars().count() <= 60);
        assert!(summary.entries[0].summary.ends_with('…'));
    }

    #[tokio::test]
    async fn test_summarize_empty_results() {
        let s = summarizer(vec![], Some("unused"), 3, 200, 2000);
        assert!(s.summarize("q").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fragments_keep_blocks_whole() {
        let s = summarizer(hits(3, &"b".repeat(40)), None, 3, 200, 90);
        let summary = s.summarize("q").await.unwrap();
        let fragments = s.render_fragments(&summary);

        assert!(fragments.iter().all(|f| f.chars().count() <= 90));
        for entry in &summary.entries {
            let block = entry.render();
            assert!(
                fragments.iter().any(|f| f.contains(&block)),
                "block split across fragments: {:?}",
                block
            );
        }
    }

    #[tokio::test]
    async fn test_fragments_pack_small_blocks_together() {
        let s = summarizer(hits(3, "short"), None, 3, 200, 2000);
        let summary = s.summarize("q").await.unwrap();
        assert_eq!(s.render_fragments(&summary), vec![summary.render()]);
    }

    #[test]
    fn test_oversized_block_is_chunked() {
        let s = summarizer(vec![], None, 3, 200, 20);
        let summary = SearchSummary {
            query: "q".to_string(),
            entries: vec![SummaryEntry {
                hit: SearchHit {
                    title: "T".repeat(30),
                    snippet: String::new(),
                    url: "https://ex.com".to_string(),
                },
                summary: "s".to_string(),
            }],
        };
        let fragments = s.render_fragments(&summary);
        assert!(fragments.len() > 1);
        assert!(fragments.iter().all(|f| f.chars().count() <= 20));
    }

    #[test]
    fn test_parse_numbered_lines() {
        let parsed = parse_numbered_lines("1. 最初\n2. 二番目\n3. 三番目", 3);
        assert_eq!(
            parsed,
            vec![
                Some("最初".to_string()),
                Some("二番目".to_string()),
                Some("三番目".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_numbered_lines_missing_entry() {
        let parsed = parse_numbered_lines("2. only second\n9. out of range", 3);
        assert_eq!(parsed, vec![None, Some("only second".to_string()), None]);
    }

    #[test]
    fn test_parse_unnumbered_lines() {
        let parsed = parse_numbered_lines("first\n\nsecond", 3);
        assert_eq!(
            parsed,
            vec![Some("first".to_string()), Some("second".to_string()), None]
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 4), "abc…");
        assert_eq!(truncate_chars("あいうえお", 3), "あい…");
    }

    #[test]
    fn test_render_and_prompt_context() {
        let summary = SearchSummary {
            query: "rust".to_string(),
            entries: vec![SummaryEntry {
                hit: SearchHit {
                    title: "Rust".to_string(),
                    snippet: "A language".to_string(),
                    url: "https://www.rust-lang.org".to_string(),
                },
                summary: "システムプログラミング言語".to_string(),
            }],
        };
        assert_eq!(
            summary.render(),
            "**Rust**\nシステムプログラミング言語\n<https://www.rust-lang.org>"
        );
        assert_eq!(
            summary.prompt_context(),
            "[1] Rust: システムプログラミング言語 (https://www.rust-lang.org)"
        );
    }
}
