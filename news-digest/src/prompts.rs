use crate::types::{AnnotatedRecord, RawArticle};

/// Number of annotations fed into the overview prompt.
pub const OVERVIEW_INPUT_LIMIT: usize = 10;

/// Prompt asking for one annotation in the labeled-line layout the extractors read.
pub fn annotation_prompt(article: &RawArticle) -> String {
    format!(
        "\
You are a sustainability analyst at a semiconductor company (Arm) focused on climate-related reporting and strategy.

Here is an article headline and URL. Please infer as much context as possible from the title and source.

Your job is to:
1. Summarize the article in 2 sentences
2. Explain how the article relates to Arm's sustainability strategy, especially in:
   - Emissions disclosure or climate regulation
   - Scope 3 or supply chain decarbonization
   - Energy use in datacenters or AI infrastructure
   - Net zero, renewables, or fossil fuel phase-out
3. Rate its relevance to Arm (High, Medium, or Low)
4. List any major AI or tech companies mentioned (industry peers)

Title: {}
Link: {}

Return in this format:

Title: ...
Summary: ...
Relevance to Arm: High/Medium/Low
Company/Industry Mentions: ...
",
        article.title, article.link
    )
}

/// Prompt asking for five bullet-point insights over the first few annotations.
pub fn overview_prompt(records: &[AnnotatedRecord]) -> String {
    let summaries: Vec<&str> = records
        .iter()
        .take(OVERVIEW_INPUT_LIMIT)
        .map(|record| record.gpt_summary.as_str())
        .collect();

    format!(
        "\
You are a sustainability strategy analyst at a semiconductor company (Arm).
Based on the summaries below, extract the **5 most important insights or trends** from this month's climate-related activity.
Each insight should be 1 bullet point and include relevant company names, themes (e.g. Scope 3, regulation, datacenter energy), or changes in the policy landscape.

Summaries:
{}

Return exactly 5 bullet points.
",
        summaries.join("\n\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::assign_id;
    use chrono::Utc;

    #[test]
    fn annotation_prompt_embeds_title_and_link() {
        let article = RawArticle {
            title: "Grid Upgrade".to_string(),
            link: "https://example.com/grid".to_string(),
            category: "energy".to_string(),
            description: String::new(),
            published_at: String::new(),
            fetched_at: Utc::now(),
        };
        let prompt = annotation_prompt(&article);
        assert!(prompt.contains("Title: Grid Upgrade\nLink: https://example.com/grid\n"));
        assert!(prompt.contains("Relevance to Arm: High/Medium/Low"));
    }

    #[test]
    fn overview_uses_first_ten_summaries() {
        let records: Vec<AnnotatedRecord> = (0..12)
            .map(|i| AnnotatedRecord {
                id: assign_id(&format!("t{}", i), "https://example.com"),
                original_title: format!("t{}", i),
                link: "https://example.com".to_string(),
                category: "news".to_string(),
                gpt_summary: format!("summary-{:02}", i),
                published_at: None,
            })
            .collect();
        let prompt = overview_prompt(&records);
        assert!(prompt.contains("summary-00\n\nsummary-01"));
        assert!(prompt.contains("summary-09"));
        assert!(!prompt.contains("summary-10"));
    }
}
