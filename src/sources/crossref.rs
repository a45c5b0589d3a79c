use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ReciteError, Result};
use crate::http::RateLimitedClient;
use crate::identifiers::Doi;
use crate::sources::MetadataProvider;
use crate::types::{clean_text, Author, ResolvedMetadata};

/// Crossref works API client.
///
/// Registering an email moves requests into the polite pool, which gets
/// markedly better throttling than the anonymous one.
pub struct CrossrefProvider {
    client: RateLimitedClient,
    base_url: String,
}

impl CrossrefProvider {
    pub fn new(polite_email: Option<String>) -> Self {
        Self::with_params(
            "https://api.crossref.org",
            Duration::from_millis(100),
            polite_email,
        )
    }

    pub fn with_params(
        base_url: &str,
        min_interval: Duration,
        polite_email: Option<String>,
    ) -> Self {
        let user_agent = match &polite_email {
            Some(email) => format!("recite/0.1 (mailto:{})", email),
            None => "recite/0.1".to_string(),
        };
        let client = RateLimitedClient::new(min_interval, 3, &user_agent);
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl MetadataProvider for CrossrefProvider {
    async fn by_identifier(&self, doi: &Doi) -> Result<Option<ResolvedMetadata>> {
        let url = format!("{}/works/{}", self.base_url, doi.normalized);
        let val: Value = match self.client.get_json(&url).await {
            Ok(val) => val,
            Err(ReciteError::ApiError(_, detail)) if detail.starts_with("HTTP 404") => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        parse_work(&val["message"]).map(Some)
    }

    async fn by_bibliographic_query(&self, text: &str) -> Result<Option<ResolvedMetadata>> {
        let url = format!(
            "{}/works?query.bibliographic={}&sort=relevance&order=desc&rows=1",
            self.base_url,
            urlencoding::encode(text)
        );
        let val: Value = self.client.get_json(&url).await?;

        let Some(item) = val["message"]["items"]
            .as_array()
            .and_then(|items| items.first())
        else {
            return Ok(None);
        };
        parse_work(item).map(Some)
    }
}

/// Map one Crossref work object to engine metadata.
pub fn parse_work(v: &Value) -> Result<ResolvedMetadata> {
    let doi_str = v["DOI"]
        .as_str()
        .ok_or_else(|| ReciteError::Parse("missing DOI in Crossref response".to_string()))?;
    let doi = Doi::parse(doi_str)?;

    let title = v["title"]
        .as_array()
        .and_then(|a| a.first())
        .and_then(|t| t.as_str())
        .map(clean_text)
        .unwrap_or_default();

    let authors = v["author"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|a| {
                    let family = a["family"].as_str()?;
                    Some(Author::new(a["given"].as_str(), family))
                })
                .collect()
        })
        .unwrap_or_default();

    let journal = v["container-title"]
        .as_array()
        .and_then(|a| a.first())
        .and_then(|t| t.as_str())
        .map(clean_text)
        .filter(|s| !s.is_empty());

    Ok(ResolvedMetadata {
        doi: doi.normalized,
        title,
        authors,
        journal,
        year: parse_year(v),
        volume: non_empty_str(&v["volume"]),
        issue: non_empty_str(&v["issue"]),
        pages: non_empty_str(&v["page"]),
        article_number: non_empty_str(&v["article-number"]),
    })
}

fn non_empty_str(v: &Value) -> Option<String> {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn parse_year(v: &Value) -> Option<i32> {
    // Crossref date parts: "published-print": {"date-parts": [[2017, 6, 12]]}
    v["published-print"]["date-parts"][0][0]
        .as_i64()
        .or_else(|| v["published-online"]["date-parts"][0][0].as_i64())
        .or_else(|| v["issued"]["date-parts"][0][0].as_i64())
        .or_else(|| v["created"]["date-parts"][0][0].as_i64())
        .map(|n| n as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn fetches_and_parses_a_work_by_doi() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/works/10.1038/nature14539")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "status": "ok",
                "message": {
                    "DOI": "10.1038/nature14539",
                    "title": ["Human-level control through deep reinforcement learning"],
                    "author": [
                        {"given": "Volodymyr", "family": "mnih"},
                        {"given": "Koray", "family": "KAVUKCUOGLU"}
                    ],
                    "container-title": ["Nature"],
                    "published-print": {"date-parts": [[2015, 2, 26]]},
                    "volume": "518",
                    "issue": "7540",
                    "page": "529-533"
                }
            }"#,
            )
            .create_async()
            .await;

        let provider =
            CrossrefProvider::with_params(&server.url(), Duration::from_secs(0), None);
        let doi = Doi::parse("10.1038/nature14539").unwrap();
        let meta = provider.by_identifier(&doi).await.unwrap().unwrap();

        assert_eq!(meta.doi, "10.1038/nature14539");
        assert_eq!(meta.authors.len(), 2);
        assert_eq!(meta.authors[0].family, "Mnih");
        assert_eq!(meta.authors[1].family, "Kavukcuoglu");
        assert_eq!(meta.year, Some(2015));
        assert_eq!(meta.volume.as_deref(), Some("518"));
        assert_eq!(meta.pages.as_deref(), Some("529-533"));
        assert_eq!(meta.article_number, None);
    }

    #[tokio::test]
    async fn unknown_doi_is_absent_not_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/works/10.1000/missing")
            .with_status(404)
            .with_body("Resource not found")
            .create_async()
            .await;

        let provider =
            CrossrefProvider::with_params(&server.url(), Duration::from_secs(0), None);
        let doi = Doi::parse("10.1000/missing").unwrap();
        assert!(provider.by_identifier(&doi).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bibliographic_query_returns_top_hit() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock(
                "GET",
                "/works?query.bibliographic=Mnih%202015%20human-level%20control&sort=relevance&order=desc&rows=1",
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "status": "ok",
                "message": {
                    "items": [
                        {"DOI": "10.1038/nature14539", "title": ["Human-level control"], "score": 95.5}
                    ]
                }
            }"#,
            )
            .create_async()
            .await;

        let provider =
            CrossrefProvider::with_params(&server.url(), Duration::from_secs(0), None);
        let meta = provider
            .by_bibliographic_query("Mnih 2015 human-level control")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(meta.doi, "10.1038/nature14539");
    }

    #[tokio::test]
    async fn empty_result_set_is_absent() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/works\?query\.bibliographic=.*".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "ok", "message": {"items": []}}"#)
            .create_async()
            .await;

        let provider =
            CrossrefProvider::with_params(&server.url(), Duration::from_secs(0), None);
        let result = provider.by_bibliographic_query("gibberish").await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn parse_work_cleans_markup_in_titles() {
        let v: Value = serde_json::from_str(
            r#"{
            "DOI": "10.1000/x",
            "title": ["Creatine &amp; the brain: <i>a review</i>"]
        }"#,
        )
        .unwrap();
        let meta = parse_work(&v).unwrap();
        assert_eq!(meta.title, "Creatine & the brain: a review");
    }
}
