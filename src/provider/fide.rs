//! FIDE standard rating adapter
//!
//! FIDE publishes no JSON API for ratings, so the adapter reads the standard
//! rating block of the public profile page.

use crate::error::FetchError;
use crate::provider::adapter::RatingProvider;
use crate::provider::http::{endpoint_url, get_text};
use crate::types::{Rating, RatingSystem};
use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{Html, Selector};

const RATING_BLOCK_SELECTOR: &str = "div.profile-top-rating-data";
const RATING_LABEL_SELECTOR: &str = "span.profile-top-rating-dataDesc";
const STANDARD_LABEL: &str = "std";

pub struct FideProvider {
    client: Client,
    base_url: String,
}

impl FideProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn profile_url(&self, fide_id: &str) -> Result<Url, FetchError> {
        endpoint_url(&self.base_url, &["profile", fide_id])
    }

    /// Find the standard rating in a profile page.
    ///
    /// A profile without a standard rating ("Not rated") is reported as not found.
    pub fn parse_rating(html: &str, fide_id: &str) -> Result<Rating, FetchError> {
        let document = Html::parse_document(html);
        let block_selector = Selector::parse(RATING_BLOCK_SELECTOR).map_err(|e| {
            FetchError::Transient {
                message: format!("invalid selector: {:?}", e),
            }
        })?;
        let label_selector = Selector::parse(RATING_LABEL_SELECTOR).map_err(|e| {
            FetchError::Transient {
                message: format!("invalid selector: {:?}", e),
            }
        })?;

        let standard_block = document.select(&block_selector).find(|block| {
            block
                .select(&label_selector)
                .next()
                .map(|label| label.text().collect::<String>().trim().eq_ignore_ascii_case(STANDARD_LABEL))
                .unwrap_or(false)
        });

        let Some(block) = standard_block else {
            return Err(FetchError::Transient {
                message: format!("FIDE profile {} has no standard rating block", fide_id),
            });
        };

        let text: String = block.text().collect();
        let digits: String = text
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();

        digits.parse().map_err(|_| FetchError::NotFound {
            username: fide_id.to_string(),
        })
    }
}

#[async_trait]
impl RatingProvider for FideProvider {
    fn system(&self) -> RatingSystem {
        RatingSystem::Fide
    }

    async fn fetch_rating(&self, fide_id: &str) -> Result<Rating, FetchError> {
        let url = self.profile_url(fide_id)?;
        let html = get_text(&self.client, url.as_str(), fide_id).await?;
        Self::parse_rating(&html, fide_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"
        <html><body>
          <div class="profile-top-rating-data profile-top-rating-data_gray">
            <span class="profile-top-rating-dataDesc">std</span>2830
          </div>
          <div class="profile-top-rating-data profile-top-rating-data_red">
            <span class="profile-top-rating-dataDesc">rapid</span>2823
          </div>
        </body></html>
    "#;

    const UNRATED: &str = r#"
        <div class="profile-top-rating-data profile-top-rating-data_gray">
          <span class="profile-top-rating-dataDesc">std</span>Not rated
        </div>
    "#;

    #[test]
    fn test_parse_standard_rating() {
        assert_eq!(FideProvider::parse_rating(PROFILE, "1503014"), Ok(2830));
    }

    #[test]
    fn test_unrated_profile_is_not_found() {
        assert!(matches!(
            FideProvider::parse_rating(UNRATED, "99999999"),
            Err(FetchError::NotFound { .. })
        ));
    }

    #[test]
    fn test_page_without_rating_block() {
        assert!(matches!(
            FideProvider::parse_rating("<html><body>maintenance</body></html>", "1503014"),
            Err(FetchError::Transient { .. })
        ));
    }

    #[test]
    fn test_profile_url_keeps_id_in_one_segment() {
        let provider = FideProvider::new(Client::new(), "https://ratings.fide.com");
        assert_eq!(
            provider.profile_url("1503014").unwrap().as_str(),
            "https://ratings.fide.com/profile/1503014"
        );
        assert_eq!(
            provider.profile_url("1503014?x=1").unwrap().as_str(),
            "https://ratings.fide.com/profile/1503014%3Fx=1"
        );
    }
}
