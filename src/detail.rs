//! Product detail view parameters

use reqwest::Url;

/// Optional variant selection carried in the detail page query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailQuery {
    pub size: Option<String>,
    pub color: Option<String>,
}

impl DetailQuery {
    /// Parse `size` and `color` out of a query string (leading `?` allowed).
    /// Keys and values are form-urlencoded. Unknown keys are ignored; the
    /// last occurrence of a key wins.
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        let Ok(mut url) = Url::parse("http://localhost/") else {
            return parsed;
        };
        url.set_query(Some(query.trim_start_matches('?')));

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "size" => parsed.size = Some(value.into_owned()),
                "color" => parsed.color = Some(value.into_owned()),
                _ => {}
            }
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_and_color() {
        let q = DetailQuery::parse("?size=M&color=dark+blue");
        assert_eq!(q.size.as_deref(), Some("M"));
        assert_eq!(q.color.as_deref(), Some("dark blue"));
    }

    #[test]
    fn test_missing_params() {
        assert_eq!(DetailQuery::parse(""), DetailQuery::default());
        assert_eq!(DetailQuery::parse("ref=home").size, None);
    }

    #[test]
    fn test_percent_escapes() {
        let q = DetailQuery::parse("color=r%C3%A9d&size=100%");
        assert_eq!(q.color.as_deref(), Some("réd"));
        assert_eq!(q.size.as_deref(), Some("100%"));
    }

    #[test]
    fn test_encoded_keys() {
        let q = DetailQuery::parse("si%7Ae=M&%63olor=red");
        assert_eq!(q.size.as_deref(), Some("M"));
        assert_eq!(q.color.as_deref(), Some("red"));
    }
}
