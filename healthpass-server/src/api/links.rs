//! `next` / `previous` links of paginated envelopes

use axum::http::Uri;
use reqwest::Url;
use shared::response::PageLinks;

use crate::db::pagination::Page;

const PAGE_ID: &str = "page_id";
const PAGE_SIZE: &str = "page_size";

/// `{address}{path}?{query}` with `page_size` and `page_id` replaced
fn link(address: &str, uri: &Uri, page_size: u64, page_id: u64) -> Option<String> {
    let raw = match uri.query() {
        Some(query) => format!("{address}{}?{query}", uri.path()),
        None => format!("{address}{}", uri.path()),
    };
    let mut url = match Url::parse(&raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, url = %raw, "Cannot build page link");
            return None;
        }
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != PAGE_ID && k != PAGE_SIZE)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(PAGE_SIZE, &page_size.to_string())
        .append_pair(PAGE_ID, &page_id.to_string());

    Some(url.into())
}

/// Navigation block for `page`, as served at `uri` (the un-nested request URI)
pub fn page_links<T>(address: &str, uri: &Uri, page: &Page<T>) -> PageLinks {
    let to = |page_id: Option<u64>| page_id.and_then(|id| link(address, uri, page.page_size, id));
    PageLinks {
        next: to(page.next_page_id()),
        previous: to(page.prev_page_id()),
        count: page.total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page_id: u64, page_size: u64, total: u64) -> Page<()> {
        Page {
            items: Vec::new(),
            page_id,
            page_size,
            total,
        }
    }

    #[test]
    fn test_middle_page_links() {
        let uri: Uri = "/api/v1/role?page_id=2&page_size=1".parse().unwrap();
        let links = page_links("http://localhost:8000", &uri, &page(2, 1, 3));
        assert_eq!(
            links.next.as_deref(),
            Some("http://localhost:8000/api/v1/role?page_size=1&page_id=3")
        );
        assert_eq!(
            links.previous.as_deref(),
            Some("http://localhost:8000/api/v1/role?page_size=1&page_id=1")
        );
        assert_eq!(links.count, 3);
    }

    #[test]
    fn test_other_params_are_preserved() {
        let uri: Uri = "/api/v1/manage-user?role_id=4&sex=1".parse().unwrap();
        let links = page_links("https://hp.example.com", &uri, &page(1, 20, 45));
        assert_eq!(
            links.next.as_deref(),
            Some("https://hp.example.com/api/v1/manage-user?role_id=4&sex=1&page_size=20&page_id=2")
        );
        assert_eq!(links.previous, None);
    }

    #[test]
    fn test_last_and_empty_pages() {
        let uri: Uri = "/api/v1/form".parse().unwrap();
        let links = page_links("http://localhost:8000", &uri, &page(3, 10, 30));
        assert_eq!(links.next, None);
        assert!(links.previous.is_some());

        let links = page_links("http://localhost:8000", &uri, &Page::<()>::empty(20));
        assert_eq!(links, PageLinks::empty());
    }
}
