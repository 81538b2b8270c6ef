//! Page-number pagination loop
//!
//! Drives the wrapper chain once per page, reusing one request and only
//! rewriting its page query parameter.

use crate::context::{PagingConfig, ResponseMeta};
use crate::error::{Error, Result};
use crate::http::{clone_request, Exchange};
use bytes::Bytes;
use reqwest::{Request, Response, Url};
use tracing::debug;

/// First page number sent
pub const FIRST_PAGE: u64 = 1;

/// Bodies collected by one call
#[derive(Debug, Clone)]
pub struct Pages {
    /// The last response received
    pub last: ResponseMeta,
    /// Page bodies in fetch order
    pub bodies: Vec<Bytes>,
}

impl Pages {
    /// Number of pages fetched
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Check if no page was fetched
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Fetch one page, or every page when `paging.consume_all` is set
pub async fn consume(
    exchange: &dyn Exchange,
    request: Request,
    paging: &PagingConfig,
) -> Result<Pages> {
    if !paging.consume_all {
        let response = exchange.exchange(request).await?;
        let (last, body) = read_page(response).await?;
        return Ok(Pages {
            last,
            bodies: vec![body],
        });
    }

    let mut request = request;
    let mut page = FIRST_PAGE;
    let mut bodies = Vec::new();

    loop {
        set_query_param(request.url_mut(), &paging.page_param, &page.to_string());

        let response = exchange.exchange(clone_request(&request)?).await?;
        let (last, body) = read_page(response).await?;
        bodies.push(body);

        let Some(total) = total_pages(&last, &paging.page_count_header)? else {
            debug!("No '{}' header on page {}, stopping", paging.page_count_header, page);
            return Ok(Pages { last, bodies });
        };

        if i64::try_from(page).map_or(true, |current| current >= total) {
            debug!("Fetched {} of {} pages", page, total);
            return Ok(Pages { last, bodies });
        }
        page += 1;
    }
}

async fn read_page(response: Response) -> Result<(ResponseMeta, Bytes)> {
    let meta = ResponseMeta::from_response(&response);
    let body = response.bytes().await?;
    Ok((meta, body))
}

/// Read the total page count; `None` when the header is absent
///
/// Any integer is accepted. Zero or a negative total ends the loop after the
/// current page.
pub(crate) fn total_pages(meta: &ResponseMeta, header: &str) -> Result<Option<i64>> {
    let Some(value) = meta.headers.get(header) else {
        return Ok(None);
    };

    let raw = String::from_utf8_lossy(value.as_bytes());
    raw.trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| Error::PageCount {
            header: header.to_string(),
            value: raw.into_owned(),
        })
}

/// Replace (or add) a single query parameter, keeping all others
pub fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(name, value);
}
