#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use billscraper::{BillId, BillType, Chamber, FetchError, PageFetcher, ScrapeConfig};

pub const BASE_URL: &str = "https://congress.test";

#[derive(Debug, Clone)]
pub enum Canned {
    Page(String),
    Status(u16),
    Unreachable,
}

/// Serves canned responses and remembers every URL it was asked for.
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, Vec<Canned>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues responses for `url`; the last one repeats once the queue drains.
    pub fn respond(&self, url: impl Into<String>, canned: Vec<Canned>) {
        self.responses.lock().unwrap().insert(url.into(), canned);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let canned = {
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.remove(0),
                Some(queue) => queue[0].clone(),
                None => Canned::Status(404),
            }
        };
        match canned {
            Canned::Page(body) => Ok(body),
            Canned::Status(status) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            Canned::Unreachable => Err(FetchError::Other {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            }),
        }
    }
}

pub fn config(
    chamber: Chamber,
    bill_type: BillType,
    range: std::ops::RangeInclusive<u32>,
    output: &std::path::Path,
) -> ScrapeConfig {
    let mut config = ScrapeConfig::new(117, chamber, bill_type, range, output);
    config.base_url = BASE_URL.to_string();
    config.request_interval = std::time::Duration::ZERO;
    config
}

pub fn all_info_url(chamber: Chamber, bill_type: BillType, number: u32) -> String {
    BillId::new(117, chamber, bill_type, number).all_info_url(BASE_URL)
}

pub fn text_url(chamber: Chamber, bill_type: BillType, number: u32) -> String {
    BillId::new(117, chamber, bill_type, number).text_url(BASE_URL)
}

/// A trimmed-down all-info page with the markers the parser looks for.
pub fn bill_page(citation: &str, title: &str) -> String {
    format!(
        r#"<html><body>
<h1 class="legDetail">{citation} - {title}<span>117th Congress (2021-2022)</span></h1>
<div class="overview"><table>
  <tr><th>Sponsor:</th><td>Rep. Doe, Jane [D-CA-12] (Introduced 02/01/2021)</td></tr>
  <tr><th>Latest Action:</th><td>House - 02/01/2021 Referred to the House Committee on Rules. (All Actions)</td></tr>
</table>
<ol class="bill_progress">
  <li class="selected">Introduced<div>Array ( )</div></li>
  <li>Passed House</li>
</ol>
</div>
</body></html>"#
    )
}

pub fn text_page(body: &str) -> String {
    format!(
        r#"<html><body>
<h3 class="currentVersion">Text: <span>Introduced in House (02/01/2021)</span></h3>
<pre id="billTextContainer">&lt;DOC&gt;
                                 A BILL

{body}
</pre>
</body></html>"#
    )
}
