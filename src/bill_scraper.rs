use anyhow::anyhow;
use chrono::NaiveDate;
use log::{debug, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{
    bill::{BillId, BillRecord, RelatedBill, Sponsor, Summary},
    config::{Chamber, ScrapeConfig},
    error::{FetchError, ParseError, ScrapeError},
    page_cache::{PageCache, PageKind},
    requests::PageFetcher,
    text_manipulators::{
        collapse_whitespace, extract_clean_text, extract_text, normalize_label,
        strip_bill_text_preamble,
    },
};

const TITLE_MARKER: &str = "h1.legDetail";
const TEXT_BODY_MARKER: &str = "pre#billTextContainer";

fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector `{css}`: {e}"))
}

/// The current text version of a bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillText {
    pub version: Option<String>,
    pub body: String,
}

/// Extracts bill fields from congress.gov pages by locating fixed markers.
pub struct BillPageParser {
    title: Selector,
    overview_row: Selector,
    th: Selector,
    td: Selector,
    tbody: Selector,
    tr: Selector,
    tracker_stage: Selector,
    cosponsor_table: Selector,
    committee_row: Selector,
    titles_row: Selector,
    official_titles_row: Selector,
    house_column: Selector,
    senate_column: Selector,
    related_bill_row: Selector,
    policy_area: Selector,
    subject: Selector,
    summary_header: Selector,
    summary_paragraph: Selector,
    text_version: Selector,
    text_body: Selector,
    // `Rep. Doe, Jane [D-CA-12]`, `Sen. Roe, John [R-TX]`
    member_regex: Regex,
    introduced_regex: Regex,
    date_regex: Regex,
    roll_call_regex: Regex,
}

impl BillPageParser {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            title: selector(TITLE_MARKER)?,
            overview_row: selector("div.overview tr")?,
            th: selector("th")?,
            td: selector("td")?,
            tbody: selector("tbody")?,
            tr: selector("tr")?,
            tracker_stage: selector("ol.bill_progress > li")?,
            cosponsor_table: selector("#cosponsors-content table.item_table")?,
            committee_row: selector("#committees-content tr")?,
            titles_row: selector("#titles_main div.titles-row")?,
            official_titles_row: selector("#titles_main div.officialTitles div.titles-row")?,
            house_column: selector("div.house-column")?,
            senate_column: selector("div.senate-column")?,
            related_bill_row: selector("#relatedBills-content tr")?,
            policy_area: selector("#subjects-content div.search-column-nav ul li")?,
            subject: selector("#subjects-content div.search-column-main ul li")?,
            summary_header: selector("#latestSummary-content h3 span")?,
            summary_paragraph: selector("#latestSummary-content p")?,
            text_version: selector("h3.currentVersion span")?,
            text_body: selector(TEXT_BODY_MARKER)?,
            member_regex: Regex::new(
                r"^(?P<name>[^\[]+?)\s*\[(?P<party>[^\]\-]+)-(?P<state>[^\]\-]+)(?:-(?P<district>[^\]]+))?\]",
            )?,
            introduced_regex: Regex::new(r"Introduced\s+(\d{2}/\d{2}/\d{4})")?,
            date_regex: Regex::new(r"\d{2}/\d{2}/\d{4}")?,
            roll_call_regex: Regex::new(r"There (?:have|has) been (\d+) roll call votes?")?,
        })
    }

    /// Parses the `all-info` page of a bill. Only the title heading is
    /// required; every other field is left empty when its marker is missing.
    pub fn parse_all_info(
        &self,
        html: &str,
        id: &BillId,
        base_url: &str,
    ) -> Result<BillRecord, ParseError> {
        let document = Html::parse_document(html);

        let title = self.parse_title(&document)?;
        let mut record = BillRecord {
            bill_id: id.to_string(),
            congress: id.congress,
            chamber: id.chamber,
            bill_type: id.bill_type,
            number: id.number,
            url: id.page_url(base_url),
            title,
            titles_short: self.parse_short_titles(&document, id.chamber),
            titles_official: self.parse_official_titles(&document, id.chamber),
            sponsor: None,
            introduced_date: None,
            status: None,
            latest_action: None,
            tracker: vec![],
            cosponsors: vec![],
            committees: vec![],
            related_bills: vec![],
            policy_area: None,
            subjects: vec![],
            roll_call_votes: 0,
            summary: None,
            text_version: None,
            raw_text: None,
        };

        self.parse_overview(&document, &mut record);

        let (tracker, current_stage) = self.parse_tracker(&document);
        record.tracker = tracker;
        record.status = current_stage.or_else(|| record.latest_action.clone());

        record.cosponsors = self.parse_cosponsors(&document);
        record.committees = self.parse_committees(&document);
        record.related_bills = self.parse_related_bills(&document);
        record.policy_area = document
            .select(&self.policy_area)
            .next()
            .map(extract_clean_text)
            .filter(|s| !s.is_empty());
        record.subjects = document
            .select(&self.subject)
            .map(extract_clean_text)
            .filter(|s| !s.is_empty())
            .collect();
        record.summary = self.parse_summary(&document);

        Ok(record)
    }

    /// Parses the plain-text (`?format=txt`) page of a bill.
    pub fn parse_text(&self, html: &str) -> Result<BillText, ParseError> {
        let document = Html::parse_document(html);
        let body = document
            .select(&self.text_body)
            .next()
            .map(extract_text)
            .ok_or(ParseError::MissingMarker {
                marker: TEXT_BODY_MARKER,
            })?;
        let version = document
            .select(&self.text_version)
            .next()
            .map(extract_clean_text)
            .filter(|s| !s.is_empty());
        Ok(BillText {
            version,
            body: strip_bill_text_preamble(&body),
        })
    }

    fn parse_title(&self, document: &Html) -> Result<String, ParseError> {
        let heading = document
            .select(&self.title)
            .next()
            .ok_or(ParseError::MissingMarker {
                marker: TITLE_MARKER,
            })?;
        // The heading's first text node is `H.R.1 - Title`; the congress
        // session follows in a nested span.
        let first_line = heading
            .text()
            .flat_map(|t| t.lines())
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        match first_line.split_once(" - ") {
            Some((_, title)) if !title.trim().is_empty() => Ok(collapse_whitespace(title)),
            _ => Err(ParseError::UnexpectedContent {
                marker: TITLE_MARKER,
                content: first_line.to_string(),
            }),
        }
    }

    fn parse_overview(&self, document: &Html, record: &mut BillRecord) {
        for row in document.select(&self.overview_row) {
            let Some(label) = row.select(&self.th).next() else {
                continue;
            };
            let Some(value) = row.select(&self.td).next() else {
                continue;
            };
            let key = normalize_label(&extract_text(label));
            let value = extract_clean_text(value);

            match key.as_str() {
                "sponsor" => {
                    record.sponsor = self.parse_member(&value);
                    record.introduced_date = self.parse_introduced_date(&value);
                }
                "latest action" | "latest action (modified)" => {
                    let action = value.trim_end_matches("(All Actions)").trim();
                    if !action.is_empty() {
                        record.latest_action = Some(action.to_string());
                    }
                }
                "roll call votes" => {
                    record.roll_call_votes = self
                        .roll_call_regex
                        .captures(&value)
                        .and_then(|caps| caps[1].parse().ok())
                        .unwrap_or(0);
                }
                "committees" | "committee meetings" | "committee reports"
                | "committee prints" => {}
                _ => debug!("ignoring overview field `{key}`"),
            }
        }
    }

    fn parse_member(&self, text: &str) -> Option<Sponsor> {
        let caps = self.member_regex.captures(text.trim())?;
        Some(Sponsor {
            name: caps["name"].trim().to_string(),
            party: caps["party"].trim().to_string(),
            state: caps["state"].trim().to_string(),
            district: caps.name("district").map(|m| m.as_str().trim().to_string()),
        })
    }

    fn parse_introduced_date(&self, text: &str) -> Option<NaiveDate> {
        let date = match self.introduced_regex.captures(text) {
            Some(caps) => caps.get(1)?.as_str(),
            None => self.date_regex.find(text)?.as_str(),
        };
        NaiveDate::parse_from_str(date, "%m/%d/%Y").ok()
    }

    /// Returns every stage of the progress tracker and the one marked current.
    fn parse_tracker(&self, document: &Html) -> (Vec<String>, Option<String>) {
        let mut stages = vec![];
        let mut current = None;
        for li in document.select(&self.tracker_stage) {
            // Stage names are followed by a hidden tooltip starting with "Array".
            let text = extract_text(li);
            let stage = collapse_whitespace(text.split("Array").next().unwrap_or_default());
            if stage.is_empty() {
                continue;
            }
            if li.value().classes().any(|c| c == "selected") {
                current = Some(stage.clone());
            }
            stages.push(stage);
        }
        (stages, current)
    }

    fn parse_cosponsors(&self, document: &Html) -> Vec<Sponsor> {
        let Some(table) = document.select(&self.cosponsor_table).next() else {
            return vec![];
        };
        let withdrawn_only = table
            .select(&self.tbody)
            .next()
            .and_then(|tbody| tbody.value().attr("id"))
            == Some("withdrawnTbody");
        if withdrawn_only {
            return vec![];
        }

        let mut cosponsors = vec![];
        for row in table.select(&self.tr) {
            let cells: Vec<ElementRef> = row.select(&self.td).collect();
            if cells.len() != 2 {
                continue;
            }
            let text = extract_clean_text(cells[0]);
            match self.parse_member(&text) {
                Some(member) => cosponsors.push(member),
                None => debug!("unrecognised cosponsor `{text}`"),
            }
        }
        cosponsors
    }

    fn title_column(&self, chamber: Chamber) -> &Selector {
        match chamber {
            Chamber::House => &self.house_column,
            Chamber::Senate => &self.senate_column,
        }
    }

    /// Lines of a titles column, minus the section labels.
    fn title_lines(&self, row: ElementRef, chamber: Chamber, label: &str) -> Vec<String> {
        let Some(column) = row.select(self.title_column(chamber)).next() else {
            return vec![];
        };
        column
            .text()
            .flat_map(str::lines)
            .map(collapse_whitespace)
            .filter(|line| !line.is_empty() && !line.contains(label))
            .collect()
    }

    fn parse_short_titles(&self, document: &Html, chamber: Chamber) -> Vec<String> {
        let in_official_section = |row: &ElementRef| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|el| el.value().classes().any(|c| c == "officialTitles"))
        };
        document
            .select(&self.titles_row)
            .find(|row| !in_official_section(row))
            .map(|row| self.title_lines(row, chamber, "Short Title"))
            .unwrap_or_default()
    }

    fn parse_official_titles(&self, document: &Html, chamber: Chamber) -> Vec<String> {
        document
            .select(&self.official_titles_row)
            .next()
            .map(|row| self.title_lines(row, chamber, "Official Title"))
            .unwrap_or_default()
    }

    /// Committee and subcommittee names in order of first appearance. Only
    /// classed rows with data cells name one; the rest are headers or
    /// further activity of the row above.
    fn parse_committees(&self, document: &Html) -> Vec<String> {
        let mut committees: Vec<String> = vec![];
        for row in document.select(&self.committee_row) {
            if row.value().attr("class").is_none() || row.select(&self.td).next().is_none() {
                continue;
            }
            let Some(heading) = row.select(&self.th).next() else {
                continue;
            };
            let name = extract_clean_text(heading);
            if !name.is_empty() && !committees.contains(&name) {
                committees.push(name);
            }
        }
        committees
    }

    fn parse_related_bills(&self, document: &Html) -> Vec<RelatedBill> {
        document
            .select(&self.related_bill_row)
            .filter(|row| !row.value().classes().any(|c| c == "relatedbill_exrow"))
            .filter_map(|row| {
                let cells: Vec<ElementRef> = row.select(&self.td).collect();
                if cells.len() != 5 {
                    return None;
                }
                Some(RelatedBill {
                    bill: extract_clean_text(cells[0]),
                    relationship: extract_clean_text(cells[2]),
                })
            })
            .collect()
    }

    fn parse_summary(&self, document: &Html) -> Option<Summary> {
        let header = document
            .select(&self.summary_header)
            .next()
            .map(extract_clean_text)?;
        let text = document
            .select(&self.summary_paragraph)
            .map(extract_clean_text)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        Some(Summary { header, text })
    }
}

/// Fetches and parses the pages of a single bill.
pub struct BillScraper<F> {
    fetcher: F,
    parser: BillPageParser,
    cache: Option<PageCache>,
    base_url: String,
    fetch_text: bool,
}

impl<F: PageFetcher> BillScraper<F> {
    pub fn new(fetcher: F, config: &ScrapeConfig) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher,
            parser: BillPageParser::new()?,
            cache: config.cache_dir.clone().map(PageCache::new),
            base_url: config.base_url.clone(),
            fetch_text: config.fetch_text,
        })
    }

    pub async fn scrape(&self, id: &BillId) -> Result<BillRecord, ScrapeError> {
        let (html, cached) = self.fetch(id, PageKind::AllInfo).await?;
        let mut record = self.parser.parse_all_info(&html, id, &self.base_url)?;
        if !cached {
            self.remember(id, PageKind::AllInfo, &html);
        }

        if self.fetch_text {
            match self.scrape_text(id).await {
                Ok(text) => {
                    record.text_version = text.version;
                    record.raw_text = Some(text.body);
                }
                Err(err) => warn!("{id}: no bill text: {err}"),
            }
        }

        Ok(record)
    }

    async fn scrape_text(&self, id: &BillId) -> Result<BillText, ScrapeError> {
        let (html, cached) = self.fetch(id, PageKind::Text).await?;
        let text = self.parser.parse_text(&html)?;
        if !cached {
            self.remember(id, PageKind::Text, &html);
        }
        Ok(text)
    }

    /// Returns the page body and whether it came from the cache.
    async fn fetch(&self, id: &BillId, kind: PageKind) -> Result<(String, bool), FetchError> {
        if let Some(html) = self.cache.as_ref().and_then(|cache| cache.load(id, kind)) {
            return Ok((html, true));
        }
        let url = match kind {
            PageKind::AllInfo => id.all_info_url(&self.base_url),
            PageKind::Text => id.text_url(&self.base_url),
        };
        let html = self.fetcher.fetch_page(&url).await?;
        Ok((html, false))
    }

    // Only pages that parsed are cached, so a placeholder page is fetched
    // again on the next run.
    fn remember(&self, id: &BillId, kind: PageKind, html: &str) {
        if let Some(cache) = &self.cache {
            cache.store(id, kind, html);
        }
    }
}
