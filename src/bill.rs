use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{BillType, Chamber, ordinal};

/// The composite key naming one bill: Congress, chamber, type and number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BillId {
    pub congress: u32,
    pub chamber: Chamber,
    pub bill_type: BillType,
    pub number: u32,
}

impl BillId {
    pub fn new(congress: u32, chamber: Chamber, bill_type: BillType, number: u32) -> Self {
        Self {
            congress,
            chamber,
            bill_type,
            number,
        }
    }

    /// `H.R.1`, `S.J.Res.70`, ...
    pub fn citation(&self) -> String {
        format!("{}{}", self.bill_type.prefix(self.chamber), self.number)
    }

    /// `{base}/bill/117th-congress/house-bill/1`
    pub fn page_url(&self, base_url: &str) -> String {
        format!(
            "{}/bill/{}-congress/{}-{}/{}",
            base_url.trim_end_matches('/'),
            ordinal(self.congress),
            self.chamber.slug(),
            self.bill_type.slug(),
            self.number
        )
    }

    pub fn all_info_url(&self, base_url: &str) -> String {
        format!("{}/all-info", self.page_url(base_url))
    }

    pub fn text_url(&self, base_url: &str) -> String {
        format!("{}/text?format=txt", self.page_url(base_url))
    }
}

/// `117-H.R.1`
impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.congress, self.citation())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    pub name: String,
    pub party: String,
    pub state: String,
    /// Only representatives have a district.
    pub district: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedBill {
    pub bill: String,
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub header: String,
    pub text: String,
}

/// One bill, as written to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRecord {
    pub bill_id: String,
    pub congress: u32,
    pub chamber: Chamber,
    pub bill_type: BillType,
    pub number: u32,
    pub url: String,
    pub title: String,
    /// Short titles listed for the bill's own chamber, as introduced and as
    /// amended.
    pub titles_short: Vec<String>,
    pub titles_official: Vec<String>,
    pub sponsor: Option<Sponsor>,
    pub introduced_date: Option<NaiveDate>,
    /// The stage the progress tracker marks as current, falling back to the
    /// latest action.
    pub status: Option<String>,
    pub latest_action: Option<String>,
    pub tracker: Vec<String>,
    pub cosponsors: Vec<Sponsor>,
    pub committees: Vec<String>,
    pub related_bills: Vec<RelatedBill>,
    pub policy_area: Option<String>,
    pub subjects: Vec<String>,
    pub roll_call_votes: u32,
    pub summary: Option<Summary>,
    pub text_version: Option<String>,
    pub raw_text: Option<String>,
}
