//! Page construction
//!
//! Pages are a pure function of the current block, its decoded transactions
//! and the previously rendered block's record.

use html_escape::encode_text;
use meshx_rpc::BlockEnvelope;
use meshx_types::{decode_transaction, DecodedTransaction, TxError};
use serde::{Deserialize, Serialize};

/// Fields handed to the page template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    pub hash: String,
    pub prev_hash: String,
    /// Empty until a successor block has been rendered
    pub next_hash: String,
    pub height: u64,
    pub transactions_html: String,
    pub is_summary: bool,
    pub is_prev: bool,
}

/// Everything needed to re-render a block once its successor is known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedBlockRecord {
    pub hash: String,
    pub prev_hash: String,
    pub height: u64,
    pub transactions_html: String,
}

impl RenderedBlockRecord {
    /// This block's page, now pointing forward to `next_hash`
    fn linked_page(&self, next_hash: &str) -> PageData {
        PageData {
            hash: self.hash.clone(),
            prev_hash: self.prev_hash.clone(),
            next_hash: next_hash.to_string(),
            height: self.height,
            transactions_html: self.transactions_html.clone(),
            is_summary: false,
            is_prev: true,
        }
    }
}

/// The three page views produced for one block
#[derive(Debug, Clone)]
pub struct RenderedPages {
    pub summary: PageData,
    pub block: PageData,
    /// Re-render of the predecessor, present only when it is `height - 1`
    pub previous: Option<PageData>,
    pub record: RenderedBlockRecord,
}

/// A transaction that failed to decode, and where it sat in the block
#[derive(Debug)]
pub struct DecodeFailure {
    pub index: usize,
    pub error: TxError,
}

/// Decode every entry in block order, stopping at the first failure
pub fn decode_all(raw: &[String]) -> Result<Vec<DecodedTransaction>, DecodeFailure> {
    raw.iter()
        .enumerate()
        .map(|(index, entry)| decode_transaction(entry).map_err(|error| DecodeFailure { index, error }))
        .collect()
}

/// Markup for a block's transaction list
pub fn transactions_html(transactions: &[DecodedTransaction]) -> String {
    let mut html = String::new();
    for tx in transactions {
        html.push_str("<details><summary>");
        html.push_str(&encode_text(tx.kind_label()));
        html.push_str(" Transaction</summary><table>");
        for field in &tx.fields {
            html.push_str("<tr><td>");
            html.push_str(&encode_text(field.name));
            html.push_str("</td><td>");
            html.push_str(&encode_text(&field.value));
            html.push_str("</td></tr>");
        }
        html.push_str("</table></details>");
    }
    html
}

/// Markup shown in place of the transaction list when one entry can't be decoded
pub fn placeholder_html(failure: &DecodeFailure) -> String {
    format!(
        "<p class=\"decode-error\">Transactions could not be decoded: entry {}: {}</p>",
        failure.index,
        encode_text(&failure.error.to_string())
    )
}

/// Build the summary, block and previous-block views for `block`
pub fn render_pages(
    block: &BlockEnvelope,
    transactions_html: String,
    previous: Option<&RenderedBlockRecord>,
) -> RenderedPages {
    let record = RenderedBlockRecord {
        hash: block.hash.clone(),
        prev_hash: block.prev_hash.clone(),
        height: block.height,
        transactions_html,
    };

    let page = PageData {
        hash: record.hash.clone(),
        prev_hash: record.prev_hash.clone(),
        next_hash: String::new(),
        height: record.height,
        transactions_html: record.transactions_html.clone(),
        is_summary: false,
        is_prev: false,
    };

    let previous = previous
        .filter(|prev| prev.height + 1 == block.height)
        .map(|prev| prev.linked_page(&block.hash));

    RenderedPages {
        summary: PageData { is_summary: true, ..page.clone() },
        block: page,
        previous,
        record,
    }
}
