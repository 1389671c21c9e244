//! Follow `next` links until the collection is exhausted.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use serde_json::json;
use tabled::Tabled;

use pageable_core::config::Config;
use pageable_core::pagination::{PageOptions, PageOutcome, PageSource};

use super::RecordRow;
use crate::output::{self, OutputFormat};
use crate::source::{self, SourceArgs};

#[derive(Args)]
pub struct WalkArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Stop after this many pages
    #[arg(short = 'n', long, default_value = "10")]
    max_pages: usize,

    /// Print every record instead of a per-page summary
    #[arg(long)]
    records: bool,
}

#[derive(Tabled, Serialize)]
struct PageRow {
    #[tabled(rename = "Page")]
    page: u64,
    #[tabled(rename = "Source")]
    source: PageSource,
    #[tabled(rename = "Records")]
    records: usize,
}

impl<R> From<&PageOutcome<R>> for PageRow {
    fn from(outcome: &PageOutcome<R>) -> Self {
        Self {
            page: outcome.page,
            source: outcome.source,
            records: outcome.records.len(),
        }
    }
}

pub async fn execute(args: WalkArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let mut collection = source::open(&args.source, config)?;

    let first = collection.get_first_page(PageOptions::new()).await?;
    let mut pages = vec![PageRow::from(&first)];

    while pages.len() < args.max_pages {
        match collection.get_next_page(PageOptions::new()).await? {
            Some(outcome) => pages.push(PageRow::from(&outcome)),
            None => break,
        }
    }
    let exhausted = !collection.has_next_page();
    let state = collection.state();
    let records = match collection.full_collection() {
        Some(full) => full.records().to_vec(),
        None => collection.records().to_vec(),
    };

    match format {
        OutputFormat::Table => {
            output::print_header("Pages");
            output::print_table(&pages);
            if args.records {
                output::print_header("Records");
                output::print_table(&RecordRow::rows(&records, 0));
            }
            output::print_detail("Records fetched", &records.len().to_string());
            output::print_detail("Last page", &output::or_unknown(state.last_page()));
            if exhausted {
                output::print_success("Reached the end of the collection");
            } else {
                output::print_info(&format!("Stopped after {} pages", pages.len()));
            }
        }
        _ => output::print_item(
            &json!({
                "pages": pages,
                "exhausted": exhausted,
                "state": state,
                "links": collection.links(),
                "records": records,
            }),
            format,
        )?,
    }

    Ok(())
}
