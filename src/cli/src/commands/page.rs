//! Show a single page.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use pageable_core::config::Config;
use pageable_core::pagination::{PageOptions, PageTarget};

use super::RecordRow;
use crate::output::{self, OutputFormat};
use crate::source::{self, SourceArgs};

#[derive(Args)]
pub struct PageArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Page to show: a number, or first/last
    #[arg(short, long, default_value = "first")]
    page: PageTarget,

    /// Extra query parameters (key=value)
    #[arg(short = 'q', long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))
}

pub async fn execute(args: PageArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let mut collection = source::open(&args.source, config)?;

    let mut options = PageOptions::new();
    for (key, value) in args.params {
        options = options.with_param(key, value);
    }

    // Later pages are only known once the pages before them were fetched.
    if !matches!(args.page, PageTarget::First) {
        collection.get_first_page(options.clone()).await?;
    }
    if let PageTarget::Number(page) = args.page {
        while collection.state().current_page() + 1 < page {
            if collection.get_next_page(options.clone()).await?.is_none() {
                break;
            }
        }
    }
    let outcome = collection.get_page(args.page, options).await?;
    let state = collection.state();

    match format {
        OutputFormat::Table => {
            output::print_header(&format!("Page {}", outcome.page));
            output::print_table(&RecordRow::rows(
                &outcome.records,
                state.offset_of(outcome.page),
            ));
            output::print_detail("Source", outcome.source.as_str());
            output::print_detail("Last page", &output::or_unknown(state.last_page()));
            output::print_detail("Total records", &output::or_unknown(state.total_records()));
            if collection.has_next_page() {
                output::print_info("More pages available");
            }
        }
        _ => output::print_item(
            &json!({
                "page": outcome.page,
                "source": outcome.source,
                "state": state,
                "records": outcome.records,
            }),
            format,
        )?,
    }

    Ok(())
}
