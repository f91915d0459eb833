//! Runner row parser for the bookmaker's racing widget.
//!
//! Every Kambi-widget selector lives in this file, behind a narrow parse
//! interface, so request handling never touches DOM details.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;
use crate::types::RunnerOdds;

const NAME_SELECTOR: &str = "div.KambiBC-racing-participant__name span";
const PRICE_BUTTON_SELECTOR: &str = "div.KambiBC-racing-outcome-list button";
const PRICE_SELECTOR: &str = "div.sc-kAyceB.gIMtGL";

/// Accepted price shapes: "SP" or an unreduced fraction of positive integers
const ODDS_PATTERN: &str = r"^(SP|[1-9][0-9]*/[1-9][0-9]*)$";

/// Parser for runner rows on an event page
pub struct RunnerRowParser;

impl RunnerRowParser {
    /// CSS selector matching one row per runner. The extractor waits on
    /// this selector before handing the page HTML over.
    pub const ROW_SELECTOR: &'static str = "div.KambiBC-racing-participant-outcome-container";

    /// Parse every runner row in page order.
    ///
    /// All-or-nothing: a row with a missing name or an unusable price fails
    /// the whole parse. Zero rows parse to an empty list.
    pub fn parse(html: &str) -> Result<Vec<RunnerOdds>, ScrapeError> {
        let document = Html::parse_document(html);
        let row_selector = Selector::parse(Self::ROW_SELECTOR).unwrap();
        let name_selector = Selector::parse(NAME_SELECTOR).unwrap();
        let button_selector = Selector::parse(PRICE_BUTTON_SELECTOR).unwrap();
        let price_selector = Selector::parse(PRICE_SELECTOR).unwrap();
        let odds_re = Regex::new(ODDS_PATTERN).unwrap();

        let mut horses = Vec::new();
        for (index, row) in document.select(&row_selector).enumerate() {
            let name = Self::text_of(row, &name_selector).ok_or(ScrapeError::MalformedRow {
                row: index,
                field: "name",
            })?;

            // The first price button carries the win odds; later buttons
            // are other markets
            let odds = row
                .select(&button_selector)
                .next()
                .and_then(|button| Self::text_of(button, &price_selector))
                .filter(|odds| odds_re.is_match(odds))
                .ok_or(ScrapeError::MalformedRow {
                    row: index,
                    field: "odds",
                })?;

            horses.push(RunnerOdds { name, odds });
        }

        Ok(horses)
    }

    /// First matching element's trimmed text, if non-empty.
    fn text_of(scope: ElementRef, selector: &Selector) -> Option<String> {
        let text = scope
            .select(selector)
            .next()?
            .text()
            .collect::<String>()
            .trim()
            .to_string();
        (!text.is_empty()).then_some(text)
    }
}
