//! Directory listing page parsing.
//!
//! The nightly downloads page is an index table mixing builds for several
//! platforms. Each row carries the archive link in its second cell and the
//! publication time in its third:
//!
//! ```text
//! <tr><td>[icon]</td><td><a href="simc-905-01-win64-937b901.7z">…</a></td><td>2021-03-02 10:15  </td>…</tr>
//! ```
//!
//! Releases are ordered by publication time rather than by name, because the
//! identifier scheme does not sort lexically.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::release::{is_candidate_link, ReleaseId};

/// Publication time format used by the listing page.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

macro_rules! selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(ROW_SELECTOR, "tr");
selector!(CELL_SELECTOR, "td");
selector!(LINK_SELECTOR, "a");

/// A candidate release found on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Identifier derived from the archive link.
    pub release: ReleaseId,
    /// When the archive was published.
    pub published: NaiveDateTime,
}

/// Parse a listing timestamp, ignoring surrounding whitespace.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT).ok()
}

/// Collect every candidate row of the listing page in document order.
///
/// Rows whose link does not match the platform and extension filter, whose
/// identifier is not a safe directory name, or whose timestamp does not parse
/// are skipped.
pub fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    document
        .select(&ROW_SELECTOR)
        .filter_map(parse_row)
        .collect()
}

fn parse_row(row: ElementRef<'_>) -> Option<ListingEntry> {
    let mut cells = row.select(&CELL_SELECTOR);
    let name_cell = cells.nth(1)?;
    let href = name_cell
        .select(&LINK_SELECTOR)
        .next()
        .and_then(|link| link.value().attr("href"))?;
    if !is_candidate_link(href) {
        return None;
    }

    let Some(release) = ReleaseId::from_archive_name(href) else {
        debug!(href, "Skipping listing row with unusable release name");
        return None;
    };

    let date_text: String = cells.next().map(|cell| cell.text().collect()).unwrap_or_default();
    let Some(published) = parse_timestamp(&date_text) else {
        debug!(href, date = date_text.trim(), "Skipping listing row with unparseable date");
        return None;
    };

    Some(ListingEntry { release, published })
}

/// Pick the newest entry.
///
/// A later entry replaces the kept one only when it is strictly newer, so on
/// equal timestamps the first one scanned wins.
pub fn newest<I>(entries: I) -> Option<ListingEntry>
where
    I: IntoIterator<Item = ListingEntry>,
{
    entries.into_iter().fold(None, |kept, entry| match kept {
        Some(current) if entry.published <= current.published => Some(current),
        _ => Some(entry),
    })
}

/// Identifier of the newest release on the listing page, if any.
pub fn find_last_release(html: &str) -> Option<ReleaseId> {
    newest(parse_listing(html)).map(|entry| entry.release)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(href: &str, date: &str) -> String {
        format!(
            r#"<tr><td valign="top"><img src="/icons/unknown.gif" alt="[   ]"></td><td><a href="{href}">{href}</a></td><td align="right">{date}  </td><td align="right"> 80M</td></tr>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            r#"<html><body><h1>Index of /nightly</h1><table>
<tr><th valign="top"><img src="/icons/blank.gif" alt="[ICO]"></th><th><a href="?C=N;O=D">Name</a></th><th><a href="?C=M;O=A">Last modified</a></th><th><a href="?C=S;O=A">Size</a></th></tr>
<tr><td valign="top"><img src="/icons/back.gif" alt="[PARENTDIR]"></td><td><a href="/">Parent Directory</a></td><td>&nbsp;</td><td align="right">  - </td></tr>
{}
</table></body></html>"#,
            rows.join("\n")
        )
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("  2021-03-02 10:15  ").unwrap();
        assert_eq!(ts.to_string(), "2021-03-02 10:15:00");
        assert!(parse_timestamp("02/03/2021 10:15").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_picks_latest_timestamp() {
        let html = page(&[
            row("simc-905-01-win64-1111111.7z", "2021-03-01 09:00"),
            row("simc-905-01-win64-937b901.7z", "2021-03-02 10:15"),
            row("simc-905-01-win64-2222222.7z", "2021-02-28 23:59"),
        ]);
        assert_eq!(
            find_last_release(&html).unwrap().as_str(),
            "simc-905-01-win64-937b901"
        );
    }

    #[test]
    fn test_filters_platform_and_extension() {
        let html = page(&[
            row("simc-905-01-win64-1111111.7z", "2021-03-01 09:00"),
            row("simc-905-01-macos-3333333.dmg", "2021-03-05 09:00"),
            row("simc-905-01-win32-4444444.7z", "2021-03-05 09:00"),
            row("simc-905-01-win64-5555555.exe", "2021-03-05 09:00"),
        ]);
        let entries = parse_listing(&html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].release.as_str(), "simc-905-01-win64-1111111");
    }

    #[test]
    fn test_skips_unparseable_dates() {
        let html = page(&[
            row("simc-905-01-win64-1111111.7z", "2021-03-01 09:00"),
            row("simc-905-01-win64-9999999.7z", "yesterday"),
        ]);
        assert_eq!(
            find_last_release(&html).unwrap().as_str(),
            "simc-905-01-win64-1111111"
        );
    }

    #[test]
    fn test_skips_unsafe_identifiers() {
        let html = page(&[
            row("simc-905-01-win64-1111111.7z", "2021-03-01 09:00"),
            row("../simc-905-01-win64-6666666.7z", "2021-03-09 09:00"),
        ]);
        assert_eq!(
            find_last_release(&html).unwrap().as_str(),
            "simc-905-01-win64-1111111"
        );
    }

    #[test]
    fn test_equal_timestamps_keep_first() {
        let html = page(&[
            row("simc-905-01-win64-aaaaaaa.7z", "2021-03-02 10:15"),
            row("simc-905-01-win64-bbbbbbb.7z", "2021-03-02 10:15"),
        ]);
        assert_eq!(
            find_last_release(&html).unwrap().as_str(),
            "simc-905-01-win64-aaaaaaa"
        );
    }

    #[test]
    fn test_rows_missing_cells_are_ignored() {
        let html = page(&[
            r#"<tr><td><a href="simc-905-01-win64-1111111.7z">x</a></td></tr>"#.to_string(),
            r#"<tr><td></td><td><a href="simc-905-01-win64-2222222.7z">x</a></td></tr>"#
                .to_string(),
        ]);
        assert!(parse_listing(&html).is_empty());
    }

    #[test]
    fn test_empty_page_has_no_release() {
        assert!(find_last_release("").is_none());
        assert!(find_last_release(&page(&[])).is_none());
    }

    proptest! {
        #[test]
        fn test_newest_is_first_maximum(minutes in proptest::collection::vec(0u32..50, 1..20)) {
            let rows: Vec<String> = minutes
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    row(
                        &format!("build-{i:03}-win64-0000000.7z"),
                        &format!("2024-01-01 10:{m:02}"),
                    )
                })
                .collect();

            let max = *minutes.iter().max().unwrap();
            let first_max = minutes.iter().position(|m| *m == max).unwrap();
            let expected = format!("build-{first_max:03}-win64-0000000");

            let found = find_last_release(&page(&rows)).unwrap();
            prop_assert_eq!(found.as_str(), expected.as_str());
        }
    }
}
